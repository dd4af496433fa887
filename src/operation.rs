//! Tracking of one in-flight sync call for a UI to poll.
//!
//! A form submit or a list load is wrapped in an `Operation<T>`, started,
//! and polled from the render loop until it settles.
//!
//! # Example
//!
//! ```ignore
//! let accounts = session.accounts().clone();
//! let mut op = Operation::new(move || {
//!     let accounts = accounts.clone();
//!     async move { accounts.fetch_all().await.map_err(|e| e.to_string()) }
//! });
//!
//! op.start();
//!
//! // In event loop tick
//! if op.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! match op.state() {
//!     OperationState::InFlight => render_spinner(),
//!     OperationState::Succeeded(count) => render_rows(count),
//!     OperationState::Failed(e) => render_toast(e),
//!     OperationState::Idle => {}
//! }
//! ```

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::sync::mpsc;

/// The state of an operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationState<T> {
  /// Not started, or abandoned
  Idle,
  /// Request sent, waiting for the server
  InFlight,
  /// Completed successfully
  Succeeded(T),
  /// Failed with a displayable error
  Failed(String),
}

impl<T> OperationState<T> {
  pub fn is_in_flight(&self) -> bool {
    matches!(self, OperationState::InFlight)
  }

  pub fn is_settled(&self) -> bool {
    matches!(
      self,
      OperationState::Succeeded(_) | OperationState::Failed(_)
    )
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      OperationState::Succeeded(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      OperationState::Failed(e) => Some(e),
      _ => None,
    }
  }
}

type Starter<T> = Box<dyn Fn() -> BoxFuture<'static, Result<T, String>> + Send + Sync>;

/// One restartable async call with `idle -> in-flight -> settled` state.
///
/// Calls are never coalesced or cancelled: abandoning or restarting only
/// stops this operation from observing the old result, the request and
/// any store update it triggers still run to completion.
pub struct Operation<T> {
  state: OperationState<T>,
  starter: Starter<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
}

impl<T: Send + 'static> Operation<T> {
  /// Create an operation from a closure producing the call's future.
  pub fn new<F, Fut>(starter: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: OperationState::Idle,
      starter: Box::new(move || starter().boxed()),
      receiver: None,
    }
  }

  pub fn state(&self) -> &OperationState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  pub fn is_in_flight(&self) -> bool {
    self.state.is_in_flight()
  }

  /// Start the call unless one is already in flight.
  pub fn start(&mut self) {
    if self.state.is_in_flight() {
      return;
    }
    self.spawn();
  }

  /// Start a new call, ignoring the result of any pending one.
  pub fn restart(&mut self) {
    self.receiver = None;
    self.spawn();
  }

  /// Stop observing the pending call (view went away) and return to idle.
  pub fn abandon(&mut self) {
    self.receiver = None;
    self.state = OperationState::Idle;
  }

  /// Pick up a finished result, if any.
  ///
  /// Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = OperationState::Succeeded(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = OperationState::Failed(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Task ended without reporting (panicked or runtime shut down)
        self.state = OperationState::Failed("operation was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// Wait for the pending call to settle and return the final state.
  pub async fn settle(&mut self) -> &OperationState<T> {
    if let Some(rx) = &mut self.receiver {
      self.state = match rx.recv().await {
        Some(Ok(data)) => OperationState::Succeeded(data),
        Some(Err(error)) => OperationState::Failed(error),
        None => OperationState::Failed("operation was cancelled".to_string()),
      };
      self.receiver = None;
    }
    &self.state
  }

  fn spawn(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = OperationState::InFlight;

    let future = (self.starter)();
    tokio::spawn(async move {
      // The receiver is gone if the operation was abandoned or restarted
      let _ = tx.send(future.await);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Operation<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Operation")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
