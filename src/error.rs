//! Error types for the synchronization layer.

use std::fmt;

use thiserror::Error;

/// Failure reported by the remote API or the transport underneath it.
#[derive(Debug, Clone)]
pub struct RemoteError {
  /// HTTP status, absent for transport failures (DNS, connect, timeout)
  pub status: Option<u16>,
  /// Human readable text, preferably the server's `message` field
  pub message: Option<String>,
}

impl RemoteError {
  pub fn status(status: u16, message: Option<String>) -> Self {
    Self {
      status: Some(status),
      message,
    }
  }

  pub fn transport(message: impl Into<String>) -> Self {
    Self {
      status: None,
      message: Some(message.into()),
    }
  }

  /// Whether the server reported the target as missing.
  pub fn is_not_found(&self) -> bool {
    self.status == Some(404)
  }
}

impl fmt::Display for RemoteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match (self.status, self.message.as_deref()) {
      (Some(status), Some(message)) => write!(f, "request failed with status {}: {}", status, message),
      (Some(status), None) => write!(f, "request failed with status {}", status),
      (None, Some(message)) => write!(f, "request failed: {}", message),
      (None, None) => f.write_str("request failed"),
    }
  }
}

impl std::error::Error for RemoteError {}

impl From<reqwest::Error> for RemoteError {
  fn from(err: reqwest::Error) -> Self {
    Self {
      status: err.status().map(|s| s.as_u16()),
      message: Some(err.to_string()),
    }
  }
}

/// Errors surfaced by the remote client, the stores and the sync services.
#[derive(Debug, Error)]
pub enum SyncError {
  /// Network failure or non-2xx response.
  #[error(transparent)]
  Remote(#[from] RemoteError),

  /// The server answered a delete with `false`.
  #[error("{entity_type} {id} was not deleted")]
  Deletion { entity_type: &'static str, id: String },

  /// Rejected locally before any request was sent.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The response body did not have the expected shape.
  #[error("failed to decode {entity_type} response: {message}")]
  Decode {
    entity_type: &'static str,
    message: String,
  },

  /// A filter could not be turned into a query string.
  #[error("failed to encode filter: {0}")]
  Encode(String),
}

impl SyncError {
  pub fn is_deletion(&self) -> bool {
    matches!(self, SyncError::Deletion { .. })
  }

  /// The remote error, if this failure came from the server or transport.
  pub fn remote(&self) -> Option<&RemoteError> {
    match self {
      SyncError::Remote(err) => Some(err),
      _ => None,
    }
  }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
