//! In-memory store holding one entity collection for the session.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::debug;

use crate::api::RemoteCrud;
use crate::error::Result;

use super::traits::Entity;

/// Ordered session copy of one collection, most recent `created_at` first.
///
/// Cloning yields another handle onto the same collection. Each operation
/// holds the lock for its own duration only.
pub struct Store<T: Entity> {
  items: Arc<RwLock<Vec<T>>>,
}

impl<T: Entity> Store<T> {
  /// Create an empty store.
  pub fn new() -> Self {
    Self {
      items: Arc::new(RwLock::new(Vec::new())),
    }
  }

  /// Append and re-sort.
  ///
  /// The caller must not add an id that is already present; this is not
  /// checked.
  pub fn add(&self, entity: T) {
    let mut items = self.write();
    items.push(entity);
    sort_desc(&mut items);
  }

  /// Replace the entity with the same id and re-sort.
  ///
  /// An id that is not cached is ignored without error; returns whether a
  /// replacement happened.
  pub fn edit(&self, entity: T) -> bool {
    let mut items = self.write();
    match items.iter().position(|e| e.id() == entity.id()) {
      Some(index) => {
        items[index] = entity;
        sort_desc(&mut items);
        true
      }
      None => {
        debug!(
          entity_type = T::entity_type(),
          id = entity.id(),
          "edit target not cached, ignoring"
        );
        false
      }
    }
  }

  /// Remove the first entity with this id, if any.
  pub fn remove(&self, id: &str) -> Option<T> {
    let mut items = self.write();
    let index = items.iter().position(|e| e.id() == id)?;
    Some(items.remove(index))
  }

  pub fn get(&self, id: &str) -> Option<T> {
    self.read().iter().find(|e| e.id() == id).cloned()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.read().iter().any(|e| e.id() == id)
  }

  /// Replace the whole collection as given. Unlike `add` and `edit` this
  /// keeps the caller's order.
  pub fn set_all(&self, entities: Vec<T>) {
    *self.write() = entities;
  }

  /// Snapshot of the collection in store order.
  pub fn list(&self) -> Vec<T> {
    self.read().clone()
  }

  pub fn len(&self) -> usize {
    self.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().is_empty()
  }

  /// Drop every cached entity (logout, session teardown).
  pub fn clear(&self) {
    self.write().clear();
  }

  /// Load the full collection from the server, replacing the cache.
  ///
  /// Returns the number of cached entities. On failure the cache is left
  /// as it was.
  pub async fn fetch_all(&self, remote: &RemoteCrud<T>) -> Result<usize> {
    let entities = remote.list_all().await?;
    let count = entities.len();
    self.set_all(entities);
    debug!(entity_type = T::entity_type(), count, "fetched collection");
    Ok(count)
  }

  /// Load a filtered collection from the server, replacing the cache.
  pub async fn fetch<F: Serialize + ?Sized>(
    &self,
    remote: &RemoteCrud<T>,
    filter: &F,
  ) -> Result<usize> {
    let entities = remote.list(filter).await?.into_vec();
    let count = entities.len();
    self.set_all(entities);
    debug!(entity_type = T::entity_type(), count, "fetched filtered collection");
    Ok(count)
  }

  fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
    self.items.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
    self.items.write().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<T: Entity> Default for Store<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Entity> Clone for Store<T> {
  fn clone(&self) -> Self {
    Self {
      items: Arc::clone(&self.items),
    }
  }
}

impl<T: Entity + std::fmt::Debug> std::fmt::Debug for Store<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Store")
      .field("entity_type", &T::entity_type())
      .field("items", &*self.read())
      .finish()
  }
}

/// Stable sort, newest first.
fn sort_desc<T: Entity>(items: &mut [T]) {
  items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
}
