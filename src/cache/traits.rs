//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for records that can be synchronized and cached.
///
/// Implementors provide the server-assigned id and the creation timestamp
/// used to order cached collections (most recent first).
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Unique identifier assigned by the server on creation
  fn id(&self) -> &str;

  /// Creation timestamp, the only sort key for cached collections
  fn created_at(&self) -> DateTime<Utc>;

  /// Entity type name for logs and error messages (e.g. "transaction")
  fn entity_type() -> &'static str;

  /// Default API path for this entity type (e.g. "/transaction")
  fn base_path() -> &'static str;
}

/// Result from a read, including where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  /// Wrap fresh server data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  /// Wrap data served from the in-memory store.
  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
    }
  }

  pub fn into_inner(self) -> T {
    self.data
  }
}

/// Indicates where read data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from the server; the store was not touched
  Network,
  /// Session copy from the store, possibly stale
  Cache,
}
