//! Generic in-memory caching of entity collections.
//!
//! This module provides a domain-agnostic session cache that:
//! - Holds one ordered collection per entity type, newest `created_at` first
//! - Mutates in place on add/edit/remove, re-sorting after add and edit
//! - Is filled from the server via a `RemoteCrud` and emptied on logout

mod store;
mod traits;

pub use store::Store;
pub use traits::{CacheResult, CacheSource, Entity};
