//! Client-side synchronization of finance records with the tracking API.
//!
//! A [`sync::Session`] owns one [`sync::SyncService`] per record type. Each
//! service pairs a [`api::RemoteCrud`] client with an in-memory
//! [`cache::Store`]: mutations go to the server first and are mirrored into
//! the store only when the server accepted them.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod finance;
pub mod logging;
pub mod operation;
pub mod query_string;
pub mod sync;

pub use error::{RemoteError, SyncError};
