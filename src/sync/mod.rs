//! Glue between the remote CRUD clients and the session stores.

mod service;
mod session;

pub use service::SyncService;
pub use session::Session;
