//! HTTP side of the synchronization layer.

pub mod api_types;
mod client;
mod payload;
mod remote;

pub use api_types::Listing;
pub use client::ApiClient;
pub use payload::{Attachment, MultipartForm, Payload};
pub use remote::RemoteCrud;
