//! Serde types for response envelopes of the finance API.
//!
//! Entity bodies decode straight into domain types; these cover the shapes
//! around them (list-or-single reads, error bodies).

use serde::{de::DeserializeOwned, Deserialize};

/// Body of a read: either a collection or the single targeted record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged, bound = "T: DeserializeOwned")]
pub enum Listing<T> {
  Many(Vec<T>),
  One(T),
}

impl<T> Listing<T> {
  /// Flatten into a vector, a single record becoming a one-element list.
  pub fn into_vec(self) -> Vec<T> {
    match self {
      Listing::Many(items) => items,
      Listing::One(item) => vec![item],
    }
  }

  pub fn len(&self) -> usize {
    match self {
      Listing::Many(items) => items.len(),
      Listing::One(_) => 1,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub message: Option<ApiErrorMessage>,
}

/// Validation failures list one message per rejected field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorMessage {
  Text(String),
  Lines(Vec<String>),
}

impl ApiErrorBody {
  /// Extract the human readable message from a raw response body, if any.
  pub fn message_from(body: &[u8]) -> Option<String> {
    let parsed: ApiErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.message? {
      ApiErrorMessage::Text(text) if !text.trim().is_empty() => Some(text),
      ApiErrorMessage::Text(_) => None,
      ApiErrorMessage::Lines(lines) if !lines.is_empty() => Some(lines.join("; ")),
      ApiErrorMessage::Lines(_) => None,
    }
  }
}
