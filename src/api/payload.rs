//! Request bodies: JSON for plain records, multipart when files ride along.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SyncError};

/// Body of a create or update request.
///
/// Both shapes go through the same client methods; the shape alone decides
/// how the request is encoded.
#[derive(Debug, Clone)]
pub enum Payload {
  /// Encoded as `application/json`
  Json(Value),
  /// Encoded as `multipart/form-data`
  Multipart(MultipartForm),
}

impl From<Value> for Payload {
  fn from(value: Value) -> Self {
    Payload::Json(value)
  }
}

impl From<MultipartForm> for Payload {
  fn from(form: MultipartForm) -> Self {
    Payload::Multipart(form)
  }
}

/// A binary file attached to a multipart payload (logo, avatar, CSV export).
#[derive(Debug, Clone)]
pub struct Attachment {
  pub field: String,
  pub file_name: String,
  pub mime: Option<String>,
  pub bytes: Vec<u8>,
}

/// Text fields plus attachments, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
  fields: Vec<(String, String)>,
  attachments: Vec<Attachment>,
}

impl MultipartForm {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build the text part of a form from a record's JSON fields.
  ///
  /// Strings are sent raw, `null` fields are skipped and anything else is
  /// sent as its JSON text, which is how the API reads non-string form values.
  pub fn from_record<T: Serialize + ?Sized>(record: &T) -> Result<Self> {
    let value = serde_json::to_value(record)
      .map_err(|e| SyncError::Validation(format!("payload is not serializable: {}", e)))?;
    let Value::Object(map) = value else {
      return Err(SyncError::Validation(
        "multipart payload must be built from an object".to_string(),
      ));
    };

    let mut form = Self::new();
    for (name, value) in map {
      match value {
        Value::Null => {}
        Value::String(s) => form = form.text(name, s),
        other => form = form.text(name, other.to_string()),
      }
    }
    Ok(form)
  }

  pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.fields.push((name.into(), value.into()));
    self
  }

  pub fn file(
    mut self,
    field: impl Into<String>,
    file_name: impl Into<String>,
    mime: Option<&str>,
    bytes: Vec<u8>,
  ) -> Self {
    self.attachments.push(Attachment {
      field: field.into(),
      file_name: file_name.into(),
      mime: mime.map(String::from),
      bytes,
    });
    self
  }

  pub fn fields(&self) -> &[(String, String)] {
    &self.fields
  }

  pub fn attachments(&self) -> &[Attachment] {
    &self.attachments
  }

  /// Convert into a reqwest form. Fails only on a malformed MIME type.
  pub(crate) fn into_form(self) -> Result<reqwest::multipart::Form> {
    use reqwest::multipart::{Form, Part};

    let mut form = Form::new();
    for (name, value) in self.fields {
      form = form.text(name, value);
    }
    for attachment in self.attachments {
      let mut part = Part::bytes(attachment.bytes).file_name(attachment.file_name);
      if let Some(mime) = attachment.mime.as_deref() {
        part = part
          .mime_str(mime)
          .map_err(|e| SyncError::Validation(format!("invalid mime type {}: {}", mime, e)))?;
      }
      form = form.part(attachment.field, part);
    }
    Ok(form)
  }
}
