//! Generic CRUD client bound to one entity type and its base path.

use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde_json::json;

use crate::api::api_types::Listing;
use crate::api::client::ApiClient;
use crate::api::payload::Payload;
use crate::cache::Entity;
use crate::error::{RemoteError, Result, SyncError};
use crate::query_string;

/// Remote create/update/delete/list for one entity collection.
///
/// Every call is independent: no retries, no coalescing of concurrent
/// calls, no ordering between calls that touch the same record.
pub struct RemoteCrud<T: Entity> {
  client: ApiClient,
  path: String,
  _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RemoteCrud<T> {
  /// Client for the entity's default base path.
  pub fn new(client: ApiClient) -> Self {
    Self::with_path(client, T::base_path())
  }

  /// Client for an explicit base path (e.g. a versioned route).
  pub fn with_path(client: ApiClient, path: impl Into<String>) -> Self {
    let path = path.into();
    let path = format!("/{}", path.trim_matches('/'));
    Self {
      client,
      path,
      _entity: PhantomData,
    }
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  /// `POST {base}`: returns the record with its server-assigned id.
  pub async fn create(&self, payload: impl Into<Payload>) -> Result<T> {
    self
      .client
      .send(
        Method::POST,
        &self.path,
        None,
        Some(payload.into()),
        T::entity_type(),
      )
      .await
  }

  /// `PUT {base}/{id}`: returns the updated record.
  pub async fn update(&self, id: &str, payload: impl Into<Payload>) -> Result<T> {
    validate_id(id)?;
    self
      .client
      .send_item(
        Method::PUT,
        &self.path,
        id,
        Some(payload.into()),
        T::entity_type(),
      )
      .await
  }

  /// `DELETE {base}/{id}`: returns the server's success flag.
  pub async fn delete(&self, id: &str) -> Result<bool> {
    validate_id(id)?;
    self
      .client
      .send_item(Method::DELETE, &self.path, id, None, T::entity_type())
      .await
  }

  /// `GET {base}?{filter}`: every record matching the filter, or the single
  /// record when the filter targets one id.
  pub async fn list<F: Serialize + ?Sized>(&self, filter: &F) -> Result<Listing<T>> {
    let query = query_string::encode(filter)?;
    self
      .client
      .send(Method::GET, &self.path, Some(&query), None, T::entity_type())
      .await
  }

  /// Unfiltered `list`.
  pub async fn list_all(&self) -> Result<Vec<T>> {
    Ok(self.list(&()).await?.into_vec())
  }

  /// Server copy of one record, read through `list` scoped to its id.
  pub async fn read(&self, id: &str) -> Result<T> {
    validate_id(id)?;
    match self.list(&json!({ "id": id })).await? {
      Listing::One(entity) => Ok(entity),
      Listing::Many(items) => items.into_iter().find(|e| e.id() == id).ok_or_else(|| {
        SyncError::from(RemoteError::status(
          404,
          Some(format!("{} {} not found", T::entity_type(), id)),
        ))
      }),
    }
  }
}

impl<T: Entity> Clone for RemoteCrud<T> {
  fn clone(&self) -> Self {
    Self {
      client: self.client.clone(),
      path: self.path.clone(),
      _entity: PhantomData,
    }
  }
}

fn validate_id(id: &str) -> Result<()> {
  if id.trim().is_empty() {
    return Err(SyncError::Validation("id must not be empty".to_string()));
  }
  Ok(())
}
