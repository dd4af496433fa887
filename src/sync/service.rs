//! Per-entity synchronization: remote call first, store update on success.

use serde::Serialize;
use tracing::{debug, info};

use crate::api::{ApiClient, Payload, RemoteCrud};
use crate::cache::{CacheResult, Entity, Store};
use crate::error::{Result, SyncError};

/// The path UI code takes to read and mutate one entity collection.
///
/// Every successful remote mutation is applied to the store exactly once;
/// a failed one leaves the store untouched and the error goes back to the
/// caller.
pub struct SyncService<T: Entity> {
  remote: RemoteCrud<T>,
  store: Store<T>,
}

impl<T: Entity> SyncService<T> {
  pub fn new(client: ApiClient) -> Self {
    Self::from_parts(RemoteCrud::new(client), Store::new())
  }

  pub fn from_parts(remote: RemoteCrud<T>, store: Store<T>) -> Self {
    Self { remote, store }
  }

  pub fn store(&self) -> &Store<T> {
    &self.store
  }

  pub fn remote(&self) -> &RemoteCrud<T> {
    &self.remote
  }

  /// Create remotely, then cache the server's record.
  pub async fn create(&self, payload: impl Into<Payload>) -> Result<T> {
    let created = self.remote.create(payload).await?;
    info!(entity_type = T::entity_type(), id = created.id(), "created");
    self.store.add(created.clone());
    Ok(created)
  }

  /// Update remotely, then overwrite the cached copy (if cached).
  pub async fn update(&self, id: &str, payload: impl Into<Payload>) -> Result<T> {
    let updated = self.remote.update(id, payload).await?;
    info!(entity_type = T::entity_type(), id = updated.id(), "updated");
    self.store.edit(updated.clone());
    Ok(updated)
  }

  /// Delete remotely, then drop the cached copy.
  ///
  /// A `false` answer from the server is a `SyncError::Deletion` and the
  /// cache keeps the record.
  pub async fn delete(&self, id: &str) -> Result<()> {
    if !self.remote.delete(id).await? {
      return Err(SyncError::Deletion {
        entity_type: T::entity_type(),
        id: id.to_string(),
      });
    }
    info!(entity_type = T::entity_type(), id, "deleted");
    self.store.remove(id);
    Ok(())
  }

  /// Read one record.
  ///
  /// With `from_server` the server copy is returned and the store is not
  /// touched (fresh data for edit forms); otherwise the cached copy, which
  /// may be absent.
  pub async fn read_one(&self, id: &str, from_server: bool) -> Result<CacheResult<Option<T>>> {
    if from_server {
      let entity = self.remote.read(id).await?;
      return Ok(CacheResult::from_network(Some(entity)));
    }

    let cached = self.store.get(id);
    if cached.is_none() {
      debug!(entity_type = T::entity_type(), id, "not cached");
    }
    Ok(CacheResult::from_cache(cached))
  }

  /// Cached copy only.
  pub fn get(&self, id: &str) -> Option<T> {
    self.store.get(id)
  }

  /// Cached collection in store order.
  pub fn list(&self) -> Vec<T> {
    self.store.list()
  }

  /// Replace the cache with the full server collection.
  pub async fn fetch_all(&self) -> Result<usize> {
    self.store.fetch_all(&self.remote).await
  }

  /// Replace the cache with a filtered server collection.
  pub async fn fetch<F: Serialize + ?Sized>(&self, filter: &F) -> Result<usize> {
    self.store.fetch(&self.remote, filter).await
  }

  pub fn clear(&self) {
    self.store.clear();
  }
}

impl<T: Entity> Clone for SyncService<T> {
  fn clone(&self) -> Self {
    Self {
      remote: self.remote.clone(),
      store: self.store.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use crate::finance::{AccountType, BankAccount, Transaction};
  use serde_json::{json, Value};
  use std::time::Duration;
  use crate::api::MultipartForm;
  use wiremock::matchers::{
    body_json, body_string_contains, header_regex, method, path, query_param,
  };
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn account_json(id: &str, created_at: &str, title: &str) -> Value {
    json!({
      "id": id,
      "createdAt": created_at,
      "title": title,
      "type": "BANK_ACCOUNT",
      "balance": 0,
      "currency": "EUR",
    })
  }

  fn account(id: &str, created_at: &str, title: &str) -> BankAccount {
    serde_json::from_value(account_json(id, created_at, title)).unwrap()
  }

  async fn service(server: &MockServer) -> SyncService<BankAccount> {
    SyncService::new(ApiClient::new(&server.uri(), None, None).unwrap())
  }

  #[tokio::test]
  async fn test_create_writes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/bank-account"))
      .and(body_json(json!({ "title": "Checking", "type": "BANK_ACCOUNT" })))
      .respond_with(
        ResponseTemplate::new(201).set_body_json(account_json(
          "a1",
          "2024-01-01T00:00:00Z",
          "Checking",
        )),
      )
      .expect(1)
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a0", "2023-06-01T00:00:00Z", "Savings"));
    let before = accounts.list().len();

    let created = accounts
      .create(json!({ "title": "Checking", "type": "BANK_ACCOUNT" }))
      .await
      .unwrap();

    assert_eq!(created.id, "a1");
    assert_eq!(created.account_type, AccountType::BankAccount);
    assert_eq!(accounts.get("a1"), Some(created));
    assert_eq!(accounts.list().len(), before + 1);
    assert_eq!(accounts.list()[0].id, "a1");
  }

  #[tokio::test]
  async fn test_create_failure_leaves_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(
        ResponseTemplate::new(400).set_body_json(json!({ "message": "title should not be empty" })),
      )
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let err = accounts.create(json!({ "title": "" })).await.unwrap_err();

    assert_eq!(
      err.remote().and_then(|r| r.message.as_deref()),
      Some("title should not be empty")
    );
    assert!(accounts.store().is_empty());
  }

  #[tokio::test]
  async fn test_update_failure_keeps_prior_state() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .respond_with(ResponseTemplate::new(422))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let original = account("a1", "2024-01-01T00:00:00Z", "Checking");
    accounts.store().add(original.clone());

    let result = accounts.update("a1", json!({ "title": "Renamed" })).await;

    assert!(result.is_err());
    assert_eq!(accounts.get("a1"), Some(original));
  }

  #[tokio::test]
  async fn test_update_success_edits_cache() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(account_json(
        "a1",
        "2024-01-01T00:00:00Z",
        "Renamed",
      )))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Checking"));

    accounts
      .update("a1", json!({ "title": "Renamed" }))
      .await
      .unwrap();
    assert_eq!(accounts.get("a1").unwrap().title, "Renamed");
  }

  #[tokio::test]
  async fn test_multipart_update_edits_cache() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .and(header_regex("content-type", "^multipart/form-data; boundary="))
      .and(body_string_contains(r#"name="title""#))
      .and(body_string_contains(r#"name="logo"; filename="logo.png""#))
      .respond_with(ResponseTemplate::new(200).set_body_json(account_json(
        "a1",
        "2024-01-01T00:00:00Z",
        "Main account",
      )))
      .expect(1)
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Checking"));

    let form = MultipartForm::new().text("title", "Main account").file(
      "logo",
      "logo.png",
      Some("image/png"),
      vec![0x89, b'P', b'N', b'G'],
    );
    let updated = accounts.update("a1", form).await.unwrap();

    assert_eq!(updated.title, "Main account");
    assert_eq!(accounts.get("a1").unwrap().title, "Main account");
    assert_eq!(accounts.list().len(), 1);
  }

  #[tokio::test]
  async fn test_update_escapes_id_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a%201"))
      .respond_with(ResponseTemplate::new(200).set_body_json(account_json(
        "a 1",
        "2024-01-01T00:00:00Z",
        "Spaced",
      )))
      .expect(1)
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let updated = accounts
      .update("a 1", json!({ "title": "Spaced" }))
      .await
      .unwrap();
    assert_eq!(updated.id, "a 1");
  }

  #[tokio::test]
  async fn test_update_of_uncached_record_does_not_insert() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/missing"))
      .respond_with(ResponseTemplate::new(200).set_body_json(account_json(
        "missing",
        "2024-01-01T00:00:00Z",
        "Remote only",
      )))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let updated = accounts
      .update("missing", json!({ "title": "Remote only" }))
      .await
      .unwrap();

    assert_eq!(updated.id, "missing");
    assert!(accounts.store().is_empty());
  }

  #[tokio::test]
  async fn test_delete_false_is_deletion_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/bank-account/a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let original = account("a1", "2024-01-01T00:00:00Z", "Checking");
    accounts.store().add(original.clone());

    let err = accounts.delete("a1").await.unwrap_err();

    assert!(err.is_deletion());
    assert_eq!(accounts.get("a1"), Some(original));
  }

  #[tokio::test]
  async fn test_delete_true_removes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .and(path("/bank-account/a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Checking"));

    accounts.delete("a1").await.unwrap();
    assert!(accounts.get("a1").is_none());
  }

  #[tokio::test]
  async fn test_delete_remote_failure_keeps_record() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "not found" })))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Checking"));

    let err = accounts.delete("a1").await.unwrap_err();
    assert!(err.remote().unwrap().is_not_found());
    assert!(accounts.get("a1").is_some());
  }

  #[tokio::test]
  async fn test_empty_id_is_rejected_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
      .expect(0)
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let err = accounts.delete("  ").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
  }

  #[tokio::test]
  async fn test_read_one_from_server_does_not_touch_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/bank-account"))
      .and(query_param("id", "a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(account_json(
        "a1",
        "2024-01-01T00:00:00Z",
        "Server title",
      )))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Cached title"));

    let fresh = accounts.read_one("a1", true).await.unwrap();
    assert_eq!(fresh.source, CacheSource::Network);
    assert_eq!(fresh.data.unwrap().title, "Server title");

    let cached = accounts.read_one("a1", false).await.unwrap();
    assert_eq!(cached.source, CacheSource::Cache);
    assert_eq!(cached.data.unwrap().title, "Cached title");
  }

  #[tokio::test]
  async fn test_read_one_from_server_list_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/bank-account"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    let err = accounts.read_one("a1", true).await.unwrap_err();
    assert!(err.remote().unwrap().is_not_found());

    let cached = accounts.read_one("a1", false).await.unwrap();
    assert!(cached.data.is_none());
  }

  #[tokio::test]
  async fn test_fetch_with_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/transaction"))
      .and(query_param("bankAccountId", "a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
        "id": "t1",
        "createdAt": "2024-02-01T00:00:00Z",
        "title": "Coffee",
        "amount": 3.2,
        "type": "EXPENSE",
        "date": "2024-02-01",
        "bankAccountId": "a1",
      }])))
      .mount(&server)
      .await;

    let transactions: SyncService<Transaction> =
      SyncService::new(ApiClient::new(&server.uri(), None, None).unwrap());
    let filter = crate::finance::TransactionFilter {
      bank_account_id: Some("a1".into()),
      ..Default::default()
    };

    assert_eq!(transactions.fetch(&filter).await.unwrap(), 1);
    assert_eq!(transactions.list()[0].title, "Coffee");
  }

  #[tokio::test]
  async fn test_concurrent_updates_last_completion_wins() {
    let server = MockServer::start().await;
    // Issued first, completes last.
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .and(body_json(json!({ "title": "First" })))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(account_json("a1", "2024-01-01T00:00:00Z", "First"))
          .set_delay(Duration::from_millis(300)),
      )
      .mount(&server)
      .await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .and(body_json(json!({ "title": "Second" })))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(account_json("a1", "2024-01-01T00:00:00Z", "Second"))
          .set_delay(Duration::from_millis(20)),
      )
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Original"));

    let first = {
      let accounts = accounts.clone();
      tokio::spawn(async move { accounts.update("a1", json!({ "title": "First" })).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = accounts.update("a1", json!({ "title": "Second" }));

    second.await.unwrap();
    first.await.unwrap().unwrap();

    assert_eq!(accounts.get("a1").unwrap().title, "First");
    assert_eq!(accounts.list().len(), 1);
  }

  #[tokio::test]
  async fn test_delete_completing_before_update_keeps_row_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
      .and(path("/bank-account/a1"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(account_json("a1", "2024-01-01T00:00:00Z", "Late edit"))
          .set_delay(Duration::from_millis(300)),
      )
      .mount(&server)
      .await;
    Mock::given(method("DELETE"))
      .and(path("/bank-account/a1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
      .mount(&server)
      .await;

    let accounts = service(&server).await;
    accounts
      .store()
      .add(account("a1", "2024-01-01T00:00:00Z", "Original"));

    let edit = {
      let accounts = accounts.clone();
      tokio::spawn(async move { accounts.update("a1", json!({ "title": "Late edit" })).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    accounts.delete("a1").await.unwrap();

    // The update still succeeds remotely but finds nothing to overwrite.
    edit.await.unwrap().unwrap();
    assert!(accounts.get("a1").is_none());
  }
}
