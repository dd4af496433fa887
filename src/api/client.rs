use std::time::Duration;

use color_eyre::{eyre::eyre, Result as EyreResult};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::api::api_types::ApiErrorBody;
use crate::api::payload::Payload;
use crate::config::Config;
use crate::error::{RemoteError, Result, SyncError};

/// Finance API client wrapper, shared by every entity's CRUD client.
#[derive(Clone)]
pub struct ApiClient {
  http: reqwest::Client,
  base_url: String,
  token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ApiClient")
      .field("base_url", &self.base_url)
      .field("authenticated", &self.token.is_some())
      .finish_non_exhaustive()
  }
}

impl ApiClient {
  pub fn from_config(config: &Config) -> EyreResult<Self> {
    Self::new(
      &config.api.url,
      Config::get_api_token(),
      config.api.timeout_secs.map(Duration::from_secs),
    )
  }

  pub fn new(base_url: &str, token: Option<String>, timeout: Option<Duration>) -> EyreResult<Self> {
    let parsed =
      Url::parse(base_url).map_err(|e| eyre!("Invalid API url '{}': {}", base_url, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
      return Err(eyre!("API url must be http or https, got '{}'", base_url));
    }

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }
    let http = builder
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: parsed.as_str().trim_end_matches('/').to_string(),
      token,
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Absolute URL for an API path such as `/transaction/t1`.
  pub fn endpoint(&self, path: &str) -> String {
    if path.starts_with('/') {
      format!("{}{}", self.base_url, path)
    } else {
      format!("{}/{}", self.base_url, path)
    }
  }

  /// Absolute URL for one record under `path`, the id escaped as a single
  /// path segment (`a 1` becomes `a%201`, `a/b` becomes `a%2Fb`).
  pub fn item_endpoint(&self, path: &str, id: &str) -> Result<Url> {
    let endpoint = self.endpoint(path);
    let mut url = Url::parse(&endpoint)
      .map_err(|e| SyncError::Validation(format!("invalid endpoint {}: {}", endpoint, e)))?;
    url
      .path_segments_mut()
      .map_err(|_| SyncError::Validation(format!("endpoint {} cannot take a path", endpoint)))?
      .push(id);
    Ok(url)
  }

  /// Send one request and decode the JSON response.
  ///
  /// Exactly one attempt is made. Non-2xx statuses become `RemoteError`
  /// carrying the server's `message` when the body has one.
  pub async fn send<R: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    query: Option<&str>,
    body: Option<Payload>,
    entity_type: &'static str,
  ) -> Result<R> {
    self
      .execute(method, self.endpoint(path), query, body, entity_type)
      .await
  }

  /// `send` against a single record, see [`ApiClient::item_endpoint`].
  pub async fn send_item<R: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    id: &str,
    body: Option<Payload>,
    entity_type: &'static str,
  ) -> Result<R> {
    let url = self.item_endpoint(path, id)?;
    self
      .execute(method, url.into(), None, body, entity_type)
      .await
  }

  async fn execute<R: DeserializeOwned>(
    &self,
    method: Method,
    mut url: String,
    query: Option<&str>,
    body: Option<Payload>,
    entity_type: &'static str,
  ) -> Result<R> {
    if let Some(query) = query.filter(|q| !q.is_empty()) {
      url.push('?');
      url.push_str(query);
    }

    let request = self.authorize(self.http.request(method.clone(), &url));
    let request = match body {
      Some(Payload::Json(value)) => request.json(&value),
      Some(Payload::Multipart(form)) => request.multipart(form.into_form()?),
      None => request,
    };

    let response = request.send().await.map_err(|e| {
      warn!(%method, %url, error = %e, "request failed before a response");
      RemoteError::from(e)
    })?;

    let status = response.status();
    debug!(%method, %url, status = status.as_u16(), "{} response", entity_type);

    let bytes = response.bytes().await.map_err(RemoteError::from)?;

    if !status.is_success() {
      let message = ApiErrorBody::message_from(&bytes)
        .or_else(|| status.canonical_reason().map(String::from));
      return Err(RemoteError::status(status.as_u16(), message).into());
    }

    serde_json::from_slice(&bytes).map_err(|e| SyncError::Decode {
      entity_type,
      message: e.to_string(),
    })
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }
}
