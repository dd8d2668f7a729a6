//! Async HTTP client wrapping the observer telemetry API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use observer_core::{
  subject::Subject,
  telemetry::{TelemetryRequest, TelemetryResponse},
};
use reqwest::{Client, Response, StatusCode, Url};

/// Connection settings for the observer API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub timeout:  Duration,
}

/// Async HTTP client for the observer JSON API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// `{base}/api/subjects/{fingerprint}` with the fingerprint as one
  /// percent-encoded path segment.
  fn subject_url(&self, fingerprint: &str) -> Result<Url> {
    let mut url = Url::parse(&self.url("/subjects"))
      .with_context(|| format!("invalid base url {:?}", self.config.base_url))?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("base url {:?} cannot hold a path", self.config.base_url))?
      .push(fingerprint);
    Ok(url)
  }

  /// `POST /api/telemetry`
  pub async fn record_visit(&self, request: &TelemetryRequest) -> Result<TelemetryResponse> {
    let resp = self
      .client
      .post(self.url("/telemetry"))
      .json(request)
      .send()
      .await
      .context("POST /telemetry failed")?;

    if !resp.status().is_success() {
      return Err(error_from(resp, "POST /telemetry").await);
    }
    resp.json().await.context("deserialising telemetry response")
  }

  /// `GET /api/subjects/:fingerprint` — `None` on 404.
  pub async fn get_subject(&self, fingerprint: &str) -> Result<Option<Subject>> {
    let resp = self
      .client
      .get(self.subject_url(fingerprint)?)
      .send()
      .await
      .context("GET /subjects failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(error_from(resp, "GET /subjects").await);
    }
    resp.json().await.map(Some).context("deserialising subject")
  }
}

/// Turn a non-success response into an error carrying the server's
/// `{"error": ...}` message when there is one.
async fn error_from(resp: Response, what: &str) -> anyhow::Error {
  let status = resp.status();
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned));
  match message {
    Some(m) => anyhow!("{what} → {status}: {m}"),
    None => anyhow!("{what} → {status}"),
  }
}
