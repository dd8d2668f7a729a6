//! Best-effort network snapshot from an ipwho.is-compatible endpoint.
//!
//! The lookup never fails the caller. A reply with `success: false` keeps the
//! placeholders; an unreachable or unreadable endpoint also marks the city
//! as masked.

use std::time::Duration;

use anyhow::{Context, Result};
use observer_core::telemetry::NetworkSnapshot;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_LOOKUP_URL: &str = "https://ipwho.is/";

const ISP_UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Deserialize)]
struct IpWhoIs {
  #[serde(default)]
  success:    bool,
  ip:         Option<String>,
  city:       Option<String>,
  country:    Option<String>,
  #[serde(default)]
  connection: Connection,
}

#[derive(Debug, Default, Deserialize)]
struct Connection {
  asn: Option<u64>,
  org: Option<String>,
  isp: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> { s.filter(|s| !s.is_empty()) }

impl IpWhoIs {
  fn into_snapshot(self) -> NetworkSnapshot {
    let d = NetworkSnapshot::default();
    let Connection { asn, org, isp } = self.connection;
    NetworkSnapshot {
      ip:      non_empty(self.ip).unwrap_or(d.ip),
      city:    non_empty(self.city).unwrap_or(d.city),
      country: non_empty(self.country).unwrap_or(d.country),
      isp:     non_empty(isp)
        .or_else(|| non_empty(org))
        .unwrap_or_else(|| ISP_UNKNOWN.to_owned()),
      asn:     asn.map_or(d.asn, |n| format!("ASN{n}")),
    }
  }
}

pub struct NetworkLookup {
  client: Client,
  url:    String,
}

impl NetworkLookup {
  pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, url: url.into() })
  }

  pub async fn lookup(&self) -> NetworkSnapshot {
    match self.fetch().await {
      Ok(Some(snapshot)) => snapshot,
      Ok(None) => {
        tracing::warn!(url = %self.url, "network lookup reported no result");
        NetworkSnapshot::default()
      }
      Err(e) => {
        tracing::warn!(error = %e, "network lookup failed");
        NetworkSnapshot::masked()
      }
    }
  }

  async fn fetch(&self) -> Result<Option<NetworkSnapshot>> {
    let body: IpWhoIs = self
      .client
      .get(&self.url)
      .send()
      .await
      .with_context(|| format!("GET {} failed", self.url))?
      .error_for_status()?
      .json()
      .await
      .context("deserialising network lookup")?;

    if !body.success {
      return Ok(None);
    }
    Ok(Some(body.into_snapshot()))
  }
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, routing::get};
  use observer_core::telemetry::CITY_MASKED;
  use serde_json::{Value, json};
  use tokio::net::TcpListener;

  use super::*;

  async fn serve_reply(body: Value) -> String {
    let app = Router::new().route("/", get(move || async move { Json(body) }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/")
  }

  fn lookup(url: String) -> NetworkLookup {
    NetworkLookup::new(url, Duration::from_secs(5)).unwrap()
  }

  #[tokio::test]
  async fn successful_reply_fills_every_field() {
    let url = serve_reply(json!({
      "success": true,
      "ip": "203.0.113.7",
      "city": "Lisbon",
      "country": "Portugal",
      "connection": { "asn": 3243, "org": "MEO", "isp": "MEO - Servicos" }
    }))
    .await;

    assert_eq!(lookup(url).lookup().await, NetworkSnapshot {
      ip:      "203.0.113.7".into(),
      city:    "Lisbon".into(),
      country: "Portugal".into(),
      isp:     "MEO - Servicos".into(),
      asn:     "ASN3243".into(),
    });
  }

  #[tokio::test]
  async fn isp_falls_back_to_org_then_unknown() {
    let url = serve_reply(json!({
      "success": true, "ip": "198.51.100.1", "city": "Oslo", "country": "Norway",
      "connection": { "org": "Telenor", "isp": "" }
    }))
    .await;
    let n = lookup(url).lookup().await;
    assert_eq!(n.isp, "Telenor");
    assert_eq!(n.asn, "---");

    let url = serve_reply(json!({ "success": true, "ip": "198.51.100.2" })).await;
    let n = lookup(url).lookup().await;
    assert_eq!(n.isp, ISP_UNKNOWN);
    assert_eq!(n.city, NetworkSnapshot::default().city);
  }

  #[tokio::test]
  async fn unsuccessful_reply_keeps_placeholders() {
    let url = serve_reply(json!({ "success": false, "message": "reserved range" })).await;
    assert_eq!(lookup(url).lookup().await, NetworkSnapshot::default());
  }

  #[tokio::test]
  async fn unreachable_endpoint_masks_city() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let n = lookup(format!("http://{addr}/")).lookup().await;
    assert_eq!(n.city, CITY_MASKED);
    assert_eq!(n.ip, "SEARCHING...");
  }

  #[tokio::test]
  async fn unreadable_reply_masks_city() {
    let app = Router::new().route("/", get(|| async { "rate limited" }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let n = lookup(format!("http://{addr}/")).lookup().await;
    assert_eq!(n, NetworkSnapshot::masked());
  }
}
