//! One sync attempt per session, degrading to `OFFLINE` on any failure.

use observer_core::telemetry::{SyncStatus, TelemetryRequest};

use crate::client::ApiClient;

pub struct SyncSession {
  client:      ApiClient,
  status:      SyncStatus,
  visit_count: Option<u64>,
  attempted:   bool,
}

impl SyncSession {
  pub fn new(client: ApiClient) -> Self {
    Self { client, status: SyncStatus::Connecting, visit_count: None, attempted: false }
  }

  pub fn status(&self) -> SyncStatus { self.status }

  /// Post-upsert count from the ledger, once synced.
  pub fn visit_count(&self) -> Option<u64> { self.visit_count }

  /// Send `request` unless this session already tried. Failures are logged
  /// and leave the session `OFFLINE`; they are never retried.
  pub async fn sync(&mut self, request: &TelemetryRequest) -> SyncStatus {
    if self.attempted {
      return self.status;
    }
    self.attempted = true;

    self.status = match self.client.record_visit(request).await {
      Ok(resp) if resp.success => {
        self.visit_count = Some(resp.visit_count);
        SyncStatus::Synced
      }
      Ok(_) => {
        tracing::warn!("ledger reported an unsuccessful sync");
        SyncStatus::Offline
      }
      Err(e) => {
        tracing::warn!(error = %e, "telemetry sync failed");
        SyncStatus::Offline
      }
    };
    self.status
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::Arc, time::Duration};

  use observer_core::{
    compute_fingerprint,
    descriptor::HardwareDescriptor,
    telemetry::{HardwareSnapshot, NetworkSnapshot},
  };
  use observer_store_sqlite::SqliteLedger;
  use tokio::net::TcpListener;

  use super::*;
  use crate::client::ApiConfig;

  fn descriptor() -> HardwareDescriptor {
    HardwareDescriptor {
      model:             "APPLE_IPHONE_14_15_PRO".into(),
      gpu:               "Apple GPU".into(),
      screen_resolution: "390x844".into(),
      platform:          "iPhone".into(),
      cores:             6,
      locale:            "en-US".into(),
    }
  }

  fn request() -> TelemetryRequest {
    let d = descriptor();
    TelemetryRequest {
      fingerprint: compute_fingerprint(&d).to_string(),
      network:     NetworkSnapshot::default(),
      hardware:    HardwareSnapshot::from(&d),
    }
  }

  fn client(base_url: String) -> ApiClient {
    ApiClient::new(ApiConfig { base_url, timeout: Duration::from_secs(5) }).unwrap()
  }

  /// Serve the API on an ephemeral port; returns its base URL.
  async fn serve() -> String {
    let ledger = Arc::new(SqliteLedger::open_in_memory().await.unwrap());
    let app = axum::Router::new().nest("/api", observer_api::api_router(ledger));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  #[tokio::test]
  async fn golden_descriptor_counts_visits_end_to_end() {
    let base = serve().await;
    assert_eq!(request().fingerprint, "UID-A0243DBB");

    let mut first = SyncSession::new(client(base.clone()));
    assert_eq!(first.status(), SyncStatus::Connecting);
    assert_eq!(first.sync(&request()).await, SyncStatus::Synced);
    assert_eq!(first.visit_count(), Some(1));

    let mut second = SyncSession::new(client(base.clone()));
    assert_eq!(second.sync(&request()).await, SyncStatus::Synced);
    assert_eq!(second.visit_count(), Some(2));

    let stored = client(base).get_subject("UID-A0243DBB").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 2);
    assert_eq!(stored.hardware["screenRes"], "390x844");
  }

  #[tokio::test]
  async fn session_syncs_at_most_once() {
    let base = serve().await;

    let mut session = SyncSession::new(client(base.clone()));
    session.sync(&request()).await;
    session.sync(&request()).await;
    assert_eq!(session.visit_count(), Some(1));

    let stored = client(base).get_subject("UID-A0243DBB").await.unwrap().unwrap();
    assert_eq!(stored.visit_count, 1);
  }

  #[tokio::test]
  async fn unreachable_ledger_goes_offline() {
    // Grab a free port, then release it so nothing is listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut session = SyncSession::new(client(format!("http://{addr}")));
    assert_eq!(session.sync(&request()).await, SyncStatus::Offline);
    assert_eq!(session.visit_count(), None);
  }

  #[tokio::test]
  async fn rejected_sync_goes_offline() {
    let base = serve().await;
    let mut bad = request();
    bad.fingerprint = String::new();

    let mut session = SyncSession::new(client(base));
    assert_eq!(session.sync(&bad).await, SyncStatus::Offline);
  }

  #[tokio::test]
  async fn fingerprints_with_url_syntax_fetch_their_own_record() {
    let base = serve().await;
    let api = client(base);

    let ids = ["UID-A", "UID-A?x=1", "UID-A#frag", "UID-A/b", "UID A%20"];
    for id in ids {
      let mut req = request();
      req.fingerprint = id.to_owned();
      api.record_visit(&req).await.unwrap();
    }

    for id in ids {
      let stored = api.get_subject(id).await.unwrap().unwrap();
      assert_eq!(stored.fingerprint, id);
    }
  }

  #[tokio::test]
  async fn unknown_subject_is_none() {
    let base = serve().await;
    assert!(client(base).get_subject("UID-DEADBEEF").await.unwrap().is_none());
  }
}
