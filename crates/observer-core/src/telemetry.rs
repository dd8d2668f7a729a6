//! Wire types shared by the telemetry endpoint and its clients.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::descriptor::HardwareDescriptor;

/// Where the client's last sync attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
  #[default]
  Connecting,
  Synced,
  Offline,
}

/// City recorded when the network lookup could not be made at all.
pub const CITY_MASKED: &str = "MASKED_BY_CLIENT";

/// Network facts about the visitor, overwritten on every sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
  pub ip:      String,
  pub city:    String,
  pub country: String,
  pub isp:     String,
  pub asn:     String,
}

impl Default for NetworkSnapshot {
  fn default() -> Self {
    Self {
      ip:      "SEARCHING...".into(),
      city:    "TRIANGULATING".into(),
      country: "---".into(),
      isp:     "UNKNOWN_ORG".into(),
      asn:     "---".into(),
    }
  }
}

impl NetworkSnapshot {
  /// Placeholders, except for a city that says the lookup was blocked.
  pub fn masked() -> Self { Self { city: CITY_MASKED.into(), ..Self::default() } }
}

/// Hardware facts as sent alongside a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSnapshot {
  pub gpu:        String,
  pub model:      String,
  pub platform:   String,
  pub screen_res: String,
  pub cores:      u32,
  pub locale:     String,
}

impl From<&HardwareDescriptor> for HardwareSnapshot {
  fn from(d: &HardwareDescriptor) -> Self {
    Self {
      gpu:        d.gpu.clone(),
      model:      d.model.clone(),
      platform:   d.platform.clone(),
      screen_res: d.screen_resolution.clone(),
      cores:      d.cores,
      locale:     d.locale.clone(),
    }
  }
}

/// Body of `POST /api/telemetry` as a well-behaved client sends it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryRequest {
  pub fingerprint: String,
  pub network:     NetworkSnapshot,
  pub hardware:    HardwareSnapshot,
}

/// Successful response of `POST /api/telemetry`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryResponse {
  pub success:     bool,
  pub visit_count: u64,
  pub id:          String,
}
