//! Hardware descriptors — the fingerprint input.
//!
//! Only traits expected to survive across sessions on the same device belong
//! here. Battery level, network address and timestamps are deliberately
//! absent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::FALLBACK_MODEL;

// ─── Sentinels ───────────────────────────────────────────────────────────────

/// The graphics context could not be created at all.
pub const GPU_HEADLESS: &str = "HEADLESS_ENV_DETECTED";
/// A context exists but the unmasked renderer extension is unavailable.
pub const GPU_MASKED: &str = "WEBGL_MASKED";
/// Probing the renderer raised an error.
pub const GPU_ACCESS_DENIED: &str = "ERR_GPU_ACCESS_DENIED";
/// The renderer was reported but empty, or never supplied.
pub const GPU_GENERIC: &str = "GENERIC_RENDERER_01";

pub const UNKNOWN_PLATFORM: &str = "UNKNOWN_ARCH";
pub const UNKNOWN_LOCALE: &str = "und";
pub const UNKNOWN_SCREEN: ScreenResolution = ScreenResolution { width: 0, height: 0 };
pub const UNKNOWN_CORES: u32 = 0;

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Physical screen size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenResolution {
  pub width:  u32,
  pub height: u32,
}

impl ScreenResolution {
  pub fn new(width: u32, height: u32) -> Self { Self { width, height } }

  /// Parse `"<w>x<h>"`. Returns `None` for anything else.
  pub fn parse(s: &str) -> Option<Self> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    Some(Self {
      width:  w.trim().parse().ok()?,
      height: h.trim().parse().ok()?,
    })
  }
}

impl fmt::Display for ScreenResolution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}x{}", self.width, self.height)
  }
}

// ─── Descriptor ──────────────────────────────────────────────────────────────

/// The fixed set of hardware traits hashed into a
/// [`Fingerprint`](crate::fingerprint::Fingerprint).
///
/// Every field is always populated; absent values have already been replaced
/// by a sentinel (see [`ObservedHardware::resolve`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareDescriptor {
  /// Classification output of [`crate::classify::classify_device`].
  pub model:             String,
  pub gpu:               String,
  pub screen_resolution: String,
  pub platform:          String,
  pub cores:             u32,
  pub locale:            String,
}

/// Hardware traits as a collector observed them, any of which may be missing.
#[derive(Debug, Clone, Default)]
pub struct ObservedHardware {
  pub model:    Option<String>,
  pub gpu:      Option<String>,
  pub screen:   Option<ScreenResolution>,
  pub platform: Option<String>,
  pub cores:    Option<u32>,
  pub locale:   Option<String>,
}

impl ObservedHardware {
  /// Fill every gap with its sentinel. Blank strings count as missing.
  pub fn resolve(self) -> HardwareDescriptor {
    HardwareDescriptor {
      model:             non_blank(self.model).unwrap_or_else(|| FALLBACK_MODEL.to_owned()),
      gpu:               non_blank(self.gpu).unwrap_or_else(|| GPU_GENERIC.to_owned()),
      screen_resolution: self.screen.unwrap_or(UNKNOWN_SCREEN).to_string(),
      platform:          non_blank(self.platform).unwrap_or_else(|| UNKNOWN_PLATFORM.to_owned()),
      cores:             self.cores.unwrap_or(UNKNOWN_CORES),
      locale:            non_blank(self.locale).unwrap_or_else(|| UNKNOWN_LOCALE.to_owned()),
    }
  }
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_fills_every_gap() {
    let d = ObservedHardware::default().resolve();
    assert_eq!(d.model, FALLBACK_MODEL);
    assert_eq!(d.gpu, GPU_GENERIC);
    assert_eq!(d.screen_resolution, "0x0");
    assert_eq!(d.platform, UNKNOWN_PLATFORM);
    assert_eq!(d.cores, 0);
    assert_eq!(d.locale, UNKNOWN_LOCALE);
  }

  #[test]
  fn resolve_treats_blank_as_missing() {
    let d = ObservedHardware {
      gpu: Some("   ".into()),
      locale: Some(String::new()),
      ..Default::default()
    }
    .resolve();
    assert_eq!(d.gpu, GPU_GENERIC);
    assert_eq!(d.locale, UNKNOWN_LOCALE);
  }

  #[test]
  fn resolve_keeps_observed_values() {
    let d = ObservedHardware {
      model:    Some("APPLE_IPHONE_14_15_PRO".into()),
      gpu:      Some("Apple GPU".into()),
      screen:   Some(ScreenResolution::new(390, 844)),
      platform: Some("iPhone".into()),
      cores:    Some(6),
      locale:   Some("en-US".into()),
    }
    .resolve();
    assert_eq!(d.screen_resolution, "390x844");
    assert_eq!(d.cores, 6);
    assert_eq!(d.platform, "iPhone");
  }

  #[test]
  fn screen_resolution_parses() {
    assert_eq!(ScreenResolution::parse("1920x1080"), Some(ScreenResolution::new(1920, 1080)));
    assert_eq!(ScreenResolution::parse(" 390 X 844 "), Some(ScreenResolution::new(390, 844)));
    assert_eq!(ScreenResolution::parse("wide"), None);
    assert_eq!(ScreenResolution::parse("12x"), None);
  }
}
