//! Best-effort device-model classification.
//!
//! Signals are matched against [`RULES`], an ordered table evaluated top to
//! bottom; the first rule that yields a label wins. Nothing here can fail:
//! unrecognised devices land in [`FALLBACK_MODEL`]. New device signatures are
//! added by appending to the tables, not by adding branches.

use std::sync::LazyLock;

use regex::Regex;

/// Label returned when no rule matches.
pub const FALLBACK_MODEL: &str = "GENERIC_HANDSET_TYPE_01";

const APPLE_TABLET: &str = "APPLE_IPAD_GENERIC";
const APPLE_GENERIC: &str = "APPLE_GENERIC_IOS_DEVICE";

/// Minimum viewport edge at which an unmatched Apple device is taken to be a
/// tablet.
const TABLET_MIN_VIEWPORT: u32 = 768;

/// Generic `; <model> Build/` captures at or above this many UTF-16 units are
/// rejected.
const GENERIC_MODEL_MAX_LEN: usize = 30;

// ─── Signals ─────────────────────────────────────────────────────────────────

/// Everything the classifier looks at. Supplied verbatim by the collector.
#[derive(Debug, Clone, Default)]
pub struct DeviceSignals {
  pub user_agent:       String,
  /// Platform token, e.g. `iPhone`, `MacIntel`, `Linux armv8l`.
  pub platform:         String,
  pub max_touch_points: u32,
  pub screen_width:     u32,
  pub screen_height:    u32,
  pub pixel_ratio:      f64,
  pub viewport_width:   u32,
  pub viewport_height:  u32,
  pub gpu_renderer:     String,
}

impl DeviceSignals {
  fn long_edge(&self) -> u32 { self.screen_width.max(self.screen_height) }

  fn min_viewport(&self) -> u32 { self.viewport_width.min(self.viewport_height) }

  /// A ratio of zero means "unreported" and is treated as 1.
  fn effective_pixel_ratio(&self) -> f64 {
    if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 }
  }

  /// iPadOS reports a desktop `MacIntel` platform but has multi-touch.
  fn is_apple_mobile(&self) -> bool {
    APPLE_UA.is_match(&self.user_agent)
      || (self.platform == "MacIntel" && self.max_touch_points > 1)
  }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

/// A known Apple handset screen: physical long edge and pixel density.
struct AppleScreen {
  long_edge:   u32,
  pixel_ratio: f64,
  label:       &'static str,
}

const APPLE_SCREENS: &[AppleScreen] = &[
  AppleScreen { long_edge: 932, pixel_ratio: 3.0, label: "APPLE_IPHONE_14_15_PRO_MAX" },
  AppleScreen { long_edge: 852, pixel_ratio: 3.0, label: "APPLE_IPHONE_14_15_PRO" },
  AppleScreen { long_edge: 926, pixel_ratio: 3.0, label: "APPLE_IPHONE_12_13_PRO_MAX" },
  AppleScreen { long_edge: 844, pixel_ratio: 3.0, label: "APPLE_IPHONE_12_13_PRO" },
  AppleScreen { long_edge: 896, pixel_ratio: 3.0, label: "APPLE_IPHONE_11_PRO_MAX" },
  AppleScreen { long_edge: 896, pixel_ratio: 2.0, label: "APPLE_IPHONE_11_XR" },
  AppleScreen { long_edge: 812, pixel_ratio: 3.0, label: "APPLE_IPHONE_X_XS" },
  AppleScreen { long_edge: 736, pixel_ratio: 3.0, label: "APPLE_IPHONE_PLUS_SERIES" },
  AppleScreen { long_edge: 667, pixel_ratio: 2.0, label: "APPLE_IPHONE_STD_SERIES" },
];

/// GPU renderer substrings, checked in order.
const GPU_BUCKETS: &[(&str, &str)] = &[
  ("Adreno", "QUALCOMM_ADRENO_HANDSET"),
  ("Mali", "ARM_MALI_HANDSET"),
  ("Apple", "APPLE_SILICON_DEVICE"),
  ("Intel", "DESKTOP_INTEL_ARCH"),
  ("NVIDIA", "DESKTOP_NVIDIA_ARCH"),
];

static APPLE_UA: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)iPhone|iPad|iPod").expect("apple ua pattern"));
static SAMSUNG_MODEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)SM-[A-Z0-9]+").expect("samsung pattern"));
static PIXEL_MODEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)Pixel\s([0-9a-zA-Z\s]+)").expect("pixel pattern"));
static ONEPLUS_MARKER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)OnePlus").expect("oneplus pattern"));
static ONEPLUS_MODEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)OnePlus\s([A-Z0-9]+)").expect("oneplus model pattern"));
static BUILD_MODEL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r";\s([^;]+?)\s+Build/").expect("build pattern"));
static SAMSUNG_WORD: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)Samsung").expect("samsung word pattern"));
static WHITESPACE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static SEPARATORS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"[\s()]+").expect("separator pattern"));

// ─── Rules ───────────────────────────────────────────────────────────────────

/// One predicate → label step of the classifier.
pub struct Rule {
  pub name: &'static str,
  apply:    fn(&DeviceSignals) -> Option<String>,
}

/// The classifier, in priority order.
pub static RULES: &[Rule] = &[
  Rule { name: "apple", apply: apple },
  Rule { name: "samsung", apply: samsung },
  Rule { name: "pixel", apply: pixel },
  Rule { name: "oneplus", apply: oneplus },
  Rule { name: "android_build", apply: android_build },
  Rule { name: "gpu", apply: gpu_bucket },
];

fn apple(s: &DeviceSignals) -> Option<String> {
  if !s.is_apple_mobile() {
    return None;
  }
  let long_edge = s.long_edge();
  let ratio = s.effective_pixel_ratio();
  let label = APPLE_SCREENS
    .iter()
    .find(|a| a.long_edge == long_edge && a.pixel_ratio == ratio)
    .map(|a| a.label)
    .unwrap_or(if s.min_viewport() >= TABLET_MIN_VIEWPORT {
      APPLE_TABLET
    } else {
      APPLE_GENERIC
    });
  Some(label.to_owned())
}

fn samsung(s: &DeviceSignals) -> Option<String> {
  let m = SAMSUNG_MODEL.find(&s.user_agent)?;
  Some(format!("SAMSUNG_{}", m.as_str().to_uppercase()))
}

fn pixel(s: &DeviceSignals) -> Option<String> {
  let caps = PIXEL_MODEL.captures(&s.user_agent)?;
  let model = WHITESPACE.replace_all(caps[1].trim(), "_").to_uppercase();
  Some(format!("GOOGLE_PIXEL_{model}"))
}

fn oneplus(s: &DeviceSignals) -> Option<String> {
  if !ONEPLUS_MARKER.is_match(&s.user_agent) {
    return None;
  }
  let model = ONEPLUS_MODEL
    .captures(&s.user_agent)
    .map(|c| c[1].to_uppercase())
    .unwrap_or_else(|| "GENERIC".to_owned());
  Some(format!("ONEPLUS_{model}"))
}

fn android_build(s: &DeviceSignals) -> Option<String> {
  let caps = BUILD_MODEL.captures(&s.user_agent)?;
  let raw = &caps[1];
  if raw.encode_utf16().count() >= GENERIC_MODEL_MAX_LEN {
    return None;
  }
  let stripped = SAMSUNG_WORD.replace(raw, "");
  let model = SEPARATORS.replace_all(stripped.trim(), "_").to_uppercase();
  Some(format!("ANDROID_{model}"))
}

fn gpu_bucket(s: &DeviceSignals) -> Option<String> {
  GPU_BUCKETS
    .iter()
    .find(|(needle, _)| s.gpu_renderer.contains(needle))
    .map(|(_, label)| (*label).to_owned())
}

// ─── Entry points ────────────────────────────────────────────────────────────

/// A model label and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
  pub model: String,
  /// `None` when the fallback label was used.
  pub rule:  Option<&'static str>,
}

/// Classify with provenance.
pub fn classify(signals: &DeviceSignals) -> Classification {
  RULES
    .iter()
    .find_map(|rule| {
      (rule.apply)(signals).map(|model| Classification { model, rule: Some(rule.name) })
    })
    .unwrap_or_else(|| Classification { model: FALLBACK_MODEL.to_owned(), rule: None })
}

/// Classify, returning only the model label.
pub fn classify_device(signals: &DeviceSignals) -> String { classify(signals).model }
