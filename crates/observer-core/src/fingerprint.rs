//! Fingerprint generation.
//!
//! A fingerprint is a DJB2-style rolling hash over a `|`-joined signature of
//! the [`HardwareDescriptor`], rendered as `UID-` plus eight uppercase hex
//! digits. The accumulator is a `u32` that wraps after every multiply-XOR
//! step, and input is consumed as UTF-16 code units so that a browser-side
//! implementation using `charCodeAt` agrees bit for bit.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, descriptor::HardwareDescriptor};

pub const PREFIX: &str = "UID-";

const SEED: u32 = 5381;
const MULTIPLIER: u32 = 33;
const DELIMITER: &str = "|";

/// A `UID-XXXXXXXX` identity string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(u32);

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{PREFIX}{:08X}", self.0)
  }
}

impl FromStr for Fingerprint {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let malformed = || Error::MalformedFingerprint(s.to_owned());
    let hex = s.strip_prefix(PREFIX).ok_or_else(malformed)?;
    if hex.len() != 8
      || !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    {
      return Err(malformed());
    }
    u32::from_str_radix(hex, 16).map(Fingerprint).map_err(|_| malformed())
  }
}

impl Serialize for Fingerprint {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Fingerprint {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

/// Join the descriptor fields in their fixed order.
pub fn signature(d: &HardwareDescriptor) -> String {
  let cores = d.cores.to_string();
  [
    d.model.as_str(),
    d.gpu.as_str(),
    d.screen_resolution.as_str(),
    d.platform.as_str(),
    cores.as_str(),
    d.locale.as_str(),
  ]
  .join(DELIMITER)
}

fn djb2_xor(input: &str) -> u32 {
  input
    .encode_utf16()
    .fold(SEED, |acc, unit| acc.wrapping_mul(MULTIPLIER) ^ u32::from(unit))
}

/// Derive the fingerprint for `d`. Pure and total.
pub fn compute_fingerprint(d: &HardwareDescriptor) -> Fingerprint {
  Fingerprint(djb2_xor(&signature(d)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::descriptor::ObservedHardware;

  fn iphone() -> HardwareDescriptor {
    HardwareDescriptor {
      model:             "APPLE_IPHONE_14_15_PRO".into(),
      gpu:               "Apple GPU".into(),
      screen_resolution: "390x844".into(),
      platform:          "iPhone".into(),
      cores:             6,
      locale:            "en-US".into(),
    }
  }

  fn assert_format(s: &str) {
    let hex = s.strip_prefix("UID-").unwrap_or_else(|| panic!("no prefix: {s}"));
    assert_eq!(hex.len(), 8, "{s}");
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)), "{s}");
  }

  #[test]
  fn golden_value() {
    assert_eq!(
      signature(&iphone()),
      "APPLE_IPHONE_14_15_PRO|Apple GPU|390x844|iPhone|6|en-US"
    );
    assert_eq!(compute_fingerprint(&iphone()).to_string(), "UID-A0243DBB");
  }

  #[test]
  fn deterministic() {
    assert_eq!(compute_fingerprint(&iphone()), compute_fingerprint(&iphone()));
  }

  #[test]
  fn sentinel_descriptor_is_well_formed() {
    let fp = compute_fingerprint(&ObservedHardware::default().resolve());
    assert_eq!(fp.to_string(), "UID-56B6169A");
  }

  #[test]
  fn short_hashes_are_zero_padded() {
    // An empty signature leaves the seed untouched.
    assert_eq!(djb2_xor(""), 5381);
    assert_eq!(Fingerprint(djb2_xor("")).to_string(), "UID-00001505");
  }

  #[test]
  fn non_ascii_uses_utf16_units() {
    assert_eq!(Fingerprint(djb2_xor("é")).to_string(), "UID-0002B54C");
  }

  #[test]
  fn format_holds_for_assorted_inputs() {
    let mut d = iphone();
    for gpu in ["", "ANGLE (NVIDIA GeForce RTX 4090)", "Mali-G78", "日本語", "|||"] {
      d.gpu = gpu.into();
      assert_format(&compute_fingerprint(&d).to_string());
    }
  }

  #[test]
  fn single_field_changes_alter_the_hash() {
    let base = compute_fingerprint(&iphone());
    let perturbations: [fn(&mut HardwareDescriptor); 6] = [
      |d| d.model = "APPLE_IPHONE_14_15_PRO_MAX".into(),
      |d| d.gpu = "Apple M1".into(),
      |d| d.screen_resolution = "430x932".into(),
      |d| d.platform = "MacIntel".into(),
      |d| d.cores = 8,
      |d| d.locale = "en-GB".into(),
    ];
    for perturb in perturbations {
      let mut d = iphone();
      perturb(&mut d);
      assert_ne!(compute_fingerprint(&d), base, "collision for {d:?}");
    }
  }

  #[test]
  fn cores_perturbation_matches_reference() {
    let mut d = iphone();
    d.cores = 8;
    assert_eq!(compute_fingerprint(&d).to_string(), "UID-51C81435");
  }

  #[test]
  fn parse_round_trips_display() {
    let fp = compute_fingerprint(&iphone());
    assert_eq!(fp.to_string().parse::<Fingerprint>().unwrap(), fp);
  }

  #[test]
  fn parse_rejects_malformed() {
    for s in ["", "UID-", "UID-a0243dbb", "UID-A0243DB", "UID-A0243DBBB", "XID-A0243DBB", "UID-G0243DBB"] {
      assert!(s.parse::<Fingerprint>().is_err(), "{s:?} accepted");
    }
  }
}
