//! Local signal gathering.
//!
//! A terminal has no graphics context or screen metrics of its own, so those
//! signals default to sentinels; everything can be overridden by flag to
//! impersonate a particular browser.

use clap::Args;
use observer_core::{
  classify::{Classification, DeviceSignals, classify},
  descriptor::{GPU_HEADLESS, HardwareDescriptor, ObservedHardware, ScreenResolution},
};

/// Flags that override locally detected signals.
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
  /// Unmasked GPU renderer string.
  #[arg(long)]
  pub gpu:          Option<String>,
  #[arg(long)]
  pub user_agent:   Option<String>,
  /// Platform token, e.g. `iPhone` or `MacIntel`.
  #[arg(long)]
  pub platform:     Option<String>,
  /// Physical screen size as `<width>x<height>`.
  #[arg(long, value_parser = parse_screen)]
  pub screen:       Option<ScreenResolution>,
  #[arg(long)]
  pub pixel_ratio:  Option<f64>,
  #[arg(long)]
  pub touch_points: Option<u32>,
  /// Viewport size as `<width>x<height>`; defaults to the screen size.
  #[arg(long, value_parser = parse_screen)]
  pub viewport:     Option<ScreenResolution>,
  #[arg(long)]
  pub cores:        Option<u32>,
  /// Language tag, e.g. `en-US`.
  #[arg(long)]
  pub locale:       Option<String>,
}

fn parse_screen(s: &str) -> Result<ScreenResolution, String> {
  ScreenResolution::parse(s).ok_or_else(|| format!("expected <width>x<height>, got {s:?}"))
}

/// Everything a probe produced.
#[derive(Debug, Clone)]
pub struct Probe {
  pub signals:        DeviceSignals,
  pub classification: Classification,
  pub descriptor:     HardwareDescriptor,
}

/// Gather local signals, apply overrides, classify, and resolve sentinels.
pub fn probe(args: &ProbeArgs) -> Probe {
  probe_with(args, |key| std::env::var(key).ok())
}

fn probe_with(args: &ProbeArgs, env: impl Fn(&str) -> Option<String>) -> Probe {
  let gpu = args.gpu.clone().unwrap_or_else(|| GPU_HEADLESS.to_owned());
  let platform = args.platform.clone().unwrap_or_else(local_platform);
  let screen = args.screen;
  let viewport = args.viewport.or(screen).unwrap_or_default();

  let signals = DeviceSignals {
    user_agent:       args.user_agent.clone().unwrap_or_else(local_user_agent),
    platform:         platform.clone(),
    max_touch_points: args.touch_points.unwrap_or(0),
    screen_width:     screen.map_or(0, |s| s.width),
    screen_height:    screen.map_or(0, |s| s.height),
    pixel_ratio:      args.pixel_ratio.unwrap_or(1.0),
    viewport_width:   viewport.width,
    viewport_height:  viewport.height,
    gpu_renderer:     gpu.clone(),
  };
  let classification = classify(&signals);

  let descriptor = ObservedHardware {
    model: Some(classification.model.clone()),
    gpu: Some(gpu),
    screen,
    platform: Some(platform),
    cores: args.cores.or_else(local_cores),
    locale: args.locale.clone().or_else(|| locale_from_env(&env)),
  }
  .resolve();

  Probe { signals, classification, descriptor }
}

fn local_platform() -> String {
  format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
}

fn local_user_agent() -> String { format!("observer-cli/{}", env!("CARGO_PKG_VERSION")) }

fn local_cores() -> Option<u32> {
  std::thread::available_parallelism()
    .ok()
    .and_then(|n| u32::try_from(n.get()).ok())
}

/// First usable POSIX locale variable, as a language tag.
fn locale_from_env(env: impl Fn(&str) -> Option<String>) -> Option<String> {
  ["LC_ALL", "LC_MESSAGES", "LANG"]
    .into_iter()
    .filter_map(|key| env(key))
    .find_map(|v| posix_to_tag(&v))
}

/// `en_US.UTF-8@euro` → `en-US`. `C` and `POSIX` carry no language.
fn posix_to_tag(value: &str) -> Option<String> {
  let base = value.split(['.', '@']).next()?.trim();
  if base.is_empty() || base == "C" || base == "POSIX" {
    return None;
  }
  Some(base.replace('_', "-"))
}
