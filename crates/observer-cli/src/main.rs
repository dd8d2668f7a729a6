//! `observer` — command-line client for the observer telemetry backend.
//!
//! # Usage
//!
//! ```text
//! observer fingerprint --gpu "Apple GPU" --platform iPhone --screen 390x844
//! observer --url http://localhost:3000 sync --locale en-US
//! observer show UID-A0243DBB
//! ```

mod client;
mod network;
mod probe;
mod session;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use network::{DEFAULT_LOOKUP_URL, NetworkLookup};
use observer_core::{
  compute_fingerprint,
  fingerprint::signature,
  telemetry::{HardwareSnapshot, NetworkSnapshot, TelemetryRequest},
};
use probe::{ProbeArgs, probe};
use serde::Deserialize;
use session::SyncSession;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "observer", about = "Fingerprint this device and sync with the observer ledger")]
struct Cli {
  /// Path to a TOML config file (url, timeout_secs).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// Base URL of the observer server (default: http://localhost:3000).
  #[arg(long, env = "OBSERVER_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the descriptor and fingerprint without contacting the server.
  Fingerprint(ProbeArgs),
  /// Compute the fingerprint and record a visit.
  Sync {
    #[command(flatten)]
    probe:   ProbeArgs,
    #[command(flatten)]
    network: NetworkArgs,
  },
  /// Show the stored record for a fingerprint.
  Show { fingerprint: String },
}

/// Network snapshot overrides, applied over the looked-up values.
#[derive(Args, Debug, Default)]
struct NetworkArgs {
  /// Skip the network lookup and send placeholders.
  #[arg(long)]
  no_lookup: bool,
  #[arg(long)]
  ip:      Option<String>,
  #[arg(long)]
  city:    Option<String>,
  #[arg(long)]
  country: Option<String>,
  #[arg(long)]
  isp:     Option<String>,
  #[arg(long)]
  asn:     Option<String>,
}

impl NetworkArgs {
  fn apply(self, base: NetworkSnapshot) -> NetworkSnapshot {
    NetworkSnapshot {
      ip:      self.ip.unwrap_or(base.ip),
      city:    self.city.unwrap_or(base.city),
      country: self.country.unwrap_or(base.country),
      isp:     self.isp.unwrap_or(base.isp),
      asn:     self.asn.unwrap_or(base.asn),
    }
  }
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  timeout_secs: Option<u64>,
  lookup_url:   Option<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let file_cfg: ConfigFile = if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: cli
      .url
      .or_else(|| Some(file_cfg.url).filter(|u| !u.is_empty()))
      .unwrap_or_else(|| DEFAULT_URL.to_owned()),
    timeout:  Duration::from_secs(file_cfg.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
  };
  let lookup_url = file_cfg
    .lookup_url
    .unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_owned());

  match cli.command {
    Command::Fingerprint(args) => {
      let p = probe(&args);
      println!("model       {}", p.classification.model);
      println!("rule        {}", p.classification.rule.unwrap_or("fallback"));
      println!("gpu         {}", p.descriptor.gpu);
      println!("screen      {}", p.descriptor.screen_resolution);
      println!("platform    {}", p.descriptor.platform);
      println!("cores       {}", p.descriptor.cores);
      println!("locale      {}", p.descriptor.locale);
      println!("signature   {}", signature(&p.descriptor));
      println!("fingerprint {}", compute_fingerprint(&p.descriptor));
    }
    Command::Sync { probe: args, network } => {
      let p = probe(&args);
      let base = if network.no_lookup {
        NetworkSnapshot::default()
      } else {
        NetworkLookup::new(lookup_url, api_config.timeout)?.lookup().await
      };
      let request = TelemetryRequest {
        fingerprint: compute_fingerprint(&p.descriptor).to_string(),
        network:     network.apply(base),
        hardware:    HardwareSnapshot::from(&p.descriptor),
      };

      let mut session = SyncSession::new(ApiClient::new(api_config)?);
      session.sync(&request).await;
      println!("fingerprint {}", request.fingerprint);
      println!("ip          {} ({})", request.network.ip, request.network.city);
      println!("status      {}", session.status());
      match session.visit_count() {
        Some(n) if n > 1 => println!("visits      {n} (recurring subject)"),
        Some(n) => println!("visits      {n}"),
        None => println!("visits      ---"),
      }
    }
    Command::Show { fingerprint } => {
      let client = ApiClient::new(api_config)?;
      match client.get_subject(&fingerprint).await? {
        Some(subject) => {
          println!("fingerprint {}", subject.fingerprint);
          println!("id          {}", subject.id);
          println!("visits      {}", subject.visit_count);
          println!("returning   {}", if subject.is_returning() { "yes" } else { "no" });
          println!("first seen  {}", subject.first_seen.to_rfc3339());
          println!("last seen   {}", subject.last_seen.to_rfc3339());
          println!("network     {}", serde_json::to_string(&subject.network)?);
          println!("hardware    {}", serde_json::to_string(&subject.hardware)?);
        }
        None => anyhow::bail!("no record for {fingerprint}"),
      }
    }
  }

  Ok(())
}
