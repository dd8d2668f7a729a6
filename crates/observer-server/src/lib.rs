//! Server assembly for the observer backend: configuration and the top-level
//! router with its HTTP layers.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use observer_core::ledger::VisitLedger;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Bare environment variables honoured for platform compatibility, below the
/// `OBSERVER_`-prefixed ones in precedence.
const BARE_ENV_KEYS: &[&str] = &["PORT", "DATABASE_URL"];

pub const ENV_PREFIX: &str = "OBSERVER";

/// The special `database_url` that selects an in-memory ledger.
pub const IN_MEMORY: &str = ":memory:";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  /// Path to the SQLite file, or [`IN_MEMORY`].
  pub database_url: String,
}

impl ServerConfig {
  /// Layer built-in defaults, the optional TOML file at `file`, the bare
  /// `PORT`/`DATABASE_URL` variables, and `OBSERVER_*` variables, in that
  /// order of increasing precedence. `env` is passed in rather than read so
  /// callers control the environment.
  pub fn load(file: &Path, env: &HashMap<String, String>) -> Result<Self, config::ConfigError> {
    let bare: config::Map<String, String> = env
      .iter()
      .filter(|(k, _)| BARE_ENV_KEYS.contains(&k.as_str()))
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect();
    let prefixed: config::Map<String, String> =
      env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();

    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000)?
      .set_default("database_url", "observer.db")?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::default().source(Some(bare)).try_parsing(true))
      .add_source(
        config::Environment::with_prefix(ENV_PREFIX)
          .source(Some(prefixed))
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The database path with a leading `~` expanded, or `None` for an
  /// in-memory ledger.
  pub fn database_path(&self) -> Option<PathBuf> {
    (self.database_url != IN_MEMORY).then(|| expand_tilde(Path::new(&self.database_url)))
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, with request tracing and a
/// permissive CORS policy so browser front-ends on any origin can sync.
pub fn app<L>(ledger: Arc<L>) -> Router
where
  L: VisitLedger + 'static,
{
  Router::new()
    .nest("/api", observer_api::api_router(ledger))
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
}
