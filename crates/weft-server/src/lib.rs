//! Process wiring for the Weft server: configuration and the top-level
//! router.

use std::path::{Path, PathBuf};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use weft_api::{AppState, AuthConfig};
use weft_store_sqlite::SqliteStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WEFT_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// HMAC secret for bearer tokens. Required.
  pub jwt_secret:      String,
  #[serde(default = "default_leeway")]
  pub jwt_leeway_secs: u64,
  #[serde(default)]
  pub jwt_issuer:      Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8420 }

fn default_store_path() -> PathBuf { PathBuf::from("weft.db") }

fn default_leeway() -> u64 { 30 }

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      jwt_secret:  self.jwt_secret.clone(),
      leeway_secs: self.jwt_leeway_secs,
      issuer:      self.jwt_issuer.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the API under `/api`, with request tracing.
pub fn app(state: AppState<SqliteStore>) -> Router {
  Router::new()
    .nest("/api", weft_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
