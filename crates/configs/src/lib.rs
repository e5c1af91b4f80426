//! rustbb/crates/configs/src/lib.rs
//!
//! Layered application settings: compiled-in defaults, then an optional
//! `rustbb.toml`, then `RUSTBB_*` environment variables (highest priority).

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub board: BoardDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; kept secret so it never lands in logs.
    pub url: SecretString,
    pub max_connections: u32,
}

/// Global board behaviour the engines read when a board leaves a field at 0.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardDefaults {
    /// Width W of one search partition window over the sequence space.
    pub search_window: i64,
    /// Posts per listing page.
    pub page_rows: i64,
    /// Entries per recency ("latest") page.
    pub recency_rows: i64,
    /// Display-name truncation length, 0 = show full names.
    pub name_cut: usize,
    /// Base directory for member images/icons.
    pub member_media_dir: String,
}

impl AppConfig {
    /// Loads `.env`, then the layered sources. Missing `rustbb.toml` is fine;
    /// a malformed one is not.
    pub fn load() -> Result<Self, ConfigsError> {
        dotenvy::dotenv().ok();

        let settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite:rustbb.db")?
            .set_default("database.max_connections", 8)?
            .set_default("board.search_window", 10_000)?
            .set_default("board.page_rows", 15)?
            .set_default("board.recency_rows", 15)?
            .set_default("board.name_cut", 0)?
            .set_default("board.member_media_dir", "data/member")?
            .add_source(File::with_name("rustbb").required(false))
            .add_source(Environment::with_prefix("RUSTBB").separator("__"))
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        tracing::debug!(
            host = %cfg.server.host,
            port = cfg.server.port,
            "configuration loaded"
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let cfg = AppConfig::load().expect("defaults alone must produce a config");
        assert_eq!(cfg.board.search_window, 10_000);
        assert_eq!(cfg.board.page_rows, 15);
        assert_eq!(cfg.server.port, 8080);
    }
}
