//! Daemon configuration, read from `WAITLINE_*` environment variables

use std::time::Duration;
use waitline_core::application::queue::DEFAULT_BASE_URL;
use waitline_core::error::{AppError, Result};

const DEFAULT_DB_PATH: &str = "~/.waitline/waitline.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 8080;
const DEFAULT_DB_TIMEOUT_MS: u64 = 10_000;

/// Where store and consumer records live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub storage: StorageBackend,
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub base_url: String,
    pub db_timeout: Duration,
    pub log_format: String,
    pub log_dir: Option<String>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("WAITLINE_STORAGE").as_deref() {
            None | Some("sqlite") => StorageBackend::Sqlite,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "WAITLINE_STORAGE must be sqlite or memory, got {}",
                    other
                )))
            }
        };

        let db_path = lookup("WAITLINE_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db_path = shellexpand::tilde(&db_path).into_owned();

        let rpc_port = match lookup("WAITLINE_RPC_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!("WAITLINE_RPC_PORT is not a port: {}", raw))
            })?,
            None => DEFAULT_RPC_PORT,
        };

        let timeout_ms = match lookup("WAITLINE_DB_TIMEOUT_MS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!("WAITLINE_DB_TIMEOUT_MS is not a number: {}", raw))
            })?,
            None => DEFAULT_DB_TIMEOUT_MS,
        };

        let base_url = lookup("WAITLINE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if base_url.is_empty() {
            return Err(AppError::Config("WAITLINE_BASE_URL is empty".to_string()));
        }

        Ok(Self {
            storage,
            db_path,
            rpc_host: lookup("WAITLINE_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            rpc_port,
            base_url,
            db_timeout: Duration::from_millis(timeout_ms),
            log_format: lookup("WAITLINE_LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            log_dir: lookup("WAITLINE_LOG_DIR").map(|d| shellexpand::tilde(&d).into_owned()),
        })
    }

    /// sqlx connection string for `db_path`
    pub fn database_url(&self) -> String {
        if self.db_path.starts_with("sqlite:") {
            self.db_path.clone()
        } else {
            format!("sqlite://{}", self.db_path)
        }
    }
}
