//! Runtime configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `EXPENSE_TRACKER_DATA_DIR` | platform data dir + `Expense Tracker` |
//! | `EXPENSE_TRACKER_REMOTE_URL` | unset (local storage only) |
//! | `EXPENSE_TRACKER_BIND_ADDR` | `127.0.0.1:3000` |
//! | `EXPENSE_TRACKER_STATIC_DIR` | unset (API only) |
//! | `EXPENSE_TRACKER_CORS_ORIGIN` | `http://localhost:8080` |

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

pub const DATA_DIR_VAR: &str = "EXPENSE_TRACKER_DATA_DIR";
pub const REMOTE_URL_VAR: &str = "EXPENSE_TRACKER_REMOTE_URL";
pub const BIND_ADDR_VAR: &str = "EXPENSE_TRACKER_BIND_ADDR";
pub const STATIC_DIR_VAR: &str = "EXPENSE_TRACKER_STATIC_DIR";
pub const CORS_ORIGIN_VAR: &str = "EXPENSE_TRACKER_CORS_ORIGIN";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const APP_DIR_NAME: &str = "Expense Tracker";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Connection URL of the remote store; `None` when unset or a placeholder
    pub remote_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = match value(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir(),
        };

        let remote_url = value(REMOTE_URL_VAR).filter(|url| {
            let usable = is_usable_remote_url(url);
            if !usable {
                warn!("Ignoring placeholder remote URL, remote storage disabled");
            }
            usable
        });

        let bind_addr = value(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .with_context(|| format!("{} is not a valid socket address", BIND_ADDR_VAR))?;

        Ok(Self {
            data_dir,
            remote_url,
            bind_addr,
            static_dir: value(STATIC_DIR_VAR).map(PathBuf::from),
            cors_origin: value(CORS_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        })
    }

    /// Configuration rooted in `data_dir` with every other setting at its default
    pub fn for_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            remote_url: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            static_dir: None,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// A remote URL counts only when it is not a template placeholder
pub fn is_usable_remote_url(url: &str) -> bool {
    !url.trim().is_empty() && !url.to_lowercase().contains("placeholder")
}
