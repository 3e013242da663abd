//! Configuration loading and representation.
//!
//! Everything comes from `SOLESTOCK_*` environment variables with defaults
//! that work for a local run against the bundled sample data.

use std::path::PathBuf;

use chrono::Duration;
use thiserror::Error;

use solestock_inventory::ViewMode;
use solestock_observability::{LogFormat, LogSettings};

pub const ENV_LOG: &str = "SOLESTOCK_LOG";
pub const ENV_LOG_FORMAT: &str = "SOLESTOCK_LOG_FORMAT";
pub const ENV_LIST_STALE_SECS: &str = "SOLESTOCK_LIST_STALE_SECS";
pub const ENV_MARKET_STALE_SECS: &str = "SOLESTOCK_MARKET_STALE_SECS";
pub const ENV_INVENTORY_PATH: &str = "SOLESTOCK_INVENTORY_PATH";
pub const ENV_LISTINGS_PATH: &str = "SOLESTOCK_LISTINGS_PATH";
pub const ENV_QUERY: &str = "SOLESTOCK_QUERY";
pub const ENV_VIEW: &str = "SOLESTOCK_VIEW";

const DEFAULT_LIST_STALE_SECS: u32 = 5 * 60;
const DEFAULT_MARKET_STALE_SECS: u32 = 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

/// How long cached query results stay fresh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Inventory/listing lists and item details.
    pub list_stale_after: Duration,
    /// Marketplace prices move faster than stock.
    pub market_stale_after: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            list_stale_after: Duration::seconds(i64::from(DEFAULT_LIST_STALE_SECS)),
            market_stale_after: Duration::seconds(i64::from(DEFAULT_MARKET_STALE_SECS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardConfig {
    pub log: LogSettings,
    pub cache: CacheSettings,
    /// JSON array of inventory records; bundled sample data when unset.
    pub inventory_path: Option<PathBuf>,
    /// JSON array of listing records; bundled sample data when unset.
    pub listings_path: Option<PathBuf>,
    /// Initial search text.
    pub query: String,
    pub view_mode: ViewMode,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let format = match non_empty(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::InvalidValue {
                var: ENV_LOG_FORMAT,
                message: e.to_string(),
            })?,
            None => defaults.log.format,
        };

        let log = LogSettings {
            filter: non_empty(ENV_LOG).unwrap_or(defaults.log.filter),
            format,
        };

        let cache = CacheSettings {
            list_stale_after: seconds(ENV_LIST_STALE_SECS, non_empty(ENV_LIST_STALE_SECS))?
                .unwrap_or(defaults.cache.list_stale_after),
            market_stale_after: seconds(ENV_MARKET_STALE_SECS, non_empty(ENV_MARKET_STALE_SECS))?
                .unwrap_or(defaults.cache.market_stale_after),
        };

        let view_mode = match non_empty(ENV_VIEW) {
            Some(raw) => raw.parse::<ViewMode>().map_err(|e| ConfigError::InvalidValue {
                var: ENV_VIEW,
                message: e.to_string(),
            })?,
            None => defaults.view_mode,
        };

        Ok(Self {
            log,
            cache,
            inventory_path: non_empty(ENV_INVENTORY_PATH).map(PathBuf::from),
            listings_path: non_empty(ENV_LISTINGS_PATH).map(PathBuf::from),
            // The query is used as typed, so no trimming or empty-check here.
            query: lookup(ENV_QUERY).unwrap_or_default(),
            view_mode,
        })
    }
}

fn seconds(var: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let secs: u32 = raw.trim().parse().map_err(|_| ConfigError::InvalidSeconds {
        var,
        value: raw.clone(),
    })?;
    Ok(Some(Duration::seconds(i64::from(secs))))
}
