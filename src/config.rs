//! Environment-driven configuration
//!
//! | Variable         | Default |
//! |------------------|---------|
//! | `DATA_DIR`       | `data`  |
//! | `READ_MODEL_DIR` | unset   |
//! | `PORT`           | `3000`  |
//! | `CACHE_TTL_SECS` | `300`   |
//! | `CACHE_CAPACITY` | `10000` |
//!
//! A variable that is set but malformed is an error, never a silent default.
//! Scoring weights are engine constants and have no variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Load derived tables from here instead of recomputing them
    pub read_model_dir: Option<PathBuf>,
    pub port: u16,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            read_model_dir: None,
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: '{}'", name, raw)),
        None => Ok(default),
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let read_model_dir = lookup("READ_MODEL_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Ok(EngineConfig {
            data_dir,
            read_model_dir,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            cache_ttl: Duration::from_secs(parse_var(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?),
            cache_capacity: parse_var(&lookup, "CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
        })
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  DATA_DIR: {:?}", self.data_dir);
        tracing::info!("  READ_MODEL_DIR: {:?}", self.read_model_dir);
        tracing::info!("  PORT: {}", self.port);
        tracing::info!("  CACHE_TTL_SECS: {}", self.cache_ttl.as_secs());
        tracing::info!("  CACHE_CAPACITY: {}", self.cache_capacity);
    }
}
