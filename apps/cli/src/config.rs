//! Host configuration read from `OWNSPHERE_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use ownsphere_core::constants::{
    DEFAULT_BACKEND_HOST, DEFAULT_CANISTER_ID, DEFAULT_REQUEST_TIMEOUT,
};
use ownsphere_core::{ConnectionSettings, Environment};
use ownsphere_market_data::provider::coingecko::DEFAULT_BASE_URL;

const DEFAULT_DATA_DIR: &str = ".ownsphere";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub canister_id: String,
    pub environment: Environment,
    /// Directory holding the client store file.
    pub data_dir: PathBuf,
    pub market_url: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("OWNSPHERE_ENV") {
            Some(value) => value
                .parse::<Environment>()
                .with_context(|| format!("OWNSPHERE_ENV={}", value))?,
            None => Environment::default(),
        };

        let request_timeout = match var("OWNSPHERE_REQUEST_TIMEOUT_MS") {
            Some(value) => {
                let ms: u64 = value
                    .trim()
                    .parse()
                    .with_context(|| format!("OWNSPHERE_REQUEST_TIMEOUT_MS={}", value))?;
                anyhow::ensure!(ms > 0, "OWNSPHERE_REQUEST_TIMEOUT_MS must be positive");
                Duration::from_millis(ms)
            }
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            host: var("OWNSPHERE_HOST").unwrap_or_else(|| DEFAULT_BACKEND_HOST.to_string()),
            canister_id: var("OWNSPHERE_CANISTER_ID")
                .unwrap_or_else(|| DEFAULT_CANISTER_ID.to_string()),
            environment,
            data_dir: var("OWNSPHERE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            market_url: var("OWNSPHERE_MARKET_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
        })
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            canister_id: self.canister_id.clone(),
            environment: self.environment,
            request_timeout: self.request_timeout,
        }
    }
}
