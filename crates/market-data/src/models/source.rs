use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Default auto-refresh interval: one minute.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;

/// Where quotes come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSource {
    /// Public HTTP market endpoint, best effort.
    Remote,
    /// Local fallback dataset with fresh timestamps. Never fails.
    #[default]
    Simulated,
}

impl MarketSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketSource::Remote => "remote",
            MarketSource::Simulated => "simulated",
        }
    }
}

impl fmt::Display for MarketSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketSource {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(MarketSource::Remote),
            "simulated" | "simulation" | "local" => Ok(MarketSource::Simulated),
            other => Err(MarketDataError::UnknownSource(other.to_string())),
        }
    }
}

/// Persisted auto-refresh preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PollConfiguration {
    /// Source used by `fetch_once` on every tick
    pub source: MarketSource,
    /// Time between ticks in milliseconds
    pub interval_ms: u64,
    /// Whether the timer should run
    pub enabled: bool,
}

impl Default for PollConfiguration {
    fn default() -> Self {
        Self {
            source: MarketSource::default(),
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            enabled: false,
        }
    }
}

impl PollConfiguration {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parsing() {
        assert_eq!("remote".parse::<MarketSource>().unwrap(), MarketSource::Remote);
        assert_eq!(
            " Simulated ".parse::<MarketSource>().unwrap(),
            MarketSource::Simulated
        );
        assert!(matches!(
            "carrier-pigeon".parse::<MarketSource>(),
            Err(MarketDataError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_poll_configuration_defaults_for_missing_fields() {
        let config: PollConfiguration = serde_json::from_str(r#"{"source":"remote"}"#).unwrap();
        assert_eq!(config.source, MarketSource::Remote);
        assert_eq!(config.interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert!(!config.enabled);
    }

    #[test]
    fn test_poll_configuration_wire_format() {
        let config = PollConfiguration {
            source: MarketSource::Remote,
            interval_ms: 5_000,
            enabled: true,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"source": "remote", "intervalMs": 5000, "enabled": true})
        );
    }
}
