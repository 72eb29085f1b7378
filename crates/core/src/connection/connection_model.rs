use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::BackendApi;
use crate::constants::{
    ANONYMOUS_PRINCIPAL, DEFAULT_BACKEND_HOST, DEFAULT_CANISTER_ID, DEFAULT_REQUEST_TIMEOUT,
};
use crate::errors::{ConnectionError, ValidationError};

/// Build environment of the client.
///
/// Non-production builds talk to a local replica whose root key is not
/// baked in and must be fetched before the first call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn requires_root_key(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "production" | "prod" | "ic" => Ok(Environment::Production),
            other => Err(ValidationError::InvalidConfig(format!(
                "unknown environment '{}'",
                other
            ))),
        }
    }
}

/// Where and how to reach the backend canister.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub canister_id: String,
    pub environment: Environment,
    pub request_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_BACKEND_HOST.to_string(),
            canister_id: DEFAULT_CANISTER_ID.to_string(),
            environment: Environment::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Caller identity attached to every backend call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
}

impl Identity {
    pub fn principal(&self) -> &'static str {
        match self {
            Identity::Anonymous => ANONYMOUS_PRINCIPAL,
        }
    }
}

/// Root key of a local replica, as raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RootKey(pub Vec<u8>);

impl RootKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Short hex prefix, safe to log.
    pub fn fingerprint(&self) -> String {
        let prefix = &self.0[..self.0.len().min(8)];
        hex::encode(prefix)
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootKey({}..., {} bytes)", self.fingerprint(), self.0.len())
    }
}

/// Observable state of the backend connection.
#[derive(Clone)]
pub enum ConnectionState {
    Connecting,
    Ready(Arc<dyn BackendApi>),
    Failed(ConnectionError),
}

impl ConnectionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready(_))
    }

    pub fn failure(&self) -> Option<&ConnectionError> {
        match self {
            ConnectionState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => f.write_str("Connecting"),
            ConnectionState::Ready(_) => f.write_str("Ready"),
            ConnectionState::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}
