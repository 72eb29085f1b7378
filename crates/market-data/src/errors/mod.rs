//! Error types for the market data crate.
//!
//! Every variant describes a way a quote source can fail to deliver the
//! basket. Callers in the core crate never surface these as fatal: a failed
//! fetch is recovered with the fallback dataset and shown as a banner.

use thiserror::Error;

/// Errors that can occur while fetching quotes from a source.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The source answered with a non-success HTTP status.
    #[error("Source unavailable: {provider} - HTTP {status}")]
    HttpStatus {
        /// The provider that returned the status
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// The request to the source timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("Transport error: {provider} - {message}")]
    Transport {
        /// The provider that could not be reached
        provider: String,
        /// The underlying transport message
        message: String,
    },

    /// The source answered, but the payload could not be understood.
    #[error("Invalid payload from {provider}: {message}")]
    InvalidPayload {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The source answered with none of the requested assets.
    #[error("Empty basket returned by {provider}")]
    EmptyBasket {
        /// The provider that returned no quotes
        provider: String,
    },

    /// The source identifier is not one of the known sources.
    #[error("Unknown market source: {0}")]
    UnknownSource(String),
}

impl MarketDataError {
    /// Classifies a reqwest error for the given provider.
    pub fn from_transport(provider: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout {
                provider: provider.to_string(),
            };
        }
        if error.is_decode() {
            return Self::InvalidPayload {
                provider: provider.to_string(),
                message: error.to_string(),
            };
        }
        Self::Transport {
            provider: provider.to_string(),
            message: error.to_string(),
        }
    }

    /// The provider this error originated from, when known.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { provider, .. }
            | Self::Timeout { provider }
            | Self::Transport { provider, .. }
            | Self::InvalidPayload { provider, .. }
            | Self::EmptyBasket { provider } => Some(provider),
            Self::UnknownSource(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::HttpStatus {
            provider: "COINGECKO".to_string(),
            status: 503,
        };
        assert_eq!(
            format!("{}", error),
            "Source unavailable: COINGECKO - HTTP 503"
        );

        let error = MarketDataError::EmptyBasket {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(format!("{}", error), "Empty basket returned by COINGECKO");
    }

    #[test]
    fn test_provider_is_reported() {
        let error = MarketDataError::Timeout {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(error.provider(), Some("COINGECKO"));

        let error = MarketDataError::UnknownSource("ftp".to_string());
        assert_eq!(error.provider(), None);
    }
}
