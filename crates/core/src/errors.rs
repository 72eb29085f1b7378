//! Core error types for the OwnSphere client engine.
//!
//! Transport-level failures are converted into these types at the call site.
//! Views only ever see [`Error`] and classify it with [`Error::kind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ownsphere_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the client engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Backend connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Backend call failed: {0}")]
    Backend(#[from] BackendError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Market data source unavailable: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Another {0} operation is already in progress")]
    Busy(&'static str),

    #[error("The backend declined the {0}")]
    Rejected(&'static str),

    #[error("Client storage error: {0}")]
    Storage(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Coarse classification used by the view layer to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Full-screen retry prompt.
    ConnectionFailure,
    /// Inline field error; no network call was made.
    Validation,
    /// Inline error, recoverable by re-entry. Also covers declined purchases and posts.
    AuthFailure,
    /// Non-blocking banner; the fallback dataset is shown.
    SourceUnavailable,
    /// The user triggered a second operation while one is pending.
    Busy,
    /// Anything else.
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) | Error::Backend(_) => ErrorKind::ConnectionFailure,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Auth(_) | Error::Rejected(_) => ErrorKind::AuthFailure,
            Error::MarketData(_) => ErrorKind::SourceUnavailable,
            Error::Busy(_) => ErrorKind::Busy,
            Error::Storage(_) | Error::Unexpected(_) => ErrorKind::Internal,
        }
    }
}

/// Why the backend handle is not available.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The root-trust handshake against the local replica failed.
    #[error("Could not fetch the root key from the local replica: {0}")]
    TrustHandshake(String),

    /// The handle itself could not be built.
    #[error("Could not create the backend handle: {0}")]
    HandleConstruction(String),

    /// `initialize()` has not completed yet.
    #[error("Backend connection is still being established")]
    NotReady,

    /// The manager was shut down.
    #[error("Backend connection was closed")]
    Closed,
}

/// Failures of an individual backend call on a ready handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("Request to '{method}' failed: {message}")]
    Transport { method: String, message: String },

    /// The gateway answered with an error status.
    #[error("'{method}' was rejected ({status}): {message}")]
    Rejected {
        method: String,
        status: u16,
        message: String,
    },

    /// The response could not be decoded.
    #[error("Could not decode the '{method}' response: {message}")]
    Decode { method: String, message: String },

    /// The call did not complete within the request timeout.
    #[error("'{method}' timed out")]
    Timeout { method: String },
}

impl BackendError {
    pub fn transport(method: &str, message: impl Into<String>) -> Self {
        Self::Transport {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn rejected(method: &str, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            method: method.to_string(),
            status,
            message: message.into(),
        }
    }

    pub fn decode(method: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn timeout(method: &str) -> Self {
        Self::Timeout {
            method: method.to_string(),
        }
    }
}

/// Local input validation failures. These never reach the network layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("User ID must be at least 3 characters")]
    IdTooShort,

    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Password must be at least 8 characters")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Post content cannot be empty")]
    EmptyPost,

    #[error("Post cannot be longer than {0} characters")]
    PostTooLong(usize),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),
}

/// Authentication failures reported by the backend or the session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend refused the registration without saying which field clashed.
    #[error("An account with this email or user ID already exists")]
    DuplicateIdentity,

    #[error("An account with this email already exists")]
    DuplicateEmail,

    #[error("This user ID is already taken")]
    DuplicateId,

    #[error("Email or password is incorrect")]
    InvalidCredentials,

    #[error("No user is signed in")]
    NotAuthenticated,

    #[error("Logout was not requested")]
    LogoutNotRequested,

    #[error("Logout request no longer matches the current session")]
    StaleLogoutRequest,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(format!("I/O error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::from(ConnectionError::TrustHandshake("refused".into())).kind(),
            ErrorKind::ConnectionFailure
        );
        assert_eq!(
            Error::from(BackendError::timeout("getUser")).kind(),
            ErrorKind::ConnectionFailure
        );
        assert_eq!(
            Error::from(ValidationError::WeakPassword).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::from(AuthError::DuplicateIdentity).kind(),
            ErrorKind::AuthFailure
        );
        assert_eq!(
            Error::from(MarketDataError::EmptyBasket {
                provider: "COINGECKO".into()
            })
            .kind(),
            ErrorKind::SourceUnavailable
        );
        assert_eq!(Error::Busy("login").kind(), ErrorKind::Busy);
        assert_eq!(Error::Rejected("purchase").kind(), ErrorKind::AuthFailure);
        assert_eq!(Error::Storage("disk".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_error_display() {
        let error = Error::from(ValidationError::MissingField("Email"));
        assert_eq!(
            format!("{}", error),
            "Input validation failed: Email is required"
        );

        let error = BackendError::rejected("buyTokens", 500, "ledger offline");
        assert_eq!(
            format!("{}", error),
            "'buyTokens' was rejected (500): ledger offline"
        );
    }
}
