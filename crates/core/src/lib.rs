//! OwnSphere Core - client session & data-synchronization engine.
//!
//! This crate owns the connection to the backend canister, the session
//! lifecycle, and the market feed. It is transport-agnostic: the HTTP
//! implementations of [`backend::BackendApi`] and
//! [`connection::BackendConnector`] live in the `ownsphere-connect` crate.

pub mod accounts;
pub mod backend;
pub mod connection;
pub mod constants;
pub mod errors;
pub mod market_data;
pub mod session;
pub mod settings;
pub mod storage;

// Re-export the main entry points
pub use accounts::{AccountService, AccountServiceTrait};
pub use connection::{ConnectionManager, ConnectionSettings, ConnectionState, Environment};
pub use market_data::{MarketDataService, MarketFeed};
pub use session::{SessionState, SessionStore};
pub use settings::{PreferencesService, PreferencesServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
