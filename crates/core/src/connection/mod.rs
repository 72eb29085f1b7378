//! Backend connection bootstrap.

mod connection_manager;
mod connection_model;
mod connection_traits;
mod mock_connector;


pub use connection_manager::ConnectionManager;
pub use connection_model::{ConnectionSettings, ConnectionState, Environment, Identity, RootKey};
pub use connection_traits::BackendConnector;
pub use mock_connector::MockConnector;
