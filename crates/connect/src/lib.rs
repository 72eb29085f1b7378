//! OwnSphere Connect - HTTP transport for the OwnSphere backend.
//!
//! This crate implements the core crate's backend seams over the canister
//! gateway: [`BackendApiClient`] for the canister methods and
//! [`HttpBackendConnector`] for the root-key handshake and handle construction.

pub mod client;
pub mod connector;

// Re-export commonly used types
pub use client::{BackendApiClient, EMAIL_TAKEN, ID_TAKEN, PRINCIPAL_HEADER};
pub use connector::HttpBackendConnector;
