//! Accounts module - session-scoped backend operations.

mod accounts_model;
mod accounts_service;
mod accounts_traits;

#[cfg(test)]
mod accounts_service_tests;

// Re-export the public interface
pub use accounts_model::{PostDraft, MAX_POST_LENGTH};
pub use accounts_service::AccountService;
pub use accounts_traits::AccountServiceTrait;
