use async_trait::async_trait;

use super::{LoginRequest, RegisterUserRequest, RegistrationOutcome};
use crate::errors::BackendError;
use crate::session::Session;

/// Narrow contract of the backend canister.
///
/// Every call is a stateless request/response. Implementations are shared
/// read-only behind an `Arc` handed out by the connection manager.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn register_user(
        &self,
        request: &RegisterUserRequest,
    ) -> Result<RegistrationOutcome, BackendError>;

    /// Returns `None` when the email/hash pair is not recognized.
    async fn login_user(&self, request: &LoginRequest) -> Result<Option<Session>, BackendError>;

    /// Returns `None` when no user has this id.
    async fn get_user(&self, user_id: &str) -> Result<Option<Session>, BackendError>;

    async fn get_token_balance(&self, user_id: &str) -> Result<u64, BackendError>;

    async fn get_investment_suggestion(&self, user_id: &str) -> Result<String, BackendError>;

    async fn buy_tokens(&self, user_id: &str, amount: u64) -> Result<bool, BackendError>;

    async fn create_post(&self, user_id: &str, content: &str) -> Result<bool, BackendError>;
}
