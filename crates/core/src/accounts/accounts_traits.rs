//! Account service trait.

use async_trait::async_trait;

use crate::errors::Result;

/// Operations on the signed-in user's account.
///
/// Every call requires an authenticated session and a ready connection.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Fetch the balance and refresh it on the session.
    async fn token_balance(&self) -> Result<u64>;

    /// Buy `amount` tokens. Returns the refreshed balance.
    async fn buy_tokens(&self, amount: u64) -> Result<u64>;

    async fn investment_suggestion(&self) -> Result<String>;

    async fn create_post(&self, content: &str) -> Result<()>;
}
