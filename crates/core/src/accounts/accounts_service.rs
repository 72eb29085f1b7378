use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use super::accounts_model::PostDraft;
use super::accounts_traits::AccountServiceTrait;
use crate::backend::{with_timeout, BackendApi};
use crate::connection::ConnectionManager;
use crate::errors::{AuthError, Error, Result, ValidationError};
use crate::session::SessionStore;

/// Service for the investment and posts views.
pub struct AccountService {
    connection: Arc<ConnectionManager>,
    sessions: Arc<SessionStore>,
    request_timeout: Duration,
}

impl AccountService {
    pub fn new(connection: Arc<ConnectionManager>, sessions: Arc<SessionStore>) -> Self {
        let request_timeout = connection.settings().request_timeout;
        Self {
            connection,
            sessions,
            request_timeout,
        }
    }

    /// Current user id and backend handle, in that order of checks.
    fn context(&self) -> Result<(String, Arc<dyn BackendApi>)> {
        let session = self
            .sessions
            .current_session()
            .ok_or(AuthError::NotAuthenticated)?;
        let handle = self.connection.handle()?;
        Ok((session.id, handle))
    }

    async fn refresh_balance(&self, user_id: &str, handle: &dyn BackendApi) -> Result<u64> {
        let balance = with_timeout(
            self.request_timeout,
            "getTokenBalance",
            handle.get_token_balance(user_id),
        )
        .await?;
        // The user may have signed out while the call was pending.
        if self
            .sessions
            .current_session()
            .is_some_and(|s| s.id == user_id)
        {
            self.sessions.update_token_balance(balance)?;
        }
        Ok(balance)
    }
}

#[async_trait]
impl AccountServiceTrait for AccountService {
    async fn token_balance(&self) -> Result<u64> {
        let (user_id, handle) = self.context()?;
        self.refresh_balance(&user_id, handle.as_ref()).await
    }

    async fn buy_tokens(&self, amount: u64) -> Result<u64> {
        if amount == 0 {
            return Err(ValidationError::InvalidAmount.into());
        }
        let (user_id, handle) = self.context()?;

        debug!("[AccountService] buying {} tokens for '{}'", amount, user_id);
        let accepted = with_timeout(
            self.request_timeout,
            "buyTokens",
            handle.buy_tokens(&user_id, amount),
        )
        .await?;
        if !accepted {
            return Err(Error::Rejected("token purchase"));
        }

        let balance = self.refresh_balance(&user_id, handle.as_ref()).await?;
        info!(
            "[AccountService] '{}' bought {} tokens, balance {}",
            user_id, amount, balance
        );
        Ok(balance)
    }

    async fn investment_suggestion(&self) -> Result<String> {
        let (user_id, handle) = self.context()?;
        let suggestion = with_timeout(
            self.request_timeout,
            "getInvestmentSuggestion",
            handle.get_investment_suggestion(&user_id),
        )
        .await?;
        Ok(suggestion)
    }

    async fn create_post(&self, content: &str) -> Result<()> {
        let draft = PostDraft::parse(content)?;
        let (user_id, handle) = self.context()?;

        let accepted = with_timeout(
            self.request_timeout,
            "createPost",
            handle.create_post(&user_id, draft.as_str()),
        )
        .await?;
        if !accepted {
            return Err(Error::Rejected("post"));
        }
        debug!("[AccountService] '{}' published a post", user_id);
        Ok(())
    }
}
