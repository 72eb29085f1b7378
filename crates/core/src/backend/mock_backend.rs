//! In-memory backend for tests and offline demos.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{BackendApi, LoginRequest, RegisterUserRequest, RegistrationOutcome};
use crate::errors::BackendError;
use crate::session::{PasswordHash, Session};

/// A call received by [`MockBackend`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    RegisterUser(RegisterUserRequest),
    LoginUser(LoginRequest),
    GetUser(String),
    GetTokenBalance(String),
    GetInvestmentSuggestion(String),
    BuyTokens { user_id: String, amount: u64 },
    CreatePost { user_id: String, content: String },
}

#[derive(Default)]
struct MockBackendState {
    users: HashMap<String, (Session, PasswordHash)>,
    posts: Vec<(String, String)>,
    calls: Vec<BackendCall>,
    forced_outcome: Option<RegistrationOutcome>,
    failure: Option<BackendError>,
    latency: Option<Duration>,
    reject_purchases: bool,
    suggestion: Option<String>,
}

/// Backend double that keeps users in memory and records every call.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockBackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockBackendState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a registered user with the given raw password.
    pub fn with_user(self, session: Session, raw_password: &str) -> Self {
        let hash = PasswordHash::from_raw(raw_password.to_string());
        self.lock()
            .users
            .insert(session.id.clone(), (session, hash));
        self
    }

    /// Forget a user, as if the account had been deleted server side.
    pub fn remove_user(&self, user_id: &str) {
        self.lock().users.remove(user_id);
    }

    /// Answer every `registerUser` with this outcome.
    pub fn set_registration_outcome(&self, outcome: RegistrationOutcome) {
        self.lock().forced_outcome = Some(outcome);
    }

    /// Fail every call with this error until cleared.
    pub fn fail_with(&self, error: BackendError) {
        self.lock().failure = Some(error);
    }

    pub fn clear_failure(&self) {
        self.lock().failure = None;
    }

    /// Delay every answer, to keep calls in flight.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    pub fn set_reject_purchases(&self, reject: bool) {
        self.lock().reject_purchases = reject;
    }

    pub fn set_suggestion(&self, suggestion: &str) {
        self.lock().suggestion = Some(suggestion.to_string());
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn user(&self, user_id: &str) -> Option<Session> {
        self.lock().users.get(user_id).map(|(s, _)| s.clone())
    }

    pub fn posts(&self) -> Vec<(String, String)> {
        self.lock().posts.clone()
    }

    /// Records the call and returns the configured latency and failure.
    fn begin(&self, call: BackendCall) -> (Option<Duration>, Option<BackendError>) {
        let mut state = self.lock();
        state.calls.push(call);
        (state.latency, state.failure.clone())
    }

    async fn enter(&self, call: BackendCall) -> Result<(), BackendError> {
        let (latency, failure) = self.begin(call);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn register_user(
        &self,
        request: &RegisterUserRequest,
    ) -> Result<RegistrationOutcome, BackendError> {
        self.enter(BackendCall::RegisterUser(request.clone())).await?;

        let mut state = self.lock();
        if let Some(outcome) = state.forced_outcome {
            return Ok(outcome);
        }
        let taken = state.users.contains_key(&request.id)
            || state.users.values().any(|(s, _)| s.email == request.email);
        if taken {
            return Ok(RegistrationOutcome::Rejected);
        }

        let now = Utc::now();
        let session = Session {
            id: request.id.clone(),
            name: request.name.clone(),
            email: request.email.clone(),
            token_balance: 0,
            created_at: now,
            last_login: Some(now),
        };
        state.users.insert(
            request.id.clone(),
            (session, request.password_hash.clone()),
        );
        Ok(RegistrationOutcome::Created)
    }

    async fn login_user(&self, request: &LoginRequest) -> Result<Option<Session>, BackendError> {
        self.enter(BackendCall::LoginUser(request.clone())).await?;

        let mut state = self.lock();
        let found = state
            .users
            .values_mut()
            .find(|(s, hash)| s.email == request.email && *hash == request.password_hash);
        Ok(found.map(|(session, _)| {
            session.last_login = Some(Utc::now());
            session.clone()
        }))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<Session>, BackendError> {
        self.enter(BackendCall::GetUser(user_id.to_string())).await?;
        Ok(self.user(user_id))
    }

    async fn get_token_balance(&self, user_id: &str) -> Result<u64, BackendError> {
        self.enter(BackendCall::GetTokenBalance(user_id.to_string()))
            .await?;
        self.user(user_id)
            .map(|s| s.token_balance)
            .ok_or_else(|| BackendError::rejected("getTokenBalance", 404, "unknown user"))
    }

    async fn get_investment_suggestion(&self, user_id: &str) -> Result<String, BackendError> {
        self.enter(BackendCall::GetInvestmentSuggestion(user_id.to_string()))
            .await?;
        Ok(self.lock().suggestion.clone().unwrap_or_else(|| {
            "Diversify: 30% OwnSphere Token, 40% Bitcoin, 30% Ethereum".to_string()
        }))
    }

    async fn buy_tokens(&self, user_id: &str, amount: u64) -> Result<bool, BackendError> {
        self.enter(BackendCall::BuyTokens {
            user_id: user_id.to_string(),
            amount,
        })
        .await?;

        let mut state = self.lock();
        if state.reject_purchases {
            return Ok(false);
        }
        match state.users.get_mut(user_id) {
            Some((session, _)) => {
                session.token_balance += amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_post(&self, user_id: &str, content: &str) -> Result<bool, BackendError> {
        self.enter(BackendCall::CreatePost {
            user_id: user_id.to_string(),
            content: content.to_string(),
        })
        .await?;

        let mut state = self.lock();
        if !state.users.contains_key(user_id) {
            return Ok(false);
        }
        state.posts.push((user_id.to_string(), content.to_string()));
        Ok(true)
    }
}
