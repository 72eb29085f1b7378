use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{watch, Mutex, MutexGuard as AsyncMutexGuard};

use super::{
    validate_login, validate_registration, Credential, LogoutTicket, PasswordHash,
    RegistrationForm, Session, SessionState,
};
use crate::backend::{
    with_timeout, BackendApi, LoginRequest, RegisterUserRequest, RegistrationOutcome,
};
use crate::connection::ConnectionManager;
use crate::constants::SESSION_USER_ID_KEY;
use crate::errors::{AuthError, Error, Result};
use crate::storage::ClientStore;

/// Owns the session of the signed-in user.
///
/// The store is the only writer of the persisted session identifier. At most
/// one of `register`, `login` and `resume` runs at a time; a second call made
/// while one is pending fails with [`Error::Busy`].
pub struct SessionStore {
    connection: Arc<ConnectionManager>,
    store: Arc<dyn ClientStore>,
    state: watch::Sender<SessionState>,
    in_flight: Mutex<()>,
    pending_logout: StdMutex<Option<LogoutTicket>>,
    // Bumped on every successful sign-in; tickets from earlier sign-ins are stale.
    sign_ins: AtomicU64,
    request_timeout: Duration,
}

impl SessionStore {
    pub fn new(connection: Arc<ConnectionManager>, store: Arc<dyn ClientStore>) -> Self {
        let request_timeout = connection.settings().request_timeout;
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            connection,
            store,
            state,
            in_flight: Mutex::new(()),
            pending_logout: StdMutex::new(None),
            sign_ins: AtomicU64::new(0),
            request_timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    /// Restore the session persisted by a previous run.
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored identifier no
    /// longer resolves; in the latter case the identifier is removed. When
    /// the connection is not ready nothing is called and the identifier is
    /// kept for a later attempt.
    pub async fn resume(&self) -> Result<Option<Session>> {
        let _guard = self.begin_operation("resume")?;

        if let Some(session) = self.current_session() {
            return Ok(Some(session));
        }
        let Some(user_id) = self.store.get_item(SESSION_USER_ID_KEY)? else {
            debug!("[SessionStore] no stored session");
            return Ok(None);
        };
        let handle = self.connection.handle()?;

        let attempt = Attempt::begin(&self.state);
        let lookup = with_timeout(
            self.request_timeout,
            "getUser",
            handle.get_user(&user_id),
        )
        .await;

        match lookup {
            Ok(Some(session)) => {
                info!("[SessionStore] resumed session for '{}'", session.id);
                attempt.settle(SessionState::Authenticated(session.clone()));
                Ok(Some(session))
            }
            Ok(None) => {
                warn!("[SessionStore] stored user '{}' no longer exists", user_id);
                self.discard_stored_id(attempt)?;
                Ok(None)
            }
            Err(e) => {
                warn!("[SessionStore] could not resume '{}': {}", user_id, e);
                self.discard_stored_id(attempt)?;
                Ok(None)
            }
        }
    }

    /// Create an account and sign it in.
    pub async fn register(&self, form: RegistrationForm) -> Result<Session> {
        let _guard = self.begin_operation("register")?;

        validate_registration(&form)?;
        let handle = self.connection.handle()?;

        let RegistrationForm {
            id,
            name,
            email,
            password,
            ..
        } = form;
        let request = RegisterUserRequest {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash: PasswordHash::from_raw(password),
        };

        let attempt = Attempt::begin(&self.state);
        let outcome = self.submit_registration(handle.as_ref(), request).await;
        self.complete(attempt, outcome)
    }

    /// Sign in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let _guard = self.begin_operation("login")?;

        validate_login(email, password)?;
        let handle = self.connection.handle()?;

        let (email, password_hash) = Credential::new(email.trim(), password).into_hashed();
        let request = LoginRequest {
            email,
            password_hash,
        };

        let attempt = Attempt::begin(&self.state);
        let outcome = with_timeout(
            self.request_timeout,
            "loginUser",
            handle.login_user(&request),
        )
        .await
        .map_err(Error::from)
        .and_then(|found| found.ok_or_else(|| AuthError::InvalidCredentials.into()));
        self.complete(attempt, outcome)
    }

    /// First step of logout. The ticket is only valid for the current session.
    pub fn request_logout(&self) -> Result<LogoutTicket> {
        let session = self
            .current_session()
            .ok_or(AuthError::NotAuthenticated)?;
        let ticket = LogoutTicket::issue(&session.id, self.sign_ins.load(Ordering::SeqCst));
        *self.pending_logout() = Some(ticket.clone());
        Ok(ticket)
    }

    /// Second step of logout: forget the session locally and in storage.
    pub fn confirm_logout(&self, ticket: &LogoutTicket) -> Result<()> {
        let mut pending = self.pending_logout();
        let Some(expected) = pending.as_ref() else {
            return Err(AuthError::LogoutNotRequested.into());
        };
        if expected != ticket {
            return Err(AuthError::StaleLogoutRequest.into());
        }
        let current_id = self.current_session().map(|s| s.id);
        if ticket.sign_in != self.sign_ins.load(Ordering::SeqCst)
            || current_id.as_deref() != Some(ticket.session_id.as_str())
        {
            *pending = None;
            return Err(AuthError::StaleLogoutRequest.into());
        }

        self.store.remove_item(SESSION_USER_ID_KEY)?;
        *pending = None;
        self.state.send_replace(SessionState::Anonymous);
        info!("[SessionStore] signed out '{}'", ticket.session_id);
        Ok(())
    }

    pub fn cancel_logout(&self) {
        self.pending_logout().take();
    }

    /// Replace the balance of the current session.
    pub fn update_token_balance(&self, balance: u64) -> Result<()> {
        let updated = self.state.send_if_modified(|state| match state {
            SessionState::Authenticated(session) => {
                let changed = session.token_balance != balance;
                session.token_balance = balance;
                changed
            }
            _ => false,
        });
        if !updated && !self.state.borrow().is_authenticated() {
            return Err(AuthError::NotAuthenticated.into());
        }
        Ok(())
    }

    fn begin_operation(&self, operation: &'static str) -> Result<AsyncMutexGuard<'_, ()>> {
        self.in_flight.try_lock().map_err(|_| {
            debug!("[SessionStore] rejected concurrent {}", operation);
            Error::Busy(operation)
        })
    }

    fn pending_logout(&self) -> MutexGuard<'_, Option<LogoutTicket>> {
        self.pending_logout
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn submit_registration(
        &self,
        handle: &dyn BackendApi,
        request: RegisterUserRequest,
    ) -> Result<Session> {
        let outcome = with_timeout(
            self.request_timeout,
            "registerUser",
            handle.register_user(&request),
        )
        .await?;

        match outcome {
            RegistrationOutcome::Created => {
                let now = Utc::now();
                Ok(Session {
                    id: request.id,
                    name: request.name,
                    email: request.email,
                    token_balance: 0,
                    created_at: now,
                    last_login: Some(now),
                })
            }
            RegistrationOutcome::Rejected => Err(AuthError::DuplicateIdentity.into()),
            RegistrationOutcome::EmailTaken => Err(AuthError::DuplicateEmail.into()),
            RegistrationOutcome::IdTaken => Err(AuthError::DuplicateId.into()),
        }
    }

    /// Leave `Authenticating`: persist and publish the session, or restore
    /// the state that preceded the attempt.
    fn complete(&self, attempt: Attempt<'_>, outcome: Result<Session>) -> Result<Session> {
        // Dropping `attempt` on the error paths restores the previous state.
        let session = outcome?;
        self.store.set_item(SESSION_USER_ID_KEY, &session.id)?;

        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        info!("[SessionStore] signed in as '{}'", session.id);
        attempt.settle(SessionState::Authenticated(session.clone()));
        Ok(session)
    }

    fn discard_stored_id(&self, attempt: Attempt<'_>) -> Result<()> {
        drop(attempt);
        self.store.remove_item(SESSION_USER_ID_KEY)
    }
}

/// Holds the store in `Authenticating` for one backend round trip.
///
/// Unless settled, dropping it puts back the state that preceded the
/// attempt, including when the caller abandons the future mid-call.
struct Attempt<'a> {
    state: &'a watch::Sender<SessionState>,
    previous: Option<SessionState>,
}

impl<'a> Attempt<'a> {
    fn begin(state: &'a watch::Sender<SessionState>) -> Self {
        let previous = state.send_replace(SessionState::Authenticating);
        Self {
            state,
            previous: Some(previous),
        }
    }

    fn settle(mut self, next: SessionState) {
        self.previous = None;
        self.state.send_replace(next);
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            debug!("[SessionStore] attempt ended without a session, restoring state");
            self.state.send_replace(previous);
        }
    }
}
