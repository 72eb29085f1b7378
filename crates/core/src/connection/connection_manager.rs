use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{watch, Mutex};

use super::{BackendConnector, ConnectionSettings, ConnectionState, Identity};
use crate::backend::BackendApi;
use crate::errors::ConnectionError;

/// Owns the single backend handle of the application.
///
/// The state starts in `Connecting` and moves to `Ready` or `Failed` once per
/// attempt. Only [`ConnectionManager::retry`] starts a new attempt after a
/// failure, and only [`ConnectionManager::shutdown`] leaves `Ready`.
pub struct ConnectionManager {
    settings: ConnectionSettings,
    connector: Arc<dyn BackendConnector>,
    state: watch::Sender<ConnectionState>,
    // Serializes attempts; waiters observe the result of the attempt ahead of them.
    attempt_lock: Mutex<()>,
}

impl ConnectionManager {
    pub fn new(settings: ConnectionSettings, connector: Arc<dyn BackendConnector>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            settings,
            connector,
            state,
            attempt_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Establish the connection, or return the outcome of the attempt that
    /// already did.
    pub async fn initialize(&self) -> Result<Arc<dyn BackendApi>, ConnectionError> {
        let _guard = self.attempt_lock.lock().await;

        match self.current() {
            ConnectionState::Ready(handle) => Ok(handle),
            ConnectionState::Failed(reason) => Err(reason),
            ConnectionState::Connecting => self.attempt().await,
        }
    }

    /// User-triggered reconnect after a failure.
    pub async fn retry(&self) -> Result<Arc<dyn BackendApi>, ConnectionError> {
        let _guard = self.attempt_lock.lock().await;

        if let ConnectionState::Ready(handle) = self.current() {
            debug!("[ConnectionManager] retry requested while ready, keeping handle");
            return Ok(handle);
        }
        info!("[ConnectionManager] retrying backend connection");
        self.state.send_replace(ConnectionState::Connecting);
        self.attempt().await
    }

    /// The backend handle, if the connection is ready.
    pub fn handle(&self) -> Result<Arc<dyn BackendApi>, ConnectionError> {
        match &*self.state.borrow() {
            ConnectionState::Ready(handle) => Ok(Arc::clone(handle)),
            ConnectionState::Connecting => Err(ConnectionError::NotReady),
            ConnectionState::Failed(reason) => Err(reason.clone()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Release the handle. Any attempt still running discards its result.
    pub fn shutdown(&self) {
        info!("[ConnectionManager] shutting down backend connection");
        self.state
            .send_replace(ConnectionState::Failed(ConnectionError::Closed));
    }

    fn current(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    async fn attempt(&self) -> Result<Arc<dyn BackendApi>, ConnectionError> {
        let outcome = self.connect().await;

        let next = match &outcome {
            Ok(handle) => ConnectionState::Ready(Arc::clone(handle)),
            Err(reason) => {
                error!("[ConnectionManager] {}", reason);
                ConnectionState::Failed(reason.clone())
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if matches!(state, ConnectionState::Connecting) {
                *state = next;
                true
            } else {
                false
            }
        });
        if !applied {
            warn!("[ConnectionManager] connection closed during attempt, discarding result");
            return Err(ConnectionError::Closed);
        }
        outcome
    }

    async fn connect(&self) -> Result<Arc<dyn BackendApi>, ConnectionError> {
        let settings = &self.settings;
        debug!(
            "[ConnectionManager] connecting to {} (canister {}, {})",
            settings.host, settings.canister_id, settings.environment
        );

        let root_key = if settings.environment.requires_root_key() {
            let fetched = tokio::time::timeout(
                settings.request_timeout,
                self.connector.fetch_root_key(settings),
            )
            .await
            .map_err(|_| {
                ConnectionError::TrustHandshake(format!(
                    "no answer from {} within {} ms",
                    settings.host,
                    settings.request_timeout.as_millis()
                ))
            })?
            .map_err(|e| ConnectionError::TrustHandshake(e.to_string()))?;
            debug!("[ConnectionManager] root key {:?}", fetched);
            Some(fetched)
        } else {
            None
        };

        let handle = self
            .connector
            .build_handle(settings, Identity::Anonymous, root_key)
            .map_err(|e| ConnectionError::HandleConstruction(e.to_string()))?;

        info!("[ConnectionManager] backend connection ready");
        Ok(handle)
    }
}
