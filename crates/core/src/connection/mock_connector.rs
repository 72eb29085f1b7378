use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{BackendConnector, ConnectionSettings, Identity, RootKey};
use crate::backend::{BackendApi, MockBackend};
use crate::errors::BackendError;

#[derive(Default)]
struct Faults {
    handshake: Option<BackendError>,
    build: Option<BackendError>,
    handshake_delay: Option<Duration>,
}

/// Connector that hands out a [`MockBackend`] without touching the network.
#[derive(Clone)]
pub struct MockConnector {
    backend: MockBackend,
    faults: Arc<Mutex<Faults>>,
    handshakes: Arc<AtomicUsize>,
    builds: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            faults: Arc::new(Mutex::new(Faults::default())),
            handshakes: Arc::new(AtomicUsize::new(0)),
            builds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn backend(&self) -> &MockBackend {
        &self.backend
    }

    pub fn fail_handshake(&self, error: Option<BackendError>) {
        self.with_faults(|f| f.handshake = error);
    }

    pub fn fail_build(&self, error: Option<BackendError>) {
        self.with_faults(|f| f.build = error);
    }

    pub fn delay_handshake(&self, delay: Duration) {
        self.with_faults(|f| f.handshake_delay = Some(delay));
    }

    pub fn handshake_count(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn with_faults<R>(&self, f: impl FnOnce(&mut Faults) -> R) -> R {
        let mut faults = self.faults.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut faults)
    }
}

#[async_trait]
impl BackendConnector for MockConnector {
    async fn fetch_root_key(&self, _settings: &ConnectionSettings) -> Result<RootKey, BackendError> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        let (delay, failure) = self.with_faults(|f| (f.handshake_delay, f.handshake.clone()));
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(RootKey(vec![0x30, 0x81, 0x82, 0x30, 0x1d])),
        }
    }

    fn build_handle(
        &self,
        _settings: &ConnectionSettings,
        _identity: Identity,
        _root_key: Option<RootKey>,
    ) -> Result<Arc<dyn BackendApi>, BackendError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.with_faults(|f| f.build.clone()) {
            return Err(error);
        }
        Ok(Arc::new(self.backend.clone()))
    }
}
