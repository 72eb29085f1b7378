use std::sync::Arc;

use async_trait::async_trait;

use super::{ConnectionSettings, Identity, RootKey};
use crate::backend::BackendApi;
use crate::errors::BackendError;

/// Builds backend handles for a [`super::ConnectionManager`].
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// Fetch the root key from the local replica status endpoint.
    async fn fetch_root_key(&self, settings: &ConnectionSettings) -> Result<RootKey, BackendError>;

    /// Construct a handle bound to `settings.canister_id`.
    fn build_handle(
        &self,
        settings: &ConnectionSettings,
        identity: Identity,
        root_key: Option<RootKey>,
    ) -> Result<Arc<dyn BackendApi>, BackendError>;
}
