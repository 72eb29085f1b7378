//! Contract with the remote OwnSphere backend.

mod backend_model;
mod backend_traits;
mod mock_backend;

use std::future::Future;
use std::time::Duration;

use crate::errors::BackendError;

pub use backend_model::{LoginRequest, RegisterUserRequest, RegistrationOutcome};
pub use backend_traits::BackendApi;
pub use mock_backend::{BackendCall, MockBackend};

/// Bound a backend call by `limit`, reporting an elapsed limit as a timeout of `method`.
pub async fn with_timeout<T, F>(limit: Duration, method: &str, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| BackendError::timeout(method))?
}
