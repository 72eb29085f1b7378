//! Builds [`BackendApiClient`] handles for the connection manager.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;

use ownsphere_core::backend::BackendApi;
use ownsphere_core::connection::{BackendConnector, ConnectionSettings, Identity, RootKey};
use ownsphere_core::errors::BackendError;

use crate::client::BackendApiClient;

const STATUS_METHOD: &str = "status";

/// Body of `GET {host}/api/v2/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    root_key: Option<String>,
}

/// [`BackendConnector`] over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpBackendConnector {
    client: reqwest::Client,
}

impl HttpBackendConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate_canister_id(canister_id: &str) -> Result<(), BackendError> {
    let well_formed = !canister_id.is_empty()
        && canister_id
            .split('-')
            .all(|group| !group.is_empty() && group.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    if !well_formed {
        return Err(BackendError::transport(
            "build",
            format!("invalid canister id '{}'", canister_id),
        ));
    }
    Ok(())
}

#[async_trait]
impl BackendConnector for HttpBackendConnector {
    async fn fetch_root_key(&self, settings: &ConnectionSettings) -> Result<RootKey, BackendError> {
        let url = format!("{}/api/v2/status", settings.host.trim_end_matches('/'));
        debug!("[Connector] GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(settings.request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::timeout(STATUS_METHOD)
                } else {
                    BackendError::transport(STATUS_METHOD, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::rejected(
                STATUS_METHOD,
                status.as_u16(),
                format!("HTTP {}", status),
            ));
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| BackendError::decode(STATUS_METHOD, e.to_string()))?;
        let encoded = body
            .root_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| BackendError::decode(STATUS_METHOD, "status has no rootKey"))?;
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| BackendError::decode(STATUS_METHOD, format!("rootKey is not hex: {}", e)))?;

        let root_key = RootKey(bytes);
        info!("[Connector] fetched root key {:?}", root_key);
        Ok(root_key)
    }

    fn build_handle(
        &self,
        settings: &ConnectionSettings,
        identity: Identity,
        root_key: Option<RootKey>,
    ) -> Result<Arc<dyn BackendApi>, BackendError> {
        let host = Url::parse(&settings.host).map_err(|e| {
            BackendError::transport("build", format!("invalid host '{}': {}", settings.host, e))
        })?;
        if !matches!(host.scheme(), "http" | "https") {
            return Err(BackendError::transport(
                "build",
                format!("unsupported scheme '{}'", host.scheme()),
            ));
        }
        validate_canister_id(&settings.canister_id)?;

        let client = BackendApiClient::new(
            &settings.host,
            &settings.canister_id,
            identity,
            root_key,
            settings.request_timeout,
        )?;
        Ok(Arc::new(client))
    }
}
