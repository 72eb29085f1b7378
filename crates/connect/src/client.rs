//! HTTP client for the OwnSphere canister gateway.
//!
//! Every backend method is a `POST {host}/api/v1/canisters/{canisterId}/{method}`
//! with the arguments as a JSON object and the return value as the JSON body.
//! Transport and protocol failures are converted to [`BackendError`] here, so
//! no `reqwest` error leaves this crate.

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ownsphere_core::backend::{BackendApi, LoginRequest, RegisterUserRequest, RegistrationOutcome};
use ownsphere_core::connection::{Identity, RootKey};
use ownsphere_core::errors::BackendError;
use ownsphere_core::session::Session;

/// Header carrying the caller's principal.
pub const PRINCIPAL_HEADER: &str = "x-ownsphere-principal";

/// Gateway error code for a registration whose email is already used.
pub const EMAIL_TAKEN: &str = "EMAIL_TAKEN";

/// Gateway error code for a registration whose user id is already used.
pub const ID_TAKEN: &str = "ID_TAKEN";

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types (internal)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Serialize)]
struct UserIdArgs<'a> {
    id: &'a str,
}

#[derive(Serialize)]
struct BuyTokensArgs<'a> {
    id: &'a str,
    amount: u64,
}

#[derive(Serialize)]
struct CreatePostArgs<'a> {
    id: &'a str,
    content: &'a str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend API Client
// ─────────────────────────────────────────────────────────────────────────────

/// [`BackendApi`] over the canister gateway.
///
/// # Example
///
/// ```ignore
/// let client = BackendApiClient::new("http://localhost:4943", "bkyz2-fmaaa-aaaaa-qaaaq-cai",
///     Identity::Anonymous, None, Duration::from_secs(30))?;
/// let user = client.get_user("alice").await?;
/// ```
#[derive(Debug, Clone)]
pub struct BackendApiClient {
    client: reqwest::Client,
    base_url: String,
    principal: HeaderValue,
    root_key: Option<RootKey>,
}

impl BackendApiClient {
    /// Create a client bound to one canister.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        host: &str,
        canister_id: &str,
        identity: Identity,
        root_key: Option<RootKey>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::transport("build", format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!(
                "{}/api/v1/canisters/{}",
                host.trim_end_matches('/'),
                canister_id
            ),
            principal: HeaderValue::from_static(identity.principal()),
            root_key,
        })
    }

    /// Root key trusted by this client, when talking to a local replica.
    pub fn root_key(&self) -> Option<&RootKey> {
        self.root_key.as_ref()
    }

    /// Create default headers for gateway requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(PRINCIPAL_HEADER),
            self.principal.clone(),
        );
        headers
    }

    /// Send a canister call and return the raw status and body.
    async fn send<A>(&self, method: &str, args: &A) -> Result<(StatusCode, String), BackendError>
    where
        A: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, method);
        debug!("[BackendApi] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(args)
            .send()
            .await
            .map_err(|e| map_transport(method, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport(method, e))?;
        Ok((status, body))
    }

    /// Call a canister method and decode its return value.
    async fn call<A, T>(&self, method: &str, args: &A) -> Result<T, BackendError>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (status, body) = self.send(method, args).await?;
        parse_response(method, status, &body)
    }
}

fn map_transport(method: &str, error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(method)
    } else {
        BackendError::transport(method, error.to_string())
    }
}

/// Parse a gateway response, handling errors appropriately.
fn parse_response<T: DeserializeOwned>(
    method: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, BackendError> {
    if !status.is_success() {
        // Try to parse error response for a better message
        let message = match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(err) => err
                .message
                .or(err.code)
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => body.chars().take(200).collect(),
        };
        return Err(BackendError::rejected(method, status.as_u16(), message));
    }

    serde_json::from_str(body).map_err(|e| BackendError::decode(method, e.to_string()))
}

/// Registration conflict reported by the gateway, if the body names one.
fn conflict_code(status: StatusCode, body: &str) -> Option<RegistrationOutcome> {
    if status != StatusCode::CONFLICT {
        return None;
    }
    let err: ApiErrorResponse = serde_json::from_str(body).ok()?;
    match err.code.as_deref() {
        Some(EMAIL_TAKEN) => Some(RegistrationOutcome::EmailTaken),
        Some(ID_TAKEN) => Some(RegistrationOutcome::IdTaken),
        _ => None,
    }
}

#[async_trait]
impl BackendApi for BackendApiClient {
    async fn register_user(
        &self,
        request: &RegisterUserRequest,
    ) -> Result<RegistrationOutcome, BackendError> {
        let (status, body) = self.send("registerUser", request).await?;
        if let Some(conflict) = conflict_code(status, &body) {
            return Ok(conflict);
        }
        parse_response::<bool>("registerUser", status, &body).map(RegistrationOutcome::from)
    }

    async fn login_user(&self, request: &LoginRequest) -> Result<Option<Session>, BackendError> {
        self.call("loginUser", request).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<Session>, BackendError> {
        self.call("getUser", &UserIdArgs { id: user_id }).await
    }

    async fn get_token_balance(&self, user_id: &str) -> Result<u64, BackendError> {
        self.call("getTokenBalance", &UserIdArgs { id: user_id })
            .await
    }

    async fn get_investment_suggestion(&self, user_id: &str) -> Result<String, BackendError> {
        self.call("getInvestmentSuggestion", &UserIdArgs { id: user_id })
            .await
    }

    async fn buy_tokens(&self, user_id: &str, amount: u64) -> Result<bool, BackendError> {
        self.call(
            "buyTokens",
            &BuyTokensArgs {
                id: user_id,
                amount,
            },
        )
        .await
    }

    async fn create_post(&self, user_id: &str, content: &str) -> Result<bool, BackendError> {
        self.call(
            "createPost",
            &CreatePostArgs {
                id: user_id,
                content,
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BackendApiClient {
        BackendApiClient::new(
            "http://localhost:4943/",
            "bkyz2-fmaaa-aaaaa-qaaaq-cai",
            Identity::Anonymous,
            None,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_client_url_normalization() {
        assert_eq!(
            client().base_url,
            "http://localhost:4943/api/v1/canisters/bkyz2-fmaaa-aaaaa-qaaaq-cai"
        );
    }

    #[test]
    fn test_headers_carry_principal() {
        let headers = client().headers();
        assert_eq!(headers.get(PRINCIPAL_HEADER).unwrap(), "2vxsx-fae");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_conflict_codes() {
        let body = r#"{"code":"EMAIL_TAKEN","message":"email already registered"}"#;
        assert_eq!(
            conflict_code(StatusCode::CONFLICT, body),
            Some(RegistrationOutcome::EmailTaken)
        );
        assert_eq!(
            conflict_code(StatusCode::CONFLICT, r#"{"code":"ID_TAKEN"}"#),
            Some(RegistrationOutcome::IdTaken)
        );
        assert_eq!(conflict_code(StatusCode::INTERNAL_SERVER_ERROR, body), None);
        assert_eq!(conflict_code(StatusCode::CONFLICT, r#"{"code":"OTHER"}"#), None);
        assert_eq!(conflict_code(StatusCode::CONFLICT, "conflict"), None);
    }

    #[test]
    fn test_error_message_prefers_gateway_text() {
        let result = parse_response::<bool>(
            "buyTokens",
            StatusCode::BAD_REQUEST,
            r#"{"message":"insufficient funds"}"#,
        );
        assert_eq!(
            result,
            Err(BackendError::rejected("buyTokens", 400, "insufficient funds"))
        );
    }

    #[test]
    fn test_wire_args() {
        let json = serde_json::to_value(BuyTokensArgs {
            id: "alice",
            amount: 5,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"id": "alice", "amount": 5}));
    }
}
