use std::sync::Arc;

use chrono::Utc;

use super::*;
use crate::backend::{BackendCall, MockBackend};
use crate::connection::{ConnectionManager, ConnectionSettings, MockConnector};
use crate::errors::{AuthError, BackendError, Error, ErrorKind, ValidationError};
use crate::session::{Session, SessionStore};
use crate::storage::MemoryClientStore;

const PASSWORD: &str = "tokens4ever";

struct Harness {
    accounts: AccountService,
    sessions: Arc<SessionStore>,
    backend: MockBackend,
}

async fn harness(signed_in: bool) -> Harness {
    let carol = Session {
        id: "carol".to_string(),
        name: "Carol".to_string(),
        email: "carol@example.com".to_string(),
        token_balance: 10,
        created_at: Utc::now(),
        last_login: None,
    };
    let backend = MockBackend::new().with_user(carol, PASSWORD);
    let connection = Arc::new(ConnectionManager::new(
        ConnectionSettings::default(),
        Arc::new(MockConnector::new(backend.clone())),
    ));
    connection.initialize().await.unwrap();

    let sessions = Arc::new(SessionStore::new(
        Arc::clone(&connection),
        Arc::new(MemoryClientStore::new()),
    ));
    if signed_in {
        sessions.login("carol@example.com", PASSWORD).await.unwrap();
    }

    Harness {
        accounts: AccountService::new(connection, Arc::clone(&sessions)),
        sessions,
        backend,
    }
}

#[tokio::test]
async fn test_token_balance_refreshes_session() {
    let h = harness(true).await;

    assert_eq!(h.accounts.token_balance().await.unwrap(), 10);
    assert_eq!(
        h.sessions.current_session().map(|s| s.token_balance),
        Some(10)
    );
}

#[tokio::test]
async fn test_buy_tokens_updates_balance() {
    let h = harness(true).await;

    let balance = h.accounts.buy_tokens(25).await.unwrap();

    assert_eq!(balance, 35);
    assert_eq!(
        h.sessions.current_session().map(|s| s.token_balance),
        Some(35)
    );
    assert!(h.backend.calls().contains(&BackendCall::BuyTokens {
        user_id: "carol".to_string(),
        amount: 25
    }));
}

#[tokio::test]
async fn test_buy_zero_tokens_makes_no_call() {
    let h = harness(true).await;
    let before = h.backend.call_count();

    let result = h.accounts.buy_tokens(0).await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::InvalidAmount))
    ));
    assert_eq!(h.backend.call_count(), before);
}

#[tokio::test]
async fn test_declined_purchase() {
    let h = harness(true).await;
    h.backend.set_reject_purchases(true);

    let err = h.accounts.buy_tokens(5).await.unwrap_err();

    assert!(matches!(err, Error::Rejected("token purchase")));
    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert_eq!(
        h.sessions.current_session().map(|s| s.token_balance),
        Some(10)
    );
}

#[tokio::test]
async fn test_operations_require_session() {
    let h = harness(false).await;

    assert!(matches!(
        h.accounts.token_balance().await,
        Err(Error::Auth(AuthError::NotAuthenticated))
    ));
    assert!(matches!(
        h.accounts.investment_suggestion().await,
        Err(Error::Auth(AuthError::NotAuthenticated))
    ));
    assert_eq!(h.backend.call_count(), 0);
}

#[tokio::test]
async fn test_investment_suggestion() {
    let h = harness(true).await;
    h.backend
        .set_suggestion("Hold OwnSphere Token for staking rewards");

    assert_eq!(
        h.accounts.investment_suggestion().await.unwrap(),
        "Hold OwnSphere Token for staking rewards"
    );
}

#[tokio::test]
async fn test_create_post_trims_content() {
    let h = harness(true).await;

    h.accounts.create_post("  hello sphere \n").await.unwrap();

    assert_eq!(
        h.backend.posts(),
        vec![("carol".to_string(), "hello sphere".to_string())]
    );
}

#[tokio::test]
async fn test_empty_post_makes_no_call() {
    let h = harness(true).await;
    let before = h.backend.call_count();

    assert!(matches!(
        h.accounts.create_post("   ").await,
        Err(Error::Validation(ValidationError::EmptyPost))
    ));
    assert_eq!(h.backend.call_count(), before);
}

#[tokio::test]
async fn test_backend_failure_is_connection_failure() {
    let h = harness(true).await;
    h.backend
        .fail_with(BackendError::transport("getTokenBalance", "connection reset"));

    let err = h.accounts.token_balance().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionFailure);
}
