//! Property-based integration tests for the session and market engines.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use std::sync::Arc;

use proptest::prelude::*;
use tokio::runtime::Runtime;

use ownsphere_core::backend::{BackendCall, MockBackend};
use ownsphere_core::connection::{ConnectionManager, ConnectionSettings, MockConnector};
use ownsphere_core::errors::{Error, ValidationError};
use ownsphere_core::market_data::{CoinGeckoProvider, MarketDataService, MarketSource};
use ownsphere_core::session::{RegistrationForm, SessionStore};
use ownsphere_core::storage::MemoryClientStore;

// =============================================================================
// Fixtures
// =============================================================================

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

async fn ready_sessions(backend: &MockBackend) -> SessionStore {
    let connection = Arc::new(ConnectionManager::new(
        ConnectionSettings::default(),
        Arc::new(MockConnector::new(backend.clone())),
    ));
    connection.initialize().await.unwrap();
    SessionStore::new(connection, Arc::new(MemoryClientStore::new()))
}

// =============================================================================
// Generators
// =============================================================================

/// Passwords of 1 to 7 characters, without surrounding whitespace.
fn arb_short_password() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{1,7}"
}

fn arb_password() -> impl Strategy<Value = String> {
    "[A-Za-z0-9!@#$%^&*]{8,40}"
}

fn arb_email() -> impl Strategy<Value = String> {
    ("[a-z0-9._]{1,12}", "[a-z]{2,10}", "[a-z]{2,4}")
        .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A short password is always reported as weak and never reaches the backend.
    #[test]
    fn prop_short_password_is_weak(password in arb_short_password(), email in arb_email()) {
        let rt = runtime();
        let backend = MockBackend::new();
        let result = rt.block_on(async {
            let sessions = ready_sessions(&backend).await;
            sessions
                .register(RegistrationForm {
                    id: "user01".to_string(),
                    name: "User".to_string(),
                    email,
                    password: password.clone(),
                    confirm_password: password,
                })
                .await
        });

        prop_assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::WeakPassword))
        ));
        prop_assert_eq!(backend.call_count(), 0);
    }

    /// The raw password never appears in what the backend receives.
    #[test]
    fn prop_login_sends_only_the_hash(password in arb_password(), email in arb_email()) {
        let rt = runtime();
        let backend = MockBackend::new();
        rt.block_on(async {
            let sessions = ready_sessions(&backend).await;
            let _ = sessions.login(&email, &password).await;
        });

        let calls = backend.calls();
        prop_assert_eq!(calls.len(), 1);
        let BackendCall::LoginUser(request) = &calls[0] else {
            return Err(TestCaseError::fail("expected a loginUser call"));
        };
        prop_assert_eq!(request.password_hash.as_str().len(), 64);
        prop_assert!(!request.password_hash.as_str().contains(password.as_str()));
        let wire = serde_json::to_string(request).unwrap();
        let quoted_password = format!("\"{}\"", password);
        prop_assert!(!wire.contains(&quoted_password));
    }

    /// The feed is never empty, whichever source is asked and whether it answers.
    #[test]
    fn prop_fetch_is_never_empty(remote in any::<bool>()) {
        let rt = runtime();
        let feed = rt.block_on(async {
            // Nothing listens on port 9; the remote source always fails.
            let provider = CoinGeckoProvider::with_base_url(
                "http://127.0.0.1:9",
                std::time::Duration::from_millis(200),
            );
            let service = MarketDataService::new(
                Arc::new(provider),
                Arc::new(MemoryClientStore::new()),
            );
            let source = if remote { MarketSource::Remote } else { MarketSource::Simulated };
            service.fetch_once(source).await
        });

        prop_assert!(!feed.quotes.is_empty());
        prop_assert_eq!(feed.banner.is_some(), remote);
    }
}
