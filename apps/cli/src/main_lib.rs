use std::sync::Arc;

use ownsphere_connect::HttpBackendConnector;
use ownsphere_core::{
    storage::{ClientStore, FileClientStore},
    AccountService, ConnectionManager, MarketDataService, PreferencesService, SessionStore,
};
use ownsphere_market_data::CoinGeckoProvider;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Everything a command needs, wired once per process.
pub struct AppState {
    pub connection: Arc<ConnectionManager>,
    pub sessions: Arc<SessionStore>,
    pub accounts: Arc<AccountService>,
    pub market: Arc<MarketDataService>,
    pub preferences: Arc<PreferencesService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("OWNSPHERE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Build the services without touching the network.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    std::fs::create_dir_all(&config.data_dir)?;
    let file_store = FileClientStore::in_dir(&config.data_dir);
    tracing::info!("Client store in use: {}", file_store.path().display());
    let store: Arc<dyn ClientStore> = Arc::new(file_store);

    let connection = Arc::new(ConnectionManager::new(
        config.connection_settings(),
        Arc::new(HttpBackendConnector::new()),
    ));
    let sessions = Arc::new(SessionStore::new(connection.clone(), store.clone()));
    let accounts = Arc::new(AccountService::new(connection.clone(), sessions.clone()));

    let remote = Arc::new(CoinGeckoProvider::with_base_url(
        &config.market_url,
        config.request_timeout,
    ));
    let market = Arc::new(MarketDataService::new(remote, store.clone()));
    let preferences = Arc::new(PreferencesService::new(store));

    Ok(Arc::new(AppState {
        connection,
        sessions,
        accounts,
        market,
        preferences,
    }))
}

/// Connect and restore the persisted session, if any.
///
/// A failed connection is reported but not fatal; commands that need the
/// backend surface it themselves.
pub async fn connect_and_resume(state: &AppState) -> anyhow::Result<()> {
    match state.connection.initialize().await {
        Ok(_) => {
            if let Some(session) = state.sessions.resume().await? {
                tracing::info!("Resumed session for {}", session.id);
            }
        }
        Err(e) => tracing::warn!("Backend unavailable: {}", e),
    }
    Ok(())
}
