use std::sync::{Arc, Mutex as StdMutex, MutexGuard, RwLock};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};

use ownsphere_market_data::{
    fallback_quotes, AssetSpec, MarketDataError, MarketDataProvider, MarketSource,
    PollConfiguration, SimulatedProvider, DEFAULT_BASKET,
};

use super::auto_refresh::AutoRefresh;
use super::{FeedBanner, MarketFeed};
use crate::constants::MARKET_POLL_CONFIG_KEY;
use crate::errors::{Error, Result, ValidationError};
use crate::storage::{read_json, write_json, ClientStore};

/// Upper bound for one provider fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Keeps the market feed current.
///
/// Fetches are serialized: explicit calls queue behind each other, timer
/// ticks are skipped while another fetch is running. The feed is never
/// empty; a failed remote fetch is replaced by the fallback dataset and a
/// banner. The service is the only writer of the poll configuration.
pub struct MarketDataService {
    remote: Arc<dyn MarketDataProvider>,
    simulated: Arc<dyn MarketDataProvider>,
    basket: Vec<AssetSpec>,
    store: Arc<dyn ClientStore>,
    fetch_timeout: Duration,
    config: RwLock<PollConfiguration>,
    feed: watch::Sender<MarketFeed>,
    fetch_lock: Mutex<()>,
    auto_refresh: StdMutex<Option<AutoRefresh>>,
}

impl MarketDataService {
    /// Service over the default basket, restoring the persisted configuration.
    pub fn new(remote: Arc<dyn MarketDataProvider>, store: Arc<dyn ClientStore>) -> Self {
        Self::with_sources(
            remote,
            Arc::new(SimulatedProvider::new()),
            DEFAULT_BASKET.to_vec(),
            store,
        )
    }

    pub fn with_sources(
        remote: Arc<dyn MarketDataProvider>,
        simulated: Arc<dyn MarketDataProvider>,
        basket: Vec<AssetSpec>,
        store: Arc<dyn ClientStore>,
    ) -> Self {
        let config: PollConfiguration = read_json(store.as_ref(), MARKET_POLL_CONFIG_KEY);
        debug!(
            "[MarketDataService] restored poll configuration: {:?}",
            config
        );

        let fetched_at = Utc::now();
        let (feed, _) = watch::channel(MarketFeed {
            quotes: fallback_quotes(&basket, fetched_at),
            source: config.source,
            fetched_at,
            banner: None,
        });

        Self {
            remote,
            simulated,
            basket,
            store,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            config: RwLock::new(config),
            feed,
            fetch_lock: Mutex::new(()),
            auto_refresh: StdMutex::new(None),
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> PollConfiguration {
        self.config
            .read()
            .map(|c| c.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn feed(&self) -> MarketFeed {
        self.feed.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MarketFeed> {
        self.feed.subscribe()
    }

    /// Fetch from `source` and publish the result. Never fails and never
    /// returns an empty feed.
    pub async fn fetch_once(&self, source: MarketSource) -> MarketFeed {
        let _guard = self.fetch_lock.lock().await;
        self.fetch_locked(source).await
    }

    /// Persist `source` as the active source, then fetch from it.
    pub async fn set_source(&self, source: MarketSource) -> Result<MarketFeed> {
        self.update_config(|config| config.source = source)?;
        info!("[MarketDataService] source set to {}", source);
        Ok(self.fetch_once(source).await)
    }

    /// Start polling every `interval`, replacing any running timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_auto_refresh(self: &Arc<Self>, interval: Duration) -> Result<()> {
        if interval.is_zero() {
            return Err(ValidationError::InvalidConfig(
                "auto-refresh interval must be greater than zero".to_string(),
            )
            .into());
        }
        let runtime = Handle::try_current()
            .map_err(|e| Error::Unexpected(format!("auto-refresh needs a runtime: {}", e)))?;

        {
            let mut slot = self.auto_refresh_slot();
            if slot.take().is_some() {
                debug!("[MarketDataService] replacing running auto-refresh timer");
            }
            *slot = Some(AutoRefresh::spawn(
                &runtime,
                Arc::downgrade(self),
                interval,
            ));
        }

        let interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.update_config(|config| {
            config.enabled = true;
            config.interval_ms = interval_ms;
        })?;
        info!(
            "[MarketDataService] auto-refresh every {} ms",
            interval_ms
        );
        Ok(())
    }

    /// Stop polling. Does nothing when no timer is running.
    pub fn stop_auto_refresh(&self) -> Result<()> {
        let Some(timer) = self.auto_refresh_slot().take() else {
            return Ok(());
        };
        drop(timer);

        self.update_config(|config| config.enabled = false)?;
        info!("[MarketDataService] auto-refresh stopped");
        Ok(())
    }

    /// Restart the timer if the persisted configuration has it enabled.
    /// Returns whether a timer is now running.
    pub fn resume_auto_refresh(self: &Arc<Self>) -> Result<bool> {
        let config = self.config();
        if !config.enabled {
            return Ok(false);
        }
        self.start_auto_refresh(config.interval())?;
        Ok(true)
    }

    pub fn is_auto_refresh_active(&self) -> bool {
        self.auto_refresh_slot()
            .as_ref()
            .is_some_and(|timer| timer.is_active())
    }

    /// Period of the running timer, if any.
    pub fn auto_refresh_period(&self) -> Option<Duration> {
        self.auto_refresh_slot().as_ref().map(|timer| timer.period())
    }

    /// Cancel the timer without touching the persisted configuration.
    pub fn shutdown(&self) {
        if self.auto_refresh_slot().take().is_some() {
            debug!("[MarketDataService] auto-refresh cancelled on shutdown");
        }
    }

    /// One timer tick. Skipped when a fetch is already running.
    pub(crate) async fn refresh_tick(&self) {
        let Ok(_guard) = self.fetch_lock.try_lock() else {
            debug!("[MarketDataService] fetch in progress, skipping tick");
            return;
        };
        let source = self.config().source;
        self.fetch_locked(source).await;
    }

    async fn fetch_locked(&self, source: MarketSource) -> MarketFeed {
        let provider = match source {
            MarketSource::Remote => &self.remote,
            MarketSource::Simulated => &self.simulated,
        };

        let result = tokio::time::timeout(self.fetch_timeout, provider.fetch_basket(&self.basket))
            .await
            .unwrap_or_else(|_| {
                Err(MarketDataError::Timeout {
                    provider: provider.id().to_string(),
                })
            });
        let fetched_at = Utc::now();

        let feed = match result {
            Ok(quotes) if !quotes.is_empty() => {
                debug!(
                    "[MarketDataService] {} quotes from {}",
                    quotes.len(),
                    provider.id()
                );
                MarketFeed {
                    quotes,
                    source,
                    fetched_at,
                    banner: None,
                }
            }
            outcome => {
                let error = match outcome {
                    Err(e) => e,
                    Ok(_) => MarketDataError::EmptyBasket {
                        provider: provider.id().to_string(),
                    },
                };
                warn!(
                    "[MarketDataService] {} failed, serving fallback: {}",
                    provider.id(),
                    error
                );
                MarketFeed {
                    quotes: fallback_quotes(&self.basket, fetched_at),
                    source,
                    fetched_at,
                    banner: Some(FeedBanner::source_unavailable(&error)),
                }
            }
        };

        self.feed.send_replace(feed.clone());
        feed
    }

    fn update_config(&self, change: impl FnOnce(&mut PollConfiguration)) -> Result<()> {
        let snapshot = {
            let mut config = self
                .config
                .write()
                .map_err(|_| Error::Unexpected("poll configuration lock poisoned".into()))?;
            change(&mut config);
            config.clone()
        };
        write_json(self.store.as_ref(), MARKET_POLL_CONFIG_KEY, &snapshot)
    }

    fn auto_refresh_slot(&self) -> MutexGuard<'_, Option<AutoRefresh>> {
        self.auto_refresh
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for MarketDataService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
