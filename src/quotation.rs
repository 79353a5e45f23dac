//! Freshness-bounded quote lookups.
//!
//! [`QuoteService`] serves the latest stored quote for a pair while it is
//! younger than the freshness window and fetches a new one from the rate
//! source otherwise. Work for the same pair is serialized, so concurrent
//! requests for a stale pair share one upstream fetch.

use crate::core::config::AppConfig;
use crate::core::flight::KeyedLocks;
use crate::core::{Clock, Pair, Quote, QuoteError, QuoteId, QuoteStore, RateSource, SystemClock};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct QuoteService {
    store: Arc<dyn QuoteStore>,
    source: Arc<dyn RateSource>,
    clock: Arc<dyn Clock>,
    freshness: chrono::Duration,
    call_timeout: Duration,
    in_flight: KeyedLocks<Pair>,
}

impl QuoteService {
    pub fn new(
        store: Arc<dyn QuoteStore>,
        source: Arc<dyn RateSource>,
        freshness: Duration,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            source,
            clock: Arc::new(SystemClock),
            freshness: chrono::Duration::from_std(freshness).unwrap_or(chrono::Duration::MAX),
            call_timeout,
            in_flight: KeyedLocks::new(),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn QuoteStore>,
        source: Arc<dyn RateSource>,
    ) -> Self {
        Self::new(
            store,
            source,
            config.freshness_window(),
            config.call_timeout(),
        )
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the id of a fresh quote for `pair`, fetching and storing a new
    /// one when the latest stored quote is missing or stale.
    pub async fn request_quote(&self, pair: &Pair) -> Result<QuoteId, QuoteError> {
        self.persist(
            || format!("register pair {pair}"),
            self.store.ensure_pair_registered(pair),
        )
        .await?;

        let _guard = self.in_flight.lock(pair).await;

        let latest = self
            .persist(
                || format!("read latest quote for {pair}"),
                self.store.get_latest_quote(pair),
            )
            .await?;

        if let Some(quote) = latest {
            if quote.is_fresh(self.clock.now(), self.freshness) {
                debug!(%pair, quote_id = %quote.id, "Serving fresh quote");
                return Ok(quote.id);
            }
            debug!(%pair, quote_id = %quote.id, observed_at = %quote.observed_at, "Quote is stale");
        } else {
            debug!(%pair, "No stored quote");
        }

        let quote = self.fetch_and_store(pair).await?;
        Ok(quote.id)
    }

    /// Returns whatever is stored for `pair` without checking freshness.
    /// Pairs that are not registered yet, or have no quote, are bootstrapped
    /// through [`QuoteService::request_quote`].
    pub async fn resolve_latest(&self, pair: &Pair) -> Result<Quote, QuoteError> {
        let pairs = self.registered_pairs().await?;

        if pairs.iter().any(|registered| registered == pair) {
            let latest = self
                .persist(
                    || format!("read latest quote for {pair}"),
                    self.store.get_latest_quote(pair),
                )
                .await?;
            if let Some(quote) = latest {
                return Ok(quote);
            }
            debug!(%pair, "Pair registered without quotes");
        }

        info!(%pair, "Bootstrapping pair");
        let id = self.request_quote(pair).await?;
        self.get_by_id(id).await.map_err(|e| match e {
            QuoteError::NotFound(_) => {
                QuoteError::NotFound(format!("bootstrapped quote {id} for {pair} is missing"))
            }
            other => other,
        })
    }

    pub async fn get_by_id(&self, id: QuoteId) -> Result<Quote, QuoteError> {
        self.persist(|| format!("read quote {id}"), self.store.get_quote(id))
            .await?
            .ok_or_else(|| QuoteError::NotFound(format!("quote not found: {id}")))
    }

    pub async fn registered_pairs(&self) -> Result<Vec<Pair>, QuoteError> {
        self.persist(
            || "list registered pairs".to_string(),
            self.store.list_registered_pairs(),
        )
        .await
    }

    pub async fn latest_quote(&self, pair: &Pair) -> Result<Option<Quote>, QuoteError> {
        self.persist(
            || format!("read latest quote for {pair}"),
            self.store.get_latest_quote(pair),
        )
        .await
    }

    /// Unconditionally fetches and stores a new quote for `pair`.
    pub async fn refresh_pair(&self, pair: &Pair) -> Result<Quote, QuoteError> {
        let _guard = self.in_flight.lock(pair).await;
        self.fetch_and_store(pair).await
    }

    async fn fetch_and_store(&self, pair: &Pair) -> Result<Quote, QuoteError> {
        let rate = match tokio::time::timeout(self.call_timeout, self.source.fetch_rate(pair)).await
        {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => return Err(QuoteError::upstream(pair, e)),
            Err(elapsed) => return Err(QuoteError::upstream(pair, elapsed)),
        };

        let quote = Quote::new(pair.clone(), rate, self.clock.now());
        self.persist(
            || format!("store quote {} for {pair}", quote.id),
            self.store.insert_quote(&quote),
        )
        .await?;

        info!(%pair, quote_id = %quote.id, rate = %quote.rate, "Stored new quote");
        Ok(quote)
    }

    async fn persist<T>(
        &self,
        operation: impl FnOnce() -> String,
        call: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, QuoteError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(QuoteError::persistence(operation(), e)),
            Err(elapsed) => Err(QuoteError::persistence(operation(), elapsed)),
        }
    }
}
