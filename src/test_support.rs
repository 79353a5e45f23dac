//! Test doubles shared by unit tests.

use crate::core::{Clock, Pair, Quote, QuoteId, QuoteStore, RateSource};
use crate::store::MemoryQuoteStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn pair(s: &str) -> Pair {
    s.parse().unwrap()
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Rate source returning canned rates, counting every call.
pub struct MockRateSource {
    call_count: AtomicUsize,
    rates: Mutex<HashMap<String, Decimal>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
}

impl MockRateSource {
    pub fn new() -> Self {
        Self {
            call_count: AtomicUsize::new(0),
            rates: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn set_rate(&self, pair: &str, rate: Decimal) {
        self.rates.lock().unwrap().insert(pair.to_string(), rate);
    }

    pub fn fail_for(&self, pair: &str) {
        self.failing.lock().unwrap().insert(pair.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn fetch_rate(&self, pair: &Pair) -> Result<Decimal> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let key = pair.to_string();
        if self.failing.lock().unwrap().contains(&key) {
            return Err(anyhow!("Unknown currency pair: {key}"));
        }
        Ok(self
            .rates
            .lock()
            .unwrap()
            .get(&key)
            .copied()
            .unwrap_or(Decimal::ONE))
    }
}

/// Memory store with switchable failures.
pub struct FailingStore {
    inner: MemoryQuoteStore,
    fail_registration: AtomicBool,
    fail_list: AtomicBool,
    fail_insert: AtomicBool,
    hang: AtomicBool,
    stall: Mutex<Option<Duration>>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryQuoteStore::new(),
            fail_registration: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            hang: AtomicBool::new(false),
            stall: Mutex::new(None),
        }
    }

    pub fn fail_registration(&self, fail: bool) {
        self.fail_registration.store(fail, Ordering::SeqCst);
    }

    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    /// Makes every call block a pool thread for `by`, the way a slow disk
    /// sync does.
    pub fn stall(&self, by: Duration) {
        *self.stall.lock().unwrap() = Some(by);
    }

    async fn maybe_hang(&self) {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        let stall = *self.stall.lock().unwrap();
        if let Some(by) = stall {
            tokio::task::spawn_blocking(move || std::thread::sleep(by))
                .await
                .unwrap();
        }
    }
}

#[async_trait]
impl QuoteStore for FailingStore {
    async fn ensure_pair_registered(&self, pair: &Pair) -> Result<()> {
        self.maybe_hang().await;
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        self.inner.ensure_pair_registered(pair).await
    }

    async fn list_registered_pairs(&self) -> Result<Vec<Pair>> {
        self.maybe_hang().await;
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(anyhow!("connection refused"));
        }
        self.inner.list_registered_pairs().await
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<()> {
        self.maybe_hang().await;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(anyhow!("disk full"));
        }
        self.inner.insert_quote(quote).await
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        self.maybe_hang().await;
        self.inner.get_quote(id).await
    }

    async fn get_latest_quote(&self, pair: &Pair) -> Result<Option<Quote>> {
        self.maybe_hang().await;
        self.inner.get_latest_quote(pair).await
    }
}
