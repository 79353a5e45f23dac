use crate::core::{Pair, Quote, QuoteId, QuoteStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct Inner {
    pairs: Vec<Pair>,
    quotes: HashMap<QuoteId, Quote>,
    history: HashMap<Pair, Vec<QuoteId>>,
}

/// In-memory quote store, lost on exit.
pub struct MemoryQuoteStore {
    inner: Mutex<Inner>,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemoryQuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn ensure_pair_registered(&self, pair: &Pair) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if !inner.pairs.contains(pair) {
            debug!(%pair, "Registering pair");
            inner.pairs.push(pair.clone());
        }
        Ok(())
    }

    async fn list_registered_pairs(&self) -> Result<Vec<Pair>> {
        Ok(self.inner.lock().await.pairs.clone())
    }

    async fn insert_quote(&self, quote: &Quote) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.quotes.contains_key(&quote.id) {
            anyhow::bail!("Quote {} already exists", quote.id);
        }
        inner.quotes.insert(quote.id, quote.clone());
        inner
            .history
            .entry(quote.pair.clone())
            .or_default()
            .push(quote.id);
        Ok(())
    }

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>> {
        Ok(self.inner.lock().await.quotes.get(&id).cloned())
    }

    async fn get_latest_quote(&self, pair: &Pair) -> Result<Option<Quote>> {
        let inner = self.inner.lock().await;
        let latest = inner.history.get(pair).and_then(|ids| {
            // max_by_key keeps the last of equal elements, so ties go to the
            // most recently inserted quote
            ids.iter()
                .filter_map(|id| inner.quotes.get(id))
                .max_by_key(|quote| quote.observed_at)
        });
        Ok(latest.cloned())
    }
}
