//! Quote persistence abstractions

use crate::core::currency::Pair;
use crate::core::quote::{Quote, QuoteId};
use anyhow::Result;
use async_trait::async_trait;

/// Storage for registered pairs and their append-only quote history.
///
/// Absent rows are reported as `Ok(None)` or an empty list, never as an error.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Registers `pair` if it is not already known. Registering twice is a no-op.
    async fn ensure_pair_registered(&self, pair: &Pair) -> Result<()>;

    async fn list_registered_pairs(&self) -> Result<Vec<Pair>>;

    async fn insert_quote(&self, quote: &Quote) -> Result<()>;

    async fn get_quote(&self, id: QuoteId) -> Result<Option<Quote>>;

    /// Latest quote for `pair` by `observed_at`, ties resolved by insertion order.
    async fn get_latest_quote(&self, pair: &Pair) -> Result<Option<Quote>>;
}
