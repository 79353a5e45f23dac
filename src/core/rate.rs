//! Upstream exchange rate abstractions

use crate::core::currency::Pair;
use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns the current positive rate for one unit of `pair.base()` in
    /// `pair.target()`.
    async fn fetch_rate(&self, pair: &Pair) -> Result<Decimal>;
}
