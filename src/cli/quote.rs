use super::ui;
use crate::core::{CurrencyCode, Pair, QuoteId};
use crate::quotation::QuoteService;
use anyhow::Result;
use tracing::debug;

/// Requests a quote that is at most one freshness window old.
pub async fn request(service: &QuoteService, input: &str, allowed: &[CurrencyCode]) -> Result<()> {
    let pair = Pair::parse_allowed(input, allowed)?;
    let id = service.request_quote(&pair).await?;
    debug!(%pair, quote_id = %id, "Quote requested");

    let quote = service.get_by_id(id).await?;
    println!("{}", ui::style_text(&id.to_string(), ui::StyleType::Value));
    println!("{}", ui::quotes_table([&quote]));
    Ok(())
}

/// Shows the latest stored quote for a pair, bootstrapping unknown pairs.
pub async fn latest(service: &QuoteService, input: &str, allowed: &[CurrencyCode]) -> Result<()> {
    let pair = Pair::parse_allowed(input, allowed)?;
    let quote = service.resolve_latest(&pair).await?;
    println!("{}", ui::quotes_table([&quote]));
    Ok(())
}

/// Shows a stored quote by id.
pub async fn show(service: &QuoteService, id: &str) -> Result<()> {
    let id: QuoteId = id
        .parse()
        .map_err(|e| crate::core::QuoteError::Validation(format!("invalid quote id {id}: {e}")))?;
    let quote = service.get_by_id(id).await?;
    println!("{}", ui::quotes_table([&quote]));
    Ok(())
}
