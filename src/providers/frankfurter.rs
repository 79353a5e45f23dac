use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::core::{Pair, RateSource};

/// Rate source backed by the Frankfurter API (`/latest?from=EUR&to=USD`).
pub struct FrankfurterProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent("fxq/1.0").build()?;
        Ok(FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, Decimal>,
}

#[async_trait]
impl RateSource for FrankfurterProvider {
    #[instrument(name = "FrankfurterRateFetch", skip(self), fields(pair = %pair))]
    async fn fetch_rate(&self, pair: &Pair) -> Result<Decimal> {
        let url = format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            pair.base(),
            pair.target()
        );
        debug!("Requesting rate from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, pair))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                pair
            ));
        }

        let text = response.text().await?;
        let data: LatestResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", pair, e))?;

        let rate = data
            .rates
            .get(pair.target().as_str())
            .copied()
            .ok_or_else(|| anyhow!("No rate found for {} in response for {}", pair.target(), pair))?;

        if rate <= Decimal::ZERO {
            return Err(anyhow!("Non-positive rate {} for currency pair: {}", rate, pair));
        }
        Ok(rate)
    }
}
