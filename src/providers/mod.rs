pub mod frankfurter;
pub mod yahoo_finance;

use crate::core::RateSource;
use crate::core::config::{AppConfig, ProviderKind};
use anyhow::Result;
use std::sync::Arc;

/// Builds the rate source selected in the configuration.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn RateSource>> {
    let source: Arc<dyn RateSource> = match config.provider {
        ProviderKind::Frankfurter => Arc::new(frankfurter::FrankfurterProvider::new(
            config.frankfurter_base_url(),
        )?),
        ProviderKind::Yahoo => Arc::new(yahoo_finance::YahooCurrencyProvider::new(
            config.yahoo_base_url(),
        )?),
    };
    Ok(source)
}
