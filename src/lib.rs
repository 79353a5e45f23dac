pub mod cli;
pub mod core;
pub mod providers;
pub mod quotation;
pub mod refresh;
pub mod store;

#[cfg(test)]
mod test_support;

use crate::core::config::AppConfig;
use crate::quotation::QuoteService;
use crate::store::FjallQuoteStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Quote(String),
    Latest(String),
    Show(String),
    Pairs,
    Refresh,
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path = config.default_data_path()?;
    let store = Arc::new(FjallQuoteStore::open(&data_path)?);
    let source = providers::from_config(&config)?;
    let service = QuoteService::from_config(&config, store, source);
    info!(
        provider = ?config.provider,
        data_path = %data_path.display(),
        "Quote service ready"
    );

    match command {
        AppCommand::Quote(pair) => cli::quote::request(&service, &pair, &config.currencies).await,
        AppCommand::Latest(pair) => cli::quote::latest(&service, &pair, &config.currencies).await,
        AppCommand::Show(id) => cli::quote::show(&service, &id).await,
        AppCommand::Pairs => cli::pairs::run(&service).await,
        AppCommand::Refresh => cli::refresh::once(&service).await,
        AppCommand::Watch => cli::refresh::periodic(&service, config.refresh_interval()).await,
    }
}
