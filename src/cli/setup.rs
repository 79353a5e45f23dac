use super::ui;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");

/// Writes the example configuration to the default location and prints where
/// quotes will be stored.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    let config = setup_at_path(&path)?;

    println!(
        "{} {}",
        ui::style_text("Configuration written to", ui::StyleType::Title),
        path.display()
    );
    println!(
        "Tracking {} currencies via {:?}, quotes stored in {}",
        config.currencies.len(),
        config.provider,
        config.default_data_path()?.display()
    );
    Ok(())
}

/// Writes the example configuration to `path` and loads it back, so a file
/// fxq cannot read is never reported as set up. Refuses to overwrite.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    let config = AppConfig::load_from_path(path)
        .with_context(|| format!("Written configuration at {} does not load", path.display()))?;

    info!(
        path = %path.display(),
        currencies = config.currencies.len(),
        freshness_secs = config.freshness_secs,
        "Created default configuration"
    );
    Ok(config)
}
