//! Listing Harvest application shell
//!
//! Loads configuration, installs logging and queues the three pipeline
//! stages. All extraction logic lives in the `crates/` directory.

use anyhow::Context;
use harvest_core::AppConfig;
use harvest_pipeline::{ItemEnrichment, LinkExtraction, PipelineRunner, RenderCapture};
use std::path::Path;
use tracing::info;

/// Explicit config file, bypassing the XDG lookup.
const CONFIG_ENV: &str = "HARVEST_CONFIG";

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,harvest=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Load configuration from `HARVEST_CONFIG` if set, else the default
/// location, then apply environment overrides.
pub fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            let mut config = AppConfig::load_from(Path::new(&path))
                .with_context(|| format!("loading config from {path}"))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            config
        }
        Err(_) => AppConfig::load_with_env().context("loading config")?,
    };
    Ok(config)
}

/// Queue capture, link extraction and enrichment, in that order.
pub fn build_pipeline(config: &AppConfig) -> anyhow::Result<PipelineRunner> {
    let enrichment = ItemEnrichment::new(config).context("configuring item enrichment")?;

    let mut runner = PipelineRunner::new();
    runner
        .add_stage(Box::new(RenderCapture::new(config)))
        .add_stage(Box::new(LinkExtraction::new(config)))
        .add_stage(Box::new(enrichment));
    Ok(runner)
}

/// Entry point used by the binary.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting listing-harvest v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!("Target: {}", config.target.url);
    info!("Artifacts in {}", config.output.dir.display());

    let mut runner = build_pipeline(&config)?;
    runner.run().await;

    info!("Done");
    Ok(())
}
