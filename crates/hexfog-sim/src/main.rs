//! Hexfog headless simulation host.

use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod driver;
mod observer;

use config::SimConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Script from env or the built-in default
    let mut config = match std::env::var("HEXFOG_CONFIG") {
        Ok(path) => SimConfig::load(&PathBuf::from(path))?,
        Err(_) => SimConfig::default(),
    };
    if let Ok(seed) = std::env::var("HEXFOG_SEED") {
        config.grid.seed = Some(seed.parse()?);
    }

    info!(
        "Starting Hexfog simulation on a {}x{} grid...",
        config.grid.width, config.grid.height
    );

    let report = driver::run(config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
