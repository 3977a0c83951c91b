//! Marketplace server binary

use market_core::{Config, Marketplace};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Curio Market Server");

    // Load configuration
    let config = Config::from_env()?;

    // Open marketplace
    let market = Marketplace::open(config)?;
    tracing::info!("Marketplace opened successfully");

    // TODO: serve the operation API and metrics endpoint here
    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down market server");
    market.shutdown().await?;
    Ok(())
}
