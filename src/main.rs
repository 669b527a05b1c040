//! pinterest-dl server binary
//!
//! Thin shell around the library: load `.env`, install the tracing
//! subscriber, build the resolver from environment configuration and serve
//! the REST API until a termination signal arrives.

use pinterest_dl::{api, Config, PinResolver};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env file for local development
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let default_filter = if config.server.api.development {
        "info,pinterest_dl=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = if config.server.api.development {
            "development"
        } else {
            "production"
        },
        "starting pinterest-dl"
    );

    let resolver = Arc::new(PinResolver::new(&config)?);
    api::start_api_server(resolver, Arc::new(config)).await?;

    Ok(())
}
