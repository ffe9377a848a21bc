// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirp::api;
use chirp::config::Config;
use chirp::store::{seed, DynStorage, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,chirp=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("initialized configuration");

    // Set up the storage backend
    let store = Arc::new(MemoryStore::new());
    if config.store.seed {
        seed::load_demo_data(store.as_ref()).await?;
    }
    let store: DynStorage = store;

    // Start the API server
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::serve(store).await {
            error!("API server error: {}", e);
        }
    });

    // Serve until interrupted
    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("failed to listen for shutdown signal: {}", e),
    }
    api_handle.abort();

    info!("chirp server shutdown complete");
    Ok(())
}
