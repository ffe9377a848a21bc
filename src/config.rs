// Copyright (c) Chirp Contributors
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Load demo users/posts/trending topics at startup.
    pub seed: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenv::dotenv();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()?,
                enable_cors: env::var("ENABLE_CORS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
            store: StoreConfig {
                seed: env::var("SEED_DEMO_DATA")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()?,
            },
        })
    }

    /// Parse configuration from the environment and install it process-wide.
    pub fn init() -> anyhow::Result<&'static Config> {
        let config = Config::from_env()?;
        Ok(CONFIG.get_or_init(|| config))
    }

    /// Get the installed configuration, falling back to defaults if `init`
    /// was never called (tests).
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| Config::from_env().expect("invalid configuration environment"))
    }
}
