use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::domains::rates::ProductFamily;

pub const DEFAULT_ENVIRONMENT: &str = "sandbox";

/// Daily at 03:00 UTC (sec min hour day month weekday).
pub const DEFAULT_CRON: &str = "0 0 3 * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub mongo_uri: String,
    pub database_name: String,
    /// Prefix for collection names, e.g. `sandbox` → `sandbox.loans.rates`
    pub environment: String,
    pub participants_api_uri: String,
    pub participants_api_timeout: Duration,
    pub cron: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            mongo_uri: env::var("MONGO_URI").context("MONGO_URI must be set")?,
            database_name: env::var("DATABASE_NAME").context("DATABASE_NAME must be set")?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string()),
            participants_api_uri: env::var("PARTICIPANTS_API_URI")
                .unwrap_or_else(|_| directory_client::SANDBOX_PARTICIPANTS_URL.to_string()),
            participants_api_timeout: Duration::from_secs(
                env::var("PARTICIPANTS_API_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("PARTICIPANTS_API_TIMEOUT_SECS must be a valid number")?,
            ),
            cron: env::var("RATES_JOB_CRON").unwrap_or_else(|_| DEFAULT_CRON.to_string()),
        })
    }

    /// Destination collection for a product family.
    pub fn collection_for(&self, family: ProductFamily) -> String {
        family.collection_name(&self.environment)
    }
}
