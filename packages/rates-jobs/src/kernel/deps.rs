//! Job dependencies (using traits for testability)
//!
//! This module provides the dependency container handed to the ingestion cycle.
//! External services sit behind trait objects so tests can swap in doubles.

use anyhow::{Context, Result};
use async_trait::async_trait;
use directory_client::{DirectoryClient, DirectoryError};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::domains::rates::ProductFamily;
use crate::kernel::{BaseDirectory, BaseRateStore, MongoRateStore};

// =============================================================================
// DirectoryClient Adapter (implements BaseDirectory trait)
// =============================================================================

/// Wrapper around DirectoryClient that implements BaseDirectory trait
pub struct DirectoryAdapter(pub Arc<DirectoryClient>);

impl DirectoryAdapter {
    pub fn new(client: Arc<DirectoryClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseDirectory for DirectoryAdapter {
    async fn fetch_participants(&self) -> Result<Vec<Value>, DirectoryError> {
        self.0.fetch_participants().await
    }
}

// =============================================================================
// JobDeps
// =============================================================================

/// Dependencies for one ingestion cycle
#[derive(Clone)]
pub struct JobDeps {
    pub directory: Arc<dyn BaseDirectory>,
    pub store: Arc<dyn BaseRateStore>,
    /// Collection-name prefix
    pub environment: String,
}

impl JobDeps {
    pub fn new(
        directory: Arc<dyn BaseDirectory>,
        store: Arc<dyn BaseRateStore>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            store,
            environment: environment.into(),
        }
    }

    /// Build production dependencies from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = DirectoryClient::with_timeout(
            config.participants_api_uri.clone(),
            config.participants_api_timeout,
        )
        .context("Failed to build directory HTTP client")?;
        tracing::info!(endpoint = %client.endpoint(), "Directory client configured");

        let store = MongoRateStore::connect(&config.mongo_uri, &config.database_name)
            .await
            .context("Failed to configure MongoDB client")?;
        store.ping().await.context("Failed to reach MongoDB")?;

        Ok(Self::new(
            Arc::new(DirectoryAdapter::new(Arc::new(client))),
            Arc::new(store),
            config.environment.clone(),
        ))
    }

    pub fn collection_for(&self, family: ProductFamily) -> String {
        family.collection_name(&self.environment)
    }
}
