// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Classification and cycle orchestration live in domains/rates and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseDirectory, BaseRateStore)

use async_trait::async_trait;
use directory_client::DirectoryError;
use serde_json::Value;
use thiserror::Error;

use crate::domains::rates::{BatchSummary, UpsertOp};

// =============================================================================
// Directory Trait (Infrastructure - participant directory)
// =============================================================================

#[async_trait]
pub trait BaseDirectory: Send + Sync {
    /// Fetch the full participant set as raw JSON objects
    async fn fetch_participants(&self) -> Result<Vec<Value>, DirectoryError>;
}

// =============================================================================
// Rate Store Trait (Infrastructure - document store)
// =============================================================================

/// Errors raised by a rate store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver-level failure (connection, timeout, command error)
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Payload could not be converted to a stored document
    #[error("encoding error: {0}")]
    Encode(String),

    /// Batch was acknowledged but one or more operations failed
    #[error("batch rejected by {collection}: {message}")]
    Rejected { collection: String, message: String },
}

#[async_trait]
pub trait BaseRateStore: Send + Sync {
    /// Apply every upsert in one batch. An empty batch must not touch the store.
    async fn bulk_upsert(
        &self,
        collection: &str,
        ops: &[UpsertOp],
    ) -> Result<BatchSummary, StoreError>;

    /// Read every document of a collection as JSON
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError>;
}
