//! Failure taxonomy for one ingestion cycle.

use directory_client::{DirectoryError, ShapeError};
use thiserror::Error;

use super::models::ProductFamily;
use crate::kernel::StoreError;

#[derive(Debug, Error)]
pub enum CycleError {
    /// Network or HTTP-status failure while fetching the directory
    #[error("transport error while fetching participants: {0}")]
    Transport(#[source] DirectoryError),

    /// Fetch succeeded but the body was not the expected JSON
    #[error("malformed participants response: {0}")]
    MalformedResponse(#[source] DirectoryError),

    /// Unexpected shape while walking the participant tree
    #[error("classification failed: {0}")]
    Classification(#[from] ShapeError),

    /// The store rejected or could not complete a family batch
    #[error("writing {family} batch to {collection} failed: {source}")]
    Write {
        family: ProductFamily,
        collection: String,
        #[source]
        source: StoreError,
    },
}

impl From<DirectoryError> for CycleError {
    fn from(err: DirectoryError) -> Self {
        if err.is_transport() {
            CycleError::Transport(err)
        } else {
            CycleError::MalformedResponse(err)
        }
    }
}

impl CycleError {
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::Transport(_) => "transport",
            CycleError::MalformedResponse(_) => "malformed_response",
            CycleError::Classification(_) => "classification",
            CycleError::Write { .. } => "write",
        }
    }
}
