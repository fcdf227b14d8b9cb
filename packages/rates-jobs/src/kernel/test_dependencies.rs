// TestDependencies - mock implementations for testing
//
// Provides in-memory doubles for the directory and the rate store that can be
// injected into JobDeps for tests.

use async_trait::async_trait;
use directory_client::{parse_participants, DirectoryError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use super::{BaseDirectory, BaseRateStore, JobDeps, StoreError};
use crate::domains::rates::{BatchSummary, StoredDocument, UpsertOp};

// =============================================================================
// Mock Directory
// =============================================================================

/// Canned directory response
#[derive(Debug, Clone)]
pub enum DirectoryResponse {
    Participants(Vec<Value>),
    /// Raw body, parsed the same way the real client parses it
    Body(String),
    /// Non-2xx HTTP status
    Status(u16),
}

pub struct MockDirectory {
    responses: Arc<Mutex<Vec<DirectoryResponse>>>,
    calls: Arc<Mutex<usize>>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a participants response. The last queued response repeats.
    pub fn with_participants(self, participants: Vec<Value>) -> Self {
        self.push(DirectoryResponse::Participants(participants));
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.push(DirectoryResponse::Body(body.to_string()));
        self
    }

    pub fn with_status(self, status: u16) -> Self {
        self.push(DirectoryResponse::Status(status));
        self
    }

    pub fn push(&self, response: DirectoryResponse) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BaseDirectory for MockDirectory {
    async fn fetch_participants(&self) -> Result<Vec<Value>, DirectoryError> {
        *self.calls.lock().unwrap() += 1;

        let response = {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses
                    .first()
                    .cloned()
                    .unwrap_or(DirectoryResponse::Participants(Vec::new()))
            }
        };

        match response {
            DirectoryResponse::Participants(participants) => Ok(participants),
            DirectoryResponse::Body(body) => parse_participants(&body),
            DirectoryResponse::Status(status) => Err(DirectoryError::Status {
                status,
                message: "mock directory error".to_string(),
            }),
        }
    }
}

// =============================================================================
// In-memory Rate Store
// =============================================================================

/// Rate store with upsert semantics matching the MongoDB store.
#[derive(Default)]
pub struct InMemoryRateStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
    batch_calls: Mutex<Vec<(String, usize)>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every batch against `collection` fail.
    pub fn fail_collection(&self, collection: &str) {
        self.failing.lock().unwrap().insert(collection.to_string());
    }

    /// Insert a document directly, bypassing batch bookkeeping.
    pub fn seed(&self, collection: &str, organisation_id: &str, data: Value) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                organisation_id: organisation_id.to_string(),
                data,
            });
    }

    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// (collection, op count) for every batch that reached the store
    pub fn batch_calls(&self) -> Vec<(String, usize)> {
        self.batch_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseRateStore for InMemoryRateStore {
    async fn bulk_upsert(
        &self,
        collection: &str,
        ops: &[UpsertOp],
    ) -> Result<BatchSummary, StoreError> {
        if ops.is_empty() {
            return Ok(BatchSummary::default());
        }

        self.batch_calls
            .lock()
            .unwrap()
            .push((collection.to_string(), ops.len()));

        if self.failing.lock().unwrap().contains(collection) {
            return Err(StoreError::Rejected {
                collection: collection.to_string(),
                message: "injected failure".to_string(),
            });
        }

        let mut collections = self.collections.lock().unwrap();
        let documents = collections.entry(collection.to_string()).or_default();
        let mut summary = BatchSummary::default();

        for op in ops {
            match documents
                .iter_mut()
                .find(|d| d.organisation_id == op.organisation_id)
            {
                Some(existing) => {
                    summary.matched += 1;
                    if existing.data != op.data {
                        existing.data = op.data.clone();
                        summary.modified += 1;
                    }
                }
                None => {
                    documents.push(StoredDocument {
                        organisation_id: op.organisation_id.clone(),
                        data: op.data.clone(),
                    });
                    summary.upserted += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        self.documents(collection)
            .into_iter()
            .map(|d| serde_json::to_value(d).map_err(|e| StoreError::Encode(e.to_string())))
            .collect()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Doubles plus the JobDeps wired to them
pub struct TestDependencies {
    pub directory: Arc<MockDirectory>,
    pub store: Arc<InMemoryRateStore>,
    pub environment: String,
}

impl TestDependencies {
    pub fn new(directory: MockDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
            store: Arc::new(InMemoryRateStore::new()),
            environment: "test".to_string(),
        }
    }

    pub fn deps(&self) -> JobDeps {
        JobDeps::new(
            self.directory.clone(),
            self.store.clone(),
            self.environment.clone(),
        )
    }
}
