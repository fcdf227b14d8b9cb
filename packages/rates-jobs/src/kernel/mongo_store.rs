//! MongoDB-backed rate store.
//!
//! A family batch is sent as a single `update` command carrying every upsert,
//! so the whole batch costs one round-trip and yields one outcome. MongoDB
//! acknowledges such a command with `ok: 1` even when individual statements
//! fail, so `writeErrors` and `writeConcernError` are checked explicitly.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Database};
use serde_json::Value;
use tracing::debug;

use crate::domains::rates::{BatchSummary, UpsertOp};
use crate::kernel::{BaseRateStore, StoreError};

pub struct MongoRateStore {
    db: Database,
}

impl MongoRateStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect and select `database`. The driver connects lazily; call
    /// [`MongoRateStore::ping`] to verify the server is reachable.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(database)))
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

/// Build the `update` command for one batch of upserts.
pub fn update_command(collection: &str, ops: &[UpsertOp]) -> Result<Document, StoreError> {
    let updates = ops
        .iter()
        .map(|op| {
            let data = bson::to_bson(&op.data).map_err(|e| {
                StoreError::Encode(format!("organisation {}: {}", op.organisation_id, e))
            })?;
            Ok(doc! {
                "q": { "organisationId": op.organisation_id.as_str() },
                "u": { "$set": { "data": data } },
                "upsert": true,
            })
        })
        .collect::<Result<Vec<Document>, StoreError>>()?;

    Ok(doc! {
        "update": collection,
        "updates": updates,
        "ordered": true,
    })
}

fn count(response: &Document, key: &str) -> u64 {
    match response.get(key) {
        Some(Bson::Int32(n)) => (*n).max(0) as u64,
        Some(Bson::Int64(n)) => (*n).max(0) as u64,
        Some(Bson::Double(n)) if *n > 0.0 => *n as u64,
        _ => 0,
    }
}

/// Interpret an `update` command response.
pub fn parse_update_response(
    collection: &str,
    response: &Document,
) -> Result<BatchSummary, StoreError> {
    if let Ok(errors) = response.get_array("writeErrors") {
        if !errors.is_empty() {
            let first = errors
                .first()
                .and_then(Bson::as_document)
                .and_then(|e| e.get_str("errmsg").ok())
                .unwrap_or("unknown write error");
            return Err(StoreError::Rejected {
                collection: collection.to_string(),
                message: format!("{} write error(s), first: {}", errors.len(), first),
            });
        }
    }

    if let Ok(concern) = response.get_document("writeConcernError") {
        return Err(StoreError::Rejected {
            collection: collection.to_string(),
            message: concern
                .get_str("errmsg")
                .unwrap_or("write concern error")
                .to_string(),
        });
    }

    let upserted = response
        .get_array("upserted")
        .map(|u| u.len() as u64)
        .unwrap_or(0);
    let total = count(response, "n");

    Ok(BatchSummary {
        matched: total.saturating_sub(upserted),
        modified: count(response, "nModified"),
        upserted,
    })
}

#[async_trait]
impl BaseRateStore for MongoRateStore {
    async fn bulk_upsert(
        &self,
        collection: &str,
        ops: &[UpsertOp],
    ) -> Result<BatchSummary, StoreError> {
        if ops.is_empty() {
            return Ok(BatchSummary::default());
        }

        let command = update_command(collection, ops)?;
        debug!(collection, ops = ops.len(), "Submitting upsert batch");
        let response = self.db.run_command(command).await?;

        parse_update_response(collection, &response)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let cursor = self.db.collection::<Document>(collection).find(doc! {}).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        Ok(documents
            .into_iter()
            .map(|d| Bson::Document(d).into_relaxed_extjson())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_command_shape() {
        let ops = vec![
            UpsertOp {
                organisation_id: "org-1".to_string(),
                data: json!({ "ApiFamilyType": "opendata-loans" }),
            },
            UpsertOp {
                organisation_id: "org-2".to_string(),
                data: json!({ "ApiFamilyType": "opendata-loans", "ApiVersion": "1.0.0" }),
            },
        ];

        let command = update_command("sandbox.loans.rates", &ops).unwrap();

        assert_eq!(command.get_str("update").unwrap(), "sandbox.loans.rates");
        assert!(command.get_bool("ordered").unwrap());

        let updates = command.get_array("updates").unwrap();
        assert_eq!(updates.len(), 2);

        let first = updates[0].as_document().unwrap();
        assert_eq!(
            first.get_document("q").unwrap(),
            &doc! { "organisationId": "org-1" }
        );
        assert!(first.get_bool("upsert").unwrap());
        let set = first
            .get_document("u")
            .unwrap()
            .get_document("$set")
            .unwrap();
        assert_eq!(
            set.get_document("data").unwrap(),
            &doc! { "ApiFamilyType": "opendata-loans" }
        );
    }

    #[test]
    fn test_parse_counts() {
        let response = doc! {
            "n": 3,
            "nModified": 1,
            "upserted": [ { "index": 2, "_id": "x" } ],
            "ok": 1.0,
        };

        let summary = parse_update_response("c", &response).unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                matched: 2,
                modified: 1,
                upserted: 1
            }
        );
    }

    #[test]
    fn test_parse_write_errors_fail_the_batch() {
        let response = doc! {
            "n": 1,
            "nModified": 0,
            "writeErrors": [ { "index": 1, "code": 11000, "errmsg": "E11000 duplicate key" } ],
            "ok": 1.0,
        };

        let err = parse_update_response("sandbox.loans.rates", &response).unwrap_err();
        match err {
            StoreError::Rejected {
                collection,
                message,
            } => {
                assert_eq!(collection, "sandbox.loans.rates");
                assert!(message.contains("E11000"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_write_concern_error() {
        let response = doc! {
            "n": 1,
            "writeConcernError": { "code": 64, "errmsg": "waiting for replication timed out" },
            "ok": 1.0,
        };

        assert!(matches!(
            parse_update_response("c", &response),
            Err(StoreError::Rejected { .. })
        ));
    }
}
