//! Turns classified records into idempotent upserts, one batch per family.

use tracing::info;

use super::models::{BatchSummary, ClassifiedRecord, ProductFamily, UpsertOp};
use crate::kernel::{BaseRateStore, StoreError};

pub fn upsert_ops(records: &[ClassifiedRecord]) -> Vec<UpsertOp> {
    records.iter().map(UpsertOp::from).collect()
}

/// Write one family's partition as a single batch.
///
/// Returns `Ok(None)` without contacting the store when `records` is empty.
/// Failures are not retried; the caller decides what a failed batch means.
pub async fn write_partition(
    store: &dyn BaseRateStore,
    family: ProductFamily,
    collection: &str,
    records: &[ClassifiedRecord],
) -> Result<Option<BatchSummary>, StoreError> {
    if records.is_empty() {
        return Ok(None);
    }

    let ops = upsert_ops(records);
    let summary = store.bulk_upsert(collection, &ops).await?;

    info!(
        family = %family,
        collection,
        ops = ops.len(),
        matched = summary.matched,
        modified = summary.modified,
        upserted = summary.upserted,
        "Upsert batch written"
    );

    Ok(Some(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::InMemoryRateStore;
    use serde_json::json;

    fn record(org: &str, version: &str) -> ClassifiedRecord {
        ClassifiedRecord {
            organisation_id: org.to_string(),
            family: ProductFamily::Loans,
            payload: json!({ "ApiVersion": version }),
        }
    }

    #[tokio::test]
    async fn test_empty_partition_skips_store() {
        let store = InMemoryRateStore::new();

        let result = write_partition(&store, ProductFamily::Loans, "test.loans.rates", &[])
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(store.batch_calls().is_empty());
    }

    #[tokio::test]
    async fn test_partition_is_one_batch() {
        let store = InMemoryRateStore::new();
        let records = vec![record("a", "1"), record("b", "1")];

        let summary = write_partition(&store, ProductFamily::Loans, "test.loans.rates", &records)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(summary.upserted, 2);
        assert_eq!(
            store.batch_calls(),
            vec![("test.loans.rates".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_rewrite_replaces_data() {
        let store = InMemoryRateStore::new();
        store.seed("test.loans.rates", "a", json!({ "ApiVersion": "0", "Stale": true }));

        let summary = write_partition(
            &store,
            ProductFamily::Loans,
            "test.loans.rates",
            &[record("a", "2")],
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(summary.matched, 1);
        assert_eq!(summary.modified, 1);
        let documents = store.documents("test.loans.rates");
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].data, json!({ "ApiVersion": "2" }));
    }
}
