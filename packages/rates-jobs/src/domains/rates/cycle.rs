//! One fetch → classify → write cycle.
//!
//! Every failure is caught here, logged once at ERROR and recorded in the
//! returned [`CycleReport`]. Nothing is retried; the next scheduled cycle is
//! the retry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::classifier::classify;
use super::error::CycleError;
use super::models::{BatchSummary, ProductFamily};
use super::writer::write_partition;
use crate::kernel::JobDeps;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Every attempted batch was written
    Success,
    /// At least one family batch failed
    PartialFailure,
    /// Fetch or classification failed; nothing was written
    Failure,
}

/// Result of writing one family's batch.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub family: ProductFamily,
    pub collection: String,
    pub records: usize,
    /// `None` when the partition was empty or the batch failed
    pub summary: Option<BatchSummary>,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub participants: usize,
    pub families: Vec<FamilyReport>,
    pub errors: Vec<CycleError>,
}

impl CycleReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            outcome: CycleOutcome::Failure,
            started_at,
            finished_at: started_at,
            participants: 0,
            families: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn fail(mut self, err: CycleError) -> Self {
        error!(
            timestamp = %Utc::now(),
            kind = err.kind(),
            error = %err,
            "Rates cycle failed"
        );
        self.errors.push(err);
        self.outcome = CycleOutcome::Failure;
        self.finished_at = Utc::now();
        self
    }

    pub fn family(&self, family: ProductFamily) -> Option<&FamilyReport> {
        self.families.iter().find(|f| f.family == family)
    }
}

/// Run one ingestion cycle. Never returns an error; see [`CycleReport`].
pub async fn run_cycle(deps: &JobDeps) -> CycleReport {
    let mut report = CycleReport::new(Utc::now());
    info!("Rates cycle started");

    let participants = match deps.directory.fetch_participants().await {
        Ok(participants) => participants,
        Err(e) => return report.fail(CycleError::from(e)),
    };

    report.participants = participants.len();

    let classified = match classify(&participants) {
        Ok(classified) => classified,
        Err(e) => return report.fail(CycleError::from(e)),
    };
    info!(
        participants = participants.len(),
        loans = classified.loans.len(),
        financings = classified.financings.len(),
        "Participants classified"
    );

    // Families are written independently: a failed loans batch does not stop financings.
    for family in ProductFamily::ALL {
        let collection = deps.collection_for(family);
        let records = classified.family(family);

        let mut family_report = FamilyReport {
            family,
            collection: collection.clone(),
            records: records.len(),
            summary: None,
            error: None,
        };

        match write_partition(deps.store.as_ref(), family, &collection, records).await {
            Ok(summary) => family_report.summary = summary,
            Err(source) => {
                let err = CycleError::Write {
                    family,
                    collection,
                    source,
                };
                error!(
                    timestamp = %Utc::now(),
                    kind = err.kind(),
                    error = %err,
                    "Rates batch write failed"
                );
                family_report.error = Some(err.to_string());
                report.errors.push(err);
            }
        }

        report.families.push(family_report);
    }

    report.finished_at = Utc::now();
    if report.errors.is_empty() {
        report.outcome = CycleOutcome::Success;
        info!(
            timestamp = %report.finished_at,
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Rates cycle succeeded"
        );
    } else {
        report.outcome = CycleOutcome::PartialFailure;
        warn!(
            failed_batches = report.errors.len(),
            "Rates cycle finished with failed batches"
        );
    }

    report
}
