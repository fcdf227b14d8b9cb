//! Loans and financings rates: directory classification, upsert writes,
//! the daily cycle, and the flattened rate report read back from the store.

pub mod classifier;
pub mod cycle;
pub mod error;
pub mod models;
pub mod report;
pub mod writer;

pub use classifier::classify;
pub use cycle::{run_cycle, CycleOutcome, CycleReport, FamilyReport};
pub use error::CycleError;
pub use models::{
    BatchSummary, Classified, ClassifiedRecord, ProductFamily, StoredDocument, UpsertOp,
};
pub use report::{flatten_documents, PersonType, RateFilter, RateRow};
pub use writer::write_partition;
