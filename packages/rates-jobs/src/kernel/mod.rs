//! Kernel module - job infrastructure and dependencies.

pub mod deps;
pub mod mongo_store;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{DirectoryAdapter, JobDeps};
pub use mongo_store::MongoRateStore;
pub use scheduled_tasks::start_scheduler;
pub use test_dependencies::{InMemoryRateStore, MockDirectory, TestDependencies};
pub use traits::*;
