// OpenGo rates jobs - core library
//
// Daily ingestion of loans and financings API resources from the Open Finance
// participant directory into MongoDB, plus the flattened rate report the
// dashboard reads back.

pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
