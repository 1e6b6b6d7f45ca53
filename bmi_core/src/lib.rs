#![forbid(unsafe_code)]

//! Core domain model and business logic for the Bmitrack BMI system.
//!
//! This crate provides:
//! - Domain types (calculations, categories, users, date ranges)
//! - The pure BMI calculator
//! - Persistence (append log, CSV archive, snapshot reads)
//! - History queries and statistics aggregation
//! - Boundary validation

pub mod types;
pub mod error;
pub mod bmi;
pub mod config;
pub mod logging;
pub mod wal;
pub mod csv_rollup;
pub mod store;
pub mod profile;
pub mod validate;
pub mod history;
pub mod stats;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use wal::{CalculationSink, JsonlSink};
pub use store::{CalculationStore, FileStore};
pub use profile::ProfileRegistry;
pub use history::{fetch_history, HistoryRequest};
pub use stats::{compute_statistics, Statistics};
pub use service::record_calculation;
