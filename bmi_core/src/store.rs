//! Calculation store abstraction.
//!
//! The core consumes a `CalculationStore` capability: a single durable insert
//! and a single point-in-time snapshot read per operation. History ordering,
//! summary statistics, category counts and the time series are all derived
//! from one snapshot, so they always agree on the visible record set.
//!
//! `FileStore` is the production implementation: a JSONL live log for fresh
//! inserts plus a CSV archive produced by rollup, merged on read with
//! deduplication by record id.

use crate::types::{BmiCategory, Calculation, DateRange, NewCalculation};
use crate::wal::{CalculationSink, JsonlSink};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Record-store capability consumed by the core operations
pub trait CalculationStore {
    /// Insert a new calculation, assigning its id and timestamps
    ///
    /// A single insert is atomic; concurrent inserts are independent appends.
    fn insert(&mut self, new: NewCalculation) -> Result<Calculation>;

    /// One consistent read of the owner's records within the date range
    ///
    /// The relative order of returned records is unspecified but stable for
    /// the lifetime of the returned Vec.
    fn snapshot(&self, owner_id: Uuid, range: &DateRange) -> Result<Vec<Calculation>>;
}

/// CSV row format for reading archived calculations
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    owner_id: String,
    height: f64,
    weight: f64,
    bmi: f64,
    category: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CsvRow> for Calculation {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;
        let owner_id = Uuid::parse_str(&row.owner_id)
            .map_err(|e| Error::Other(format!("Invalid UUID: {}", e)))?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|e| Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(Calculation {
            id,
            owner_id,
            height: row.height,
            weight: row.weight,
            bmi: row.bmi,
            category: parse_category(&row.category)?,
            created_at,
            updated_at,
        })
    }
}

/// Parse a category label from the archive
fn parse_category(s: &str) -> Result<BmiCategory> {
    match s.to_lowercase().as_str() {
        "underweight" => Ok(BmiCategory::Underweight),
        "normal" => Ok(BmiCategory::Normal),
        "overweight" => Ok(BmiCategory::Overweight),
        "obese" => Ok(BmiCategory::Obese),
        other => Err(Error::Other(format!("Unknown category: {}", other))),
    }
}

/// File-backed calculation store: JSONL live log plus CSV archive
pub struct FileStore {
    wal_path: PathBuf,
    csv_path: PathBuf,
}

impl FileStore {
    /// Create a store over explicit log and archive paths
    pub fn new(wal_path: impl Into<PathBuf>, csv_path: impl Into<PathBuf>) -> Self {
        Self {
            wal_path: wal_path.into(),
            csv_path: csv_path.into(),
        }
    }

    /// Open the store under a data directory, creating the layout as needed
    ///
    /// Layout: `<data_dir>/wal/calculations.wal` (live log) and
    /// `<data_dir>/calculations.csv` (archive).
    pub fn open(data_dir: &Path) -> Result<Self> {
        let wal_dir = data_dir.join("wal");
        std::fs::create_dir_all(&wal_dir)?;
        Ok(Self::new(
            wal_dir.join("calculations.wal"),
            data_dir.join("calculations.csv"),
        ))
    }

    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

impl CalculationStore for FileStore {
    fn insert(&mut self, new: NewCalculation) -> Result<Calculation> {
        let now = Utc::now();
        let calculation = Calculation {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            height: new.height,
            weight: new.weight,
            bmi: new.bmi,
            category: new.category,
            created_at: now,
            updated_at: now,
        };

        let mut sink = JsonlSink::new(&self.wal_path);
        sink.append(&calculation)?;

        Ok(calculation)
    }

    fn snapshot(&self, owner_id: Uuid, range: &DateRange) -> Result<Vec<Calculation>> {
        let mut records = Vec::new();
        let mut seen_ids = HashSet::new();

        // Load from the live log first (most recent)
        if self.wal_path.exists() {
            for record in crate::wal::read_calculations(&self.wal_path)? {
                if record.owner_id == owner_id && range.contains(record.created_at) {
                    seen_ids.insert(record.id);
                    records.push(record);
                }
            }
            tracing::debug!("Snapshot: {} records from live log", records.len());
        }

        // Load from the CSV archive, skipping anything already seen
        // (a record sits in both files between the rollup's CSV write and
        // its log rename)
        if self.csv_path.exists() {
            let mut csv_count = 0;
            for record in load_from_csv(&self.csv_path)? {
                if record.owner_id == owner_id
                    && range.contains(record.created_at)
                    && !seen_ids.contains(&record.id)
                {
                    seen_ids.insert(record.id);
                    records.push(record);
                    csv_count += 1;
                }
            }
            tracing::debug!("Snapshot: {} records from archive", csv_count);
        }

        Ok(records)
    }
}

/// Load all calculations from a CSV archive
fn load_from_csv(path: &Path) -> Result<Vec<Calculation>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match Calculation::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(records)
}
