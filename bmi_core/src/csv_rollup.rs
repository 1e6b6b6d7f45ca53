//! CSV rollup functionality for archiving logged calculations.
//!
//! This module implements atomic log-to-CSV conversion with proper error
//! handling to prevent data loss.

use crate::{Calculation, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
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

impl From<&Calculation> for CsvRow {
    fn from(calculation: &Calculation) -> Self {
        CsvRow {
            id: calculation.id.to_string(),
            owner_id: calculation.owner_id.to_string(),
            height: calculation.height,
            weight: calculation.weight,
            bmi: calculation.bmi,
            category: calculation.category.as_str().to_string(),
            created_at: calculation.created_at.to_rfc3339(),
            updated_at: calculation.updated_at.to_rfc3339(),
        }
    }
}

/// Roll up logged calculations into CSV and archive the log atomically
///
/// This function:
/// 1. Reads all calculations from the live log
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the log to .processed
/// 5. Returns the number of calculations processed
///
/// # Safety
/// - CSV is fsynced before the log is renamed
/// - The log is renamed (not deleted) to allow manual recovery if needed
/// - Processed log files can be cleaned up separately
pub fn wal_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    // Read all calculations from the live log
    let calculations = crate::wal::read_calculations(wal_path)?;

    if calculations.is_empty() {
        tracing::info!("No calculations in log to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open CSV file for appending
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Write headers only when the file is fresh
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for calculation in &calculations {
        let row = CsvRow::from(calculation);
        writer.serialize(row)?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} calculations to CSV", calculations.len());

    // Atomically archive the log by renaming it
    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived log to {:?}", processed_path);

    Ok(calculations.len())
}

/// Clean up old processed log files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed log: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed log files", count);
    }

    Ok(count)
}
