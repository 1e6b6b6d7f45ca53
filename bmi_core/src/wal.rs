//! Append-only calculation log.
//!
//! Calculations are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access. A single append is atomic with respect
//! to other writers; malformed lines are skipped on read, never fatal.

use crate::{Calculation, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Calculation sink trait for persisting records
pub trait CalculationSink {
    fn append(&mut self, calculation: &Calculation) -> Result<()>;
}

/// JSONL-based calculation sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CalculationSink for JsonlSink {
    fn append(&mut self, calculation: &Calculation) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write calculation as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(calculation)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended calculation {} to log", calculation.id);
        Ok(())
    }
}

/// Read all calculations from a log file
pub fn read_calculations(path: &Path) -> Result<Vec<Calculation>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut calculations = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Calculation>(&line) {
            Ok(calculation) => calculations.push(calculation),
            Err(e) => {
                tracing::warn!("Failed to parse calculation at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} calculations from log", calculations.len());
    Ok(calculations)
}
