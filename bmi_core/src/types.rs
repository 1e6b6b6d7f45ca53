//! Core domain types for the Bmitrack BMI system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Calculation records and their categories
//! - The authenticated user identity passed into every operation
//! - Inclusive calendar date ranges for history/statistics filters

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Category and Calculator Output Types
// ============================================================================

/// Weight category derived from a BMI value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// All categories in ascending BMI order
    pub const ALL: [BmiCategory; 4] = [
        BmiCategory::Underweight,
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of a BMI computation: the rounded value and its category
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct BmiReading {
    pub bmi: f64,
    pub category: BmiCategory,
}

// ============================================================================
// Calculation Record Types
// ============================================================================

/// A persisted BMI calculation
///
/// Records are immutable once written. `bmi` and `category` are derived from
/// `height`/`weight` at creation time and never recomputed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Calculation {
    pub id: Uuid,
    pub owner_id: Uuid,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    /// weight / height², rounded to 2 decimals
    pub bmi: f64,
    pub category: BmiCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for a new calculation; `id` and timestamps are store-assigned
#[derive(Clone, Debug)]
pub struct NewCalculation {
    pub owner_id: Uuid,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub category: BmiCategory,
}

// ============================================================================
// Identity and Filter Types
// ============================================================================

/// The caller's resolved identity
///
/// Identity resolution happens before any core operation runs; every read and
/// write is scoped to this user's `id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// Inclusive calendar date range (UTC), each boundary independently optional
///
/// A record matches when the UTC calendar date of its timestamp lies within
/// the bounds, i.e. `start 00:00:00.000` through `end 23:59:59.999`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Check whether a timestamp falls inside the range
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let date = at.date_naive();
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}
