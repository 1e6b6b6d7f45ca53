//! Statistics aggregation over a user's calculations.
//!
//! All three result groups (summary, category breakdown, time series) are
//! derived from ONE store snapshot per invocation, so concurrent writes can
//! never make them disagree on the visible record set.

use crate::bmi::{round1, round2};
use crate::store::CalculationStore;
use crate::types::{AuthenticatedUser, BmiCategory, Calculation, DateRange};
use crate::Result;
use serde::Serialize;

/// Maximum number of time-series points returned, oldest first
pub const TIME_SERIES_CAP: usize = 30;

/// Summary statistics over the filtered record set
///
/// `stddev_bmi` is the population standard deviation (divide by n), which is
/// defined for a single record (0.0). The deltas compare the newest record
/// against the second newest and are 0.0 with fewer than two records. An
/// empty record set yields the all-zero summary; that is a defined state,
/// not an error.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Summary {
    pub total_count: usize,
    pub avg_bmi: f64,
    pub avg_weight: f64,
    pub min_bmi: f64,
    pub max_bmi: f64,
    pub stddev_bmi: f64,
    pub bmi_delta: f64,
    pub weight_delta: f64,
}

/// Count and share of one category present in the record set
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CategoryBreakdown {
    pub category: BmiCategory,
    pub count: usize,
    /// count / total * 100, rounded to 1 decimal
    pub percentage: f64,
}

/// One time-series entry
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TimeSeriesPoint {
    /// UTC calendar date, YYYY-MM-DD
    pub date: String,
    pub bmi: f64,
    pub weight: f64,
    pub height: f64,
    pub category: BmiCategory,
}

/// Complete statistics response
#[derive(Clone, Debug, Default, Serialize)]
pub struct Statistics {
    pub summary: Summary,
    pub categories: Vec<CategoryBreakdown>,
    pub time_series: Vec<TimeSeriesPoint>,
}

/// Compute statistics for the user's records within the date range
pub fn compute_statistics<S: CalculationStore>(
    store: &S,
    user: &AuthenticatedUser,
    range: &DateRange,
) -> Result<Statistics> {
    let snapshot = store.snapshot(user.id, range)?;

    tracing::debug!(
        "Statistics over {} records for {}",
        snapshot.len(),
        user.email
    );

    Ok(Statistics {
        summary: summarize(&snapshot),
        categories: category_breakdown(&snapshot),
        time_series: time_series(&snapshot),
    })
}

/// Summary statistics over a snapshot
pub fn summarize(snapshot: &[Calculation]) -> Summary {
    if snapshot.is_empty() {
        return Summary::default();
    }

    let count = snapshot.len();
    let n = count as f64;

    let mut sum_bmi = 0.0;
    let mut sum_weight = 0.0;
    let mut min_bmi = f64::MAX;
    let mut max_bmi = f64::MIN;
    for record in snapshot {
        sum_bmi += record.bmi;
        sum_weight += record.weight;
        if record.bmi < min_bmi {
            min_bmi = record.bmi;
        }
        if record.bmi > max_bmi {
            max_bmi = record.bmi;
        }
    }

    let mean_bmi = sum_bmi / n;
    let variance = snapshot
        .iter()
        .map(|record| (record.bmi - mean_bmi).powi(2))
        .sum::<f64>()
        / n;

    // Newest-first view of the same snapshot for the deltas
    let mut newest_first: Vec<&Calculation> = snapshot.iter().collect();
    newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let (bmi_delta, weight_delta) = match (newest_first.first(), newest_first.get(1)) {
        (Some(newest), Some(previous)) => (
            round2(newest.bmi - previous.bmi),
            round2(newest.weight - previous.weight),
        ),
        _ => (0.0, 0.0),
    };

    Summary {
        total_count: count,
        avg_bmi: round2(mean_bmi),
        avg_weight: round2(sum_weight / n),
        min_bmi: round2(min_bmi),
        max_bmi: round2(max_bmi),
        stddev_bmi: round2(variance.sqrt()),
        bmi_delta,
        weight_delta,
    }
}

/// Count and percentage for each category present in the snapshot
///
/// Categories appear in ascending BMI order; each present category appears
/// exactly once and the counts sum to the snapshot size.
pub fn category_breakdown(snapshot: &[Calculation]) -> Vec<CategoryBreakdown> {
    if snapshot.is_empty() {
        return Vec::new();
    }

    let total = snapshot.len() as f64;
    let mut breakdown = Vec::new();
    for category in BmiCategory::ALL {
        let count = snapshot.iter().filter(|c| c.category == category).count();
        if count > 0 {
            breakdown.push(CategoryBreakdown {
                category,
                count,
                percentage: round1(count as f64 / total * 100.0),
            });
        }
    }
    breakdown
}

/// Oldest-first series of at most `TIME_SERIES_CAP` points
pub fn time_series(snapshot: &[Calculation]) -> Vec<TimeSeriesPoint> {
    let mut oldest_first: Vec<&Calculation> = snapshot.iter().collect();
    oldest_first.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    oldest_first.truncate(TIME_SERIES_CAP);

    oldest_first
        .into_iter()
        .map(|record| TimeSeriesPoint {
            date: record.created_at.date_naive().to_string(),
            bmi: round2(record.bmi),
            weight: round2(record.weight),
            height: round2(record.height),
            category: record.category,
        })
        .collect()
}
