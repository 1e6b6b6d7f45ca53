//! Calculation recording.
//!
//! Glue between the pure calculator and the store: compute the reading,
//! persist it under the owner's id, hand the reading back to the caller.

use crate::bmi;
use crate::store::CalculationStore;
use crate::types::{AuthenticatedUser, BmiReading, NewCalculation};
use crate::Result;

/// Compute a BMI reading and append it to the store as a new record
///
/// Inputs must already be validated (see `validate::measurement`). Every
/// invocation creates a distinct record; identical measurements are not
/// deduplicated. A store failure is surfaced unchanged.
pub fn record_calculation<S: CalculationStore>(
    store: &mut S,
    user: &AuthenticatedUser,
    height: f64,
    weight: f64,
) -> Result<BmiReading> {
    let reading = bmi::compute(height, weight);

    let stored = store.insert(NewCalculation {
        owner_id: user.id,
        height,
        weight,
        bmi: reading.bmi,
        category: reading.category,
    })?;

    tracing::info!(
        "Recorded calculation {} for {}: bmi {} ({})",
        stored.id,
        user.email,
        stored.bmi,
        stored.category
    );

    Ok(reading)
}
