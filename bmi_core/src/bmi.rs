//! BMI computation.
//!
//! Pure functions mapping (height, weight) to a BMI value and category.
//! Inputs are validated at the boundary (see `validate`); everything here
//! assumes strictly positive finite values and has no error path.

use crate::types::{BmiCategory, BmiReading};

/// Round to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to 1 decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Classify a BMI value
///
/// Thresholds are inclusive on the lower bound, exclusive on the upper bound,
/// first match wins: < 18.5 Underweight, < 25 Normal, < 30 Overweight,
/// otherwise Obese.
pub fn categorize(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Compute BMI from height (meters) and weight (kilograms)
///
/// The category is derived from the rounded value, so a stored `bmi` and its
/// `category` can never disagree.
pub fn compute(height: f64, weight: f64) -> BmiReading {
    let bmi = round2(weight / (height * height));
    BmiReading {
        bmi,
        category: categorize(bmi),
    }
}
