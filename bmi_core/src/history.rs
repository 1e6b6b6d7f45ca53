//! History queries over a user's calculations.
//!
//! Returns the owner's records newest first, optionally bounded by an
//! inclusive date range, capped after filtering.

use crate::store::CalculationStore;
use crate::types::{AuthenticatedUser, Calculation, DateRange};
use crate::Result;

/// Result cap applied when the caller does not supply one
pub const DEFAULT_LIMIT: usize = 20;

/// Parameters of a history query
#[derive(Clone, Copy, Debug)]
pub struct HistoryRequest {
    pub limit: usize,
    pub range: DateRange,
}

impl Default for HistoryRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            range: DateRange::default(),
        }
    }
}

/// Fetch the user's calculations, ordered by creation time descending
///
/// The cap applies after date filtering: a small limit inside a wide range
/// drops the oldest in-range records. Records sharing a timestamp keep their
/// snapshot order (the sort is stable). An empty result is a value, not an
/// error.
pub fn fetch_history<S: CalculationStore>(
    store: &S,
    user: &AuthenticatedUser,
    request: &HistoryRequest,
) -> Result<Vec<Calculation>> {
    let mut records = store.snapshot(user.id, &request.range)?;

    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(request.limit);

    tracing::debug!("History: {} records for {}", records.len(), user.email);
    Ok(records)
}
