//! Highlight ranking

use crate::model::Highlight;

/// Maximum number of highlights surfaced by one analysis run
pub const MAX_HIGHLIGHTS: usize = 5;

/// Order by descending |paceChange| and keep the top `MAX_HIGHLIGHTS`
///
/// Highlights without a pace change rank as magnitude 0. The sort is stable,
/// so equal magnitudes keep detection order.
pub fn rank(mut highlights: Vec<Highlight>) -> Vec<Highlight> {
    highlights.sort_by(|a, b| b.pace_magnitude().total_cmp(&a.pace_magnitude()));
    highlights.truncate(MAX_HIGHLIGHTS);
    highlights
}
