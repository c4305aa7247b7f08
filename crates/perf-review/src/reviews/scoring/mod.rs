//! Pure scoring helpers evaluated against whatever criteria snapshot the caller holds.
//!
//! Nothing here errors: empty or malformed input degrades to zero scores and the
//! bottom band.

mod bands;

pub use bands::{alert_band, grade_band, grade_for, AlertBand, Grade, GradeBand};

use serde::{Deserialize, Serialize};

use super::domain::Criterion;

/// Weighted overall score on the 0-5 scale, rounded half-up to one decimal.
///
/// Weights are used as given. A review whose weights do not add up to 100 is
/// scored with the same direct formula, which keeps previously stored scores
/// reproducible.
pub fn overall_score(criteria: &[Criterion]) -> f64 {
    let total_weight: f64 = criteria.iter().map(|criterion| criterion.weight).sum();
    if criteria.is_empty() || total_weight == 0.0 || !total_weight.is_finite() {
        return 0.0;
    }

    // Exact for half-step scores and whole weights; divide only when rounding.
    let weighted_points: f64 = criteria
        .iter()
        .map(|criterion| criterion.score() * criterion.weight)
        .sum();

    if weighted_points.is_finite() {
        round_points(weighted_points)
    } else {
        0.0
    }
}

/// Progress of scoring across a review's criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

impl Completion {
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

pub fn completion(criteria: &[Criterion]) -> Completion {
    let total = criteria.len();
    let completed = criteria
        .iter()
        .filter(|criterion| criterion.is_complete())
        .count();
    let percentage = if total == 0 {
        0
    } else {
        (100.0 * completed as f64 / total as f64).round() as u8
    };

    Completion {
        completed,
        total,
        percentage,
    }
}

/// Converts score-times-weight points (0-500) to the 0-5 scale, rounding
/// half-up to one decimal. Non-negative inputs only.
pub(crate) fn round_points(points: f64) -> f64 {
    (points / 10.0).round() / 10.0
}
