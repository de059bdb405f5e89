//! Statistics Aggregator
//!
//! Rolls the completed reviews of one item into summary metrics. Pure
//! reader: nothing here mutates the store.

use serde::Serialize;

use crate::practice::{Item, PlanStatus};
use crate::storage::{PracticeStore, Result};

/// Summary metrics over an item's completed reviews
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    /// Count of completed reviews
    pub total_reviews: usize,
    /// Mean of completed review scores
    pub average_score: f64,
    /// Completed plans over all plans of the item
    pub completion_rate: f64,
    /// Mean of (scheduled_at - completed_at) in days over completed plans.
    ///
    /// Measures how timely reviews were relative to when they were due
    /// (negative = habitually late), NOT the spacing between reviews.
    pub average_interval_days: f64,
    /// Current consecutive-success run, from the item
    pub current_streak: i32,
    /// Best consecutive-success run ever, from the item
    pub longest_streak: i32,
}

/// Compute statistics for one item, or `None` when it has no completed
/// review yet (no data beats zeroed metrics).
pub fn review_statistics(store: &PracticeStore, item: &Item) -> Result<Option<ReviewStatistics>> {
    let plans = store.plans_for_item(&item.id)?;
    let completed: Vec<_> = plans
        .iter()
        .filter(|p| p.status == PlanStatus::Completed)
        .collect();

    if completed.is_empty() {
        return Ok(None);
    }

    let total = completed.len();

    // Each mean divides by the rows that actually carry the field: a
    // completed row missing its score or completed_at must not drag the
    // average toward zero
    let scores: Vec<i32> = completed.iter().filter_map(|p| p.score).collect();
    let average_score = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<i32>() as f64 / scores.len() as f64
    };

    let intervals: Vec<f64> = completed
        .iter()
        .filter_map(|p| {
            let completed_at = p.completed_at?;
            Some((p.scheduled_at - completed_at).num_seconds() as f64 / 86_400.0)
        })
        .collect();
    let average_interval_days = if intervals.is_empty() {
        0.0
    } else {
        intervals.iter().sum::<f64>() / intervals.len() as f64
    };

    Ok(Some(ReviewStatistics {
        total_reviews: total,
        average_score,
        completion_rate: total as f64 / plans.len() as f64,
        average_interval_days,
        current_streak: item.streak_count,
        longest_streak: item.longest_streak,
    }))
}

// ============================================================================
// TESTS
// ============================================================================
