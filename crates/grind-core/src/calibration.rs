//! Difficulty Calibrator
//!
//! Batch job re-weighting per-category difficulty multipliers from
//! historical accuracy. A category whose completed reviews average high
//! gets slightly longer intervals (x1.05), one averaging low gets slightly
//! shorter ones (x0.95); everything in between is left alone.
//!
//! Deliberately non-idempotent: each run compounds the multiplier onto
//! every pending plan in the category. The adjustment is clamped to
//! [0.5, 2.0] so repeated runs cannot drift without bound.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::sm2::{MAX_DIFFICULTY_ADJUSTMENT, MIN_DIFFICULTY_ADJUSTMENT};
use crate::storage::{PracticeStore, Result, WriteBatch};

/// Minimum completed reviews a category needs before its signal counts
pub const MIN_CATEGORY_SAMPLES: usize = 3;

/// Mean score at or above which a category is considered strong
pub const STRONG_CATEGORY_MEAN: f64 = 4.0;

/// Mean score at or below which a category is considered weak
pub const WEAK_CATEGORY_MEAN: f64 = 2.0;

/// Multiplier for strong categories (longer intervals)
pub const STRONG_MULTIPLIER: f64 = 1.05;

/// Multiplier for weak categories (shorter intervals)
pub const WEAK_MULTIPLIER: f64 = 0.95;

/// What one calibration run touched
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationReport {
    /// Categories whose multiplier was not 1.0
    pub categories_adjusted: usize,
    /// Pending plans whose adjustment changed
    pub plans_updated: usize,
}

/// Multiplier for one category's mean completed score
fn category_multiplier(mean_score: f64) -> f64 {
    if mean_score >= STRONG_CATEGORY_MEAN {
        STRONG_MULTIPLIER
    } else if mean_score <= WEAK_CATEGORY_MEAN {
        WEAK_MULTIPLIER
    } else {
        1.0
    }
}

/// Re-weight pending plans' difficulty adjustments from per-category
/// accuracy. All updates of one run commit as a single transaction.
pub fn calibrate_difficulty(store: &PracticeStore) -> Result<CalibrationReport> {
    // BTreeMap keeps category iteration order stable across runs
    let mut scores_by_category: BTreeMap<String, Vec<i32>> = BTreeMap::new();
    for (category, score) in store.completed_plan_scores()? {
        scores_by_category.entry(category).or_default().push(score);
    }

    let mut report = CalibrationReport::default();
    let mut batch = WriteBatch::new();

    for (category, scores) in &scores_by_category {
        if scores.len() < MIN_CATEGORY_SAMPLES {
            tracing::debug!(category, samples = scores.len(), "insufficient signal, skipped");
            continue;
        }

        let mean = scores.iter().sum::<i32>() as f64 / scores.len() as f64;
        let multiplier = category_multiplier(mean);
        if multiplier == 1.0 {
            continue;
        }

        report.categories_adjusted += 1;
        for mut plan in store.pending_plans_in_category(category)? {
            plan.difficulty_adjustment = (plan.difficulty_adjustment * multiplier)
                .clamp(MIN_DIFFICULTY_ADJUSTMENT, MAX_DIFFICULTY_ADJUSTMENT);
            batch = batch.put_plan(plan);
            report.plans_updated += 1;
        }

        tracing::info!(category, mean, multiplier, "category recalibrated");
    }

    store.commit(batch)?;
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================
