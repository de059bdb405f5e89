//! SM-2 Variant - the scheduling recurrences
//!
//! Pure numeric functions behind the scheduling engine. The classic SM-2
//! ease recurrence (SuperMemo, 1987) is kept intact; intervals come from a
//! fixed six-step base-day ladder scaled by ease and a per-item difficulty
//! adjustment, capped at one year.
//!
//! ## Core recurrence
//!
//! `ease' = clip(ease + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), 1.3, 10.0)`
//!
//! where `q` is the 0-5 recall score. `q < 3` resets the interval ladder,
//! `q >= 4` advances it one step.

use crate::practice::{IntervalLevel, MASTERY_MAX, MASTERY_MIN, PROFICIENT_MASTERY};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Floor of the ease factor (classic SM-2 value)
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ceiling of the ease factor
pub const MAX_EASE_FACTOR: f64 = 10.0;

/// Ease assigned to a brand-new plan
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Hard cap on any computed interval, in days
pub const MAX_INTERVAL_DAYS: f64 = 365.0;

/// Lowest accepted recall score
pub const MIN_SCORE: i32 = 0;

/// Highest accepted recall score
pub const MAX_SCORE: i32 = 5;

/// A score at or above this counts as a success (advances level and streak)
pub const SUCCESS_SCORE: i32 = 4;

/// A score below this resets the interval ladder
pub const LAPSE_SCORE: i32 = 3;

/// Leniency multiplier applied to the difficulty adjustment on each deferral
pub const DEFERRAL_LENIENCY: f64 = 0.95;

/// Floor of the per-item difficulty adjustment
pub const MIN_DIFFICULTY_ADJUSTMENT: f64 = 0.5;

/// Ceiling of the per-item difficulty adjustment
pub const MAX_DIFFICULTY_ADJUSTMENT: f64 = 2.0;

/// A review count above this, paired with a passing score, earns a mastery
/// bonus (the learner has demonstrated sustained engagement)
pub const MASTERY_BONUS_REVIEWS: i32 = 5;

// ============================================================================
// RECURRENCES
// ============================================================================

/// Whether a caller-supplied score is inside the accepted 0-5 range
pub fn is_valid_score(score: i32) -> bool {
    (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// Next ease factor from the SM-2 recurrence, clipped to [1.3, 10.0].
///
/// Assumes a validated score.
pub fn next_ease_factor(ease: f64, score: i32) -> f64 {
    let q = score as f64;
    let adjustment = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    (ease + adjustment).clamp(MIN_EASE_FACTOR, MAX_EASE_FACTOR)
}

/// Next ladder step: reset on a lapse, advance one on a success,
/// otherwise unchanged.
pub fn next_level(level: IntervalLevel, score: i32) -> IntervalLevel {
    if score < LAPSE_SCORE {
        IntervalLevel::First
    } else if score >= SUCCESS_SCORE {
        level.advanced()
    } else {
        level
    }
}

/// Interval in days for a step after ease and difficulty scaling,
/// capped at [`MAX_INTERVAL_DAYS`].
pub fn interval_days(level: IntervalLevel, ease: f64, difficulty_adjustment: f64) -> f64 {
    (level.base_days() * ease * difficulty_adjustment).min(MAX_INTERVAL_DAYS)
}

/// New mastery after one review, clamped to [0, 5].
///
/// Score-keyed delta: 5 -> +1, 4 -> +1 while below proficient, 3 -> 0,
/// 2 -> -1, 0-1 -> -2. An extra +1 applies once the item has more than
/// [`MASTERY_BONUS_REVIEWS`] completed reviews and the score passes.
/// `total_reviews` is the count including the review being folded in.
pub fn mastery_shift(mastery: i32, score: i32, total_reviews: i32) -> i32 {
    let delta = match score {
        5 => 1,
        4 => {
            if mastery < PROFICIENT_MASTERY {
                1
            } else {
                0
            }
        }
        3 => 0,
        2 => -1,
        _ => -2,
    };

    let bonus = if total_reviews > MASTERY_BONUS_REVIEWS && score >= LAPSE_SCORE {
        1
    } else {
        0
    };

    (mastery + delta + bonus).clamp(MASTERY_MIN, MASTERY_MAX)
}

/// Incremental running mean: fold `score` into a mean over `prev_count`
/// samples.
pub fn running_mean(prev_mean: f64, prev_count: i32, score: i32) -> f64 {
    let count = prev_count + 1;
    (prev_mean * prev_count as f64 + score as f64) / count as f64
}

// ============================================================================
// TESTS
// ============================================================================
