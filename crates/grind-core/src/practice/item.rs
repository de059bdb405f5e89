//! Practice Item - the learned unit
//!
//! Carries the per-item aggregates the scheduler maintains on every
//! completed review: total count, running mean score, success streaks and
//! the 0-5 mastery score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sm2;

/// Lower bound of the mastery scale
pub const MASTERY_MIN: i32 = 0;
/// Upper bound of the mastery scale
pub const MASTERY_MAX: i32 = 5;
/// Mastery at or above this counts as proficient; a score of 4 no longer
/// raises mastery once reached
pub const PROFICIENT_MASTERY: i32 = 4;

/// A learned unit (one algorithm problem, technique or pattern)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Category tag used for difficulty calibration grouping
    pub category: String,
    /// Proficiency score, clamped to [0, 5]
    pub mastery: i32,
    /// Completed review count
    pub total_reviews: i32,
    /// Running mean of 0-5 scores
    pub average_score: f64,
    /// Consecutive-success counter (score >= 4)
    pub streak_count: i32,
    /// High-water mark of `streak_count`
    pub longest_streak: i32,
    /// When the item was last reviewed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_practiced_at: Option<DateTime<Utc>>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When the item was last modified
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create a new item with zeroed aggregates
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            category: category.into(),
            mastery: 0,
            total_reviews: 0,
            average_score: 0.0,
            streak_count: 0,
            longest_streak: 0,
            last_practiced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reset the review aggregates, as done when the first plan is created
    pub fn reset_progress(&mut self, now: DateTime<Utc>) {
        self.total_reviews = 0;
        self.average_score = 0.0;
        self.streak_count = 0;
        self.updated_at = now;
    }

    /// Fold one completed review into the aggregates.
    ///
    /// Assumes `score` has already been validated to [0, 5].
    pub fn record_review(&mut self, score: i32, now: DateTime<Utc>) {
        self.average_score = sm2::running_mean(self.average_score, self.total_reviews, score);
        self.total_reviews += 1;

        if score >= 4 {
            self.streak_count += 1;
            self.longest_streak = self.longest_streak.max(self.streak_count);
        } else {
            self.streak_count = 0;
        }

        self.mastery = sm2::mastery_shift(self.mastery, score, self.total_reviews);
        self.last_practiced_at = Some(now);
        self.updated_at = now;
    }
}
