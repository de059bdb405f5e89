//! Review Plan - one scheduled recall attempt of a practice item
//!
//! A plan carries the per-attempt SM-2 state (ease factor, interval level,
//! difficulty adjustment) plus the outcome fields filled in on completion.
//! Status and interval level are closed enums so an invalid value can never
//! be persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sm2::INITIAL_EASE_FACTOR;

// ============================================================================
// PLAN STATUS
// ============================================================================

/// Lifecycle state of a review plan
///
/// Transitions: `Pending -> Completed` (complete), `Pending -> Pending`
/// (soft skip, same instance), `Pending -> Skipped` (hard skip, spawns a
/// sibling pending plan), `Pending -> Postponed` (same instance, mutated).
/// `Completed` and `Skipped` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Waiting to be reviewed
    #[default]
    Pending,
    /// Review finished with a recorded score
    Completed,
    /// Hard-skipped; a sibling pending plan was created
    Skipped,
    /// Deferred by a number of days, same instance reused
    Postponed,
}

impl PlanStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "pending",
            PlanStatus::Completed => "completed",
            PlanStatus::Skipped => "skipped",
            PlanStatus::Postponed => "postponed",
        }
    }

    /// Parse from string name; `None` for anything outside the closed set
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PlanStatus::Pending),
            "completed" => Some(PlanStatus::Completed),
            "skipped" => Some(PlanStatus::Skipped),
            "postponed" => Some(PlanStatus::Postponed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// INTERVAL LEVEL
// ============================================================================

/// Ordinal step in the fixed ladder of base day-counts
///
/// The ladder is `[1, 6, 14, 30, 90, 180]` days before ease/difficulty
/// scaling. A successful review (score >= 4) advances exactly one step,
/// capped at the last step; a low score (< 3) resets to the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IntervalLevel {
    #[default]
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl IntervalLevel {
    /// Base day-count for this step, before ease/difficulty scaling
    pub fn base_days(&self) -> f64 {
        match self {
            IntervalLevel::First => 1.0,
            IntervalLevel::Second => 6.0,
            IntervalLevel::Third => 14.0,
            IntervalLevel::Fourth => 30.0,
            IntervalLevel::Fifth => 90.0,
            IntervalLevel::Sixth => 180.0,
        }
    }

    /// Zero-based position in the ladder
    pub fn ordinal(&self) -> u8 {
        match self {
            IntervalLevel::First => 0,
            IntervalLevel::Second => 1,
            IntervalLevel::Third => 2,
            IntervalLevel::Fourth => 3,
            IntervalLevel::Fifth => 4,
            IntervalLevel::Sixth => 5,
        }
    }

    /// Step from a stored ordinal; `None` for anything outside the ladder
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(IntervalLevel::First),
            1 => Some(IntervalLevel::Second),
            2 => Some(IntervalLevel::Third),
            3 => Some(IntervalLevel::Fourth),
            4 => Some(IntervalLevel::Fifth),
            5 => Some(IntervalLevel::Sixth),
            _ => None,
        }
    }

    /// Next step up, saturating at the last defined step
    pub fn advanced(&self) -> Self {
        match self {
            IntervalLevel::First => IntervalLevel::Second,
            IntervalLevel::Second => IntervalLevel::Third,
            IntervalLevel::Third => IntervalLevel::Fourth,
            IntervalLevel::Fourth => IntervalLevel::Fifth,
            IntervalLevel::Fifth | IntervalLevel::Sixth => IntervalLevel::Sixth,
        }
    }

    /// Whether this is the last defined step
    pub fn is_max(&self) -> bool {
        matches!(self, IntervalLevel::Sixth)
    }
}

// ============================================================================
// CONFIDENCE
// ============================================================================

/// Learner-reported confidence recorded alongside a completed review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }

    /// Parse from string name; `None` for anything outside the closed set
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Confidence::Low),
            "medium" => Some(Confidence::Medium),
            "high" => Some(Confidence::High),
            _ => None,
        }
    }
}

// ============================================================================
// REVIEW PLAN
// ============================================================================

/// One scheduled/attempted review instance of an [`crate::Item`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPlan {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Owning item (explicit foreign key, index-backed in the store)
    pub item_id: String,
    /// Lifecycle state
    pub status: PlanStatus,
    /// Step in the base day-count ladder
    pub interval_level: IntervalLevel,
    /// SM-2 ease factor, clipped to [1.3, 10.0]
    pub ease_factor: f64,
    /// Per-item multiplier recalibrated from category accuracy, starts at 1.0
    pub difficulty_adjustment: f64,
    /// When this review is (or was) due
    pub scheduled_at: DateTime<Utc>,
    /// Recall score 0-5, set only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// Learner-reported confidence, set only on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    /// Time spent on the attempt, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_secs: Option<i64>,
    /// When the review was completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the plan was created
    pub created_at: DateTime<Utc>,
}

impl ReviewPlan {
    /// First plan for a freshly tracked item: pending, first step,
    /// default ease, neutral difficulty, due tomorrow.
    pub fn initial(item_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: item_id.into(),
            status: PlanStatus::Pending,
            interval_level: IntervalLevel::First,
            ease_factor: INITIAL_EASE_FACTOR,
            difficulty_adjustment: 1.0,
            scheduled_at: now + Duration::days(1),
            score: None,
            confidence: None,
            time_spent_secs: None,
            completed_at: None,
            created_at: now,
        }
    }

    /// Pending successor carrying forward scheduling state from `self`
    pub fn successor(
        &self,
        interval_level: IntervalLevel,
        ease_factor: f64,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item_id: self.item_id.clone(),
            status: PlanStatus::Pending,
            interval_level,
            ease_factor,
            difficulty_adjustment: self.difficulty_adjustment,
            scheduled_at,
            score: None,
            confidence: None,
            time_spent_secs: None,
            completed_at: None,
            created_at: now,
        }
    }

    /// Whether this plan is still waiting to be acted on
    pub fn is_pending(&self) -> bool {
        self.status == PlanStatus::Pending
    }

    /// Whether this plan is due at `now` (pending and scheduled time passed)
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.scheduled_at <= now
    }
}

// ============================================================================
// TESTS
// ============================================================================
