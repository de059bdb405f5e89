//! # Grind Core
//!
//! Engine of a personal algorithm-practice tracker. One hard subsystem:
//! the spaced-repetition **scheduling engine**, an SM-2 variant that
//! decides after every recall attempt when an item comes back, how
//! confident mastery is, and how whole categories recalibrate from
//! aggregate performance.
//!
//! - **SM-2 variant**: classic ease recurrence over a fixed six-step
//!   base-day ladder, scaled by a per-item difficulty adjustment and
//!   capped at one year
//! - **Atomic transitions**: every write operation commits all of its
//!   entity mutations as one SQLite transaction
//! - **Append-only history**: review plans are never deleted; skips and
//!   completions retire a plan and spawn its successor
//! - **Specific change events**: committed operations broadcast
//!   [`SchedulerEvent`]s instead of forcing blanket reloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grind_core::{Item, PracticeStore, Scheduler};
//!
//! // Open the store (default platform-specific location)
//! let store = Arc::new(PracticeStore::new(None)?);
//! let scheduler = Scheduler::new(store.clone());
//!
//! // Track an item and complete its first review
//! let item = Item::new("Two Sum", "arrays");
//! let plan = scheduler.create_initial_plan(&item)?;
//! let next = scheduler.complete_review(&plan, 5, None, Some(420))?;
//!
//! // What's due right now?
//! let due = grind_core::due_reviews(&store, Some(10))?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod calibration;
pub mod practice;
pub mod queries;
pub mod scheduler;
pub mod sm2;
pub mod stats;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Domain model
pub use practice::{
    Confidence, IntervalLevel, Item, PlanStatus, ReviewPlan, MASTERY_MAX, MASTERY_MIN,
    PROFICIENT_MASTERY,
};

// SM-2 recurrences
pub use sm2::{
    interval_days, is_valid_score, mastery_shift, next_ease_factor, next_level, running_mean,
    INITIAL_EASE_FACTOR, MAX_EASE_FACTOR, MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};

// Storage layer
pub use storage::{PracticeStore, Result, StoreError, WriteBatch, WriteOp, WriterView};

// Scheduling engine
pub use scheduler::{Scheduler, SchedulerEvent};

// Due-query projections
pub use queries::{
    due_reviews, due_reviews_at, overdue_reviews, overdue_reviews_at, predict_next_review_date,
    today_reviews, today_reviews_at,
};

// Statistics
pub use stats::{review_statistics, ReviewStatistics};

// Difficulty calibration
pub use calibration::{calibrate_difficulty, CalibrationReport, MIN_CATEGORY_SAMPLES};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        calibrate_difficulty, due_reviews, overdue_reviews, predict_next_review_date,
        review_statistics, today_reviews, CalibrationReport, Confidence, IntervalLevel, Item,
        PlanStatus, PracticeStore, Result, ReviewPlan, ReviewStatistics, Scheduler,
        SchedulerEvent, StoreError, WriteBatch,
    };
}
