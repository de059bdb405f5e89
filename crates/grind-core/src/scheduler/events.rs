//! Scheduler Events
//!
//! Specific change notifications emitted after each committed write
//! operation. Subscribers (UI lists, notification glue) react to exactly
//! the entity that changed instead of reloading the whole dataset.

use serde::Serialize;

/// Event emitted after an engine write operation committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SchedulerEvent {
    /// An item got its first pending plan
    PlanCreated { item_id: String, plan_id: String },
    /// A review was completed and a successor plan scheduled
    ReviewCompleted { item_id: String, new_plan_id: String },
    /// A plan was soft-pushed to the end of today's queue
    ReviewRescheduled { item_id: String, plan_id: String },
    /// A plan was hard-skipped and replaced by a sibling for tomorrow
    ReviewSkipped {
        item_id: String,
        plan_id: String,
        replacement_plan_id: String,
    },
    /// A plan was deferred by a number of days
    ReviewPostponed { item_id: String, plan_id: String },
}
