//! Practice Domain Model
//!
//! The two persisted entities of the tracker:
//! - [`Item`]: a learned unit (one algorithm problem, technique, pattern)
//! - [`ReviewPlan`]: one scheduled/attempted review of an item
//!
//! Plans reference items by explicit foreign key (`item_id`) and form an
//! append-only history; the engine never deletes a plan.

mod item;
mod plan;

pub use item::{Item, MASTERY_MAX, MASTERY_MIN, PROFICIENT_MASTERY};
pub use plan::{Confidence, IntervalLevel, PlanStatus, ReviewPlan};
