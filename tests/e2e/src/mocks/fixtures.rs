//! Fixtures seeding realistic practice histories

use chrono::{DateTime, Utc};
use grind_core::{Item, ReviewPlan, Scheduler};

/// Track a fresh item through the engine, returning the persisted item
/// and its first pending plan.
pub fn seed_tracked_item(
    scheduler: &Scheduler,
    title: &str,
    category: &str,
    now: DateTime<Utc>,
) -> (Item, ReviewPlan) {
    let item = Item::new(title, category);
    let plan = scheduler
        .create_initial_plan_at(&item, now)
        .expect("create initial plan");
    let item = scheduler
        .store()
        .get_item(&item.id)
        .expect("read item back")
        .expect("item persisted");
    (item, plan)
}

/// Complete one review per score, in order, all at the same instant.
/// Returns the pending plan left after the last completion.
pub fn simulate_reviews(
    scheduler: &Scheduler,
    plan: ReviewPlan,
    scores: &[i32],
    now: DateTime<Utc>,
) -> ReviewPlan {
    let mut current = plan;
    for &score in scores {
        current = scheduler
            .complete_review_at(&current, score, None, None, now)
            .expect("complete review")
            .expect("item exists");
    }
    current
}
