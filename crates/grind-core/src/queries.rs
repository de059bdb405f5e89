//! Due Query
//!
//! Read-only projections over pending review plans. No mutation: two
//! consecutive calls with no intervening write return identical ordered
//! results. Reads may run concurrently with engine writes and make no
//! freshness guarantee across the read/write boundary; callers re-fetch
//! before acting when that matters.
//!
//! Each projection has an `_at(now)` variant taking the clock explicitly.

use chrono::{DateTime, Duration, Utc};

use crate::practice::ReviewPlan;
use crate::storage::{PracticeStore, Result};

/// Midnight at the start of the UTC day containing `now`
pub(crate) fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}

/// Pending plans whose scheduled time has passed, ascending by schedule
pub fn due_reviews(store: &PracticeStore, limit: Option<usize>) -> Result<Vec<ReviewPlan>> {
    due_reviews_at(store, Utc::now(), limit)
}

/// Clock-injected variant of [`due_reviews`]
pub fn due_reviews_at(
    store: &PracticeStore,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> Result<Vec<ReviewPlan>> {
    let mut due: Vec<ReviewPlan> = store
        .pending_plans()?
        .into_iter()
        .filter(|p| p.scheduled_at <= now)
        .collect();

    if let Some(limit) = limit {
        due.truncate(limit);
    }
    Ok(due)
}

/// Pending plans scheduled inside today's `[midnight, midnight)` window
pub fn today_reviews(store: &PracticeStore) -> Result<Vec<ReviewPlan>> {
    today_reviews_at(store, Utc::now())
}

/// Clock-injected variant of [`today_reviews`]
pub fn today_reviews_at(store: &PracticeStore, now: DateTime<Utc>) -> Result<Vec<ReviewPlan>> {
    let start_of_today = start_of_day(now);
    let start_of_tomorrow = start_of_today + Duration::days(1);

    Ok(store
        .pending_plans()?
        .into_iter()
        .filter(|p| p.scheduled_at >= start_of_today && p.scheduled_at < start_of_tomorrow)
        .collect())
}

/// Pending plans that slipped past a previous day entirely
pub fn overdue_reviews(store: &PracticeStore) -> Result<Vec<ReviewPlan>> {
    overdue_reviews_at(store, Utc::now())
}

/// Clock-injected variant of [`overdue_reviews`]
pub fn overdue_reviews_at(store: &PracticeStore, now: DateTime<Utc>) -> Result<Vec<ReviewPlan>> {
    let start_of_today = start_of_day(now);

    Ok(store
        .pending_plans()?
        .into_iter()
        .filter(|p| p.scheduled_at < start_of_today)
        .collect())
}

/// Earliest scheduled time among an item's pending plans, if any
pub fn predict_next_review_date(
    store: &PracticeStore,
    item_id: &str,
) -> Result<Option<DateTime<Utc>>> {
    Ok(store
        .pending_plans_for_item(item_id)?
        .first()
        .map(|p| p.scheduled_at))
}

// ============================================================================
// TESTS
// ============================================================================
