//! Scheduling Engine
//!
//! The write side of the tracker. Every operation reads current entity
//! state, computes the next state through the SM-2 recurrences, and commits
//! all resulting mutations as one store transaction. Operations whose
//! outcome depends on stored state read it inside that same transaction
//! (`PracticeStore::commit_with`), so concurrent operations on one item
//! serialize instead of losing updates. On any failure the store rolls
//! back and the error surfaces to the caller; the engine never retries
//! internally.
//!
//! The engine is an explicit value constructed with an injected store, so
//! call sites share it via `Arc` and there is no hidden global state.
//! Committed operations emit a [`SchedulerEvent`] on a broadcast channel.

mod events;

pub use events::SchedulerEvent;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;

use crate::practice::{Confidence, Item, PlanStatus, ReviewPlan};
use crate::queries::start_of_day;
use crate::sm2;
use crate::storage::{PracticeStore, Result, WriteBatch};

/// Broadcast buffer; slow subscribers lag rather than block the engine
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The spaced-repetition scheduling engine
pub struct Scheduler {
    store: Arc<PracticeStore>,
    events: broadcast::Sender<SchedulerEvent>,
}

impl Scheduler {
    /// Create an engine over an injected store
    pub fn new(store: Arc<PracticeStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, events }
    }

    /// Subscribe to committed-operation events
    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// The store this engine writes through
    pub fn store(&self) -> &Arc<PracticeStore> {
        &self.store
    }

    fn emit(&self, event: SchedulerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    // ========================================================================
    // CREATE INITIAL PLAN
    // ========================================================================

    /// Create the first pending plan for an item and reset its aggregates.
    ///
    /// Item and plan land in one transaction; on failure no partial state
    /// is visible.
    pub fn create_initial_plan(&self, item: &Item) -> Result<ReviewPlan> {
        self.create_initial_plan_at(item, Utc::now())
    }

    /// Clock-injected variant of [`Self::create_initial_plan`]
    pub fn create_initial_plan_at(&self, item: &Item, now: DateTime<Utc>) -> Result<ReviewPlan> {
        let mut item = item.clone();
        item.reset_progress(now);

        let plan = ReviewPlan::initial(&item.id, now);

        self.store.commit(
            WriteBatch::new()
                .put_item(item.clone())
                .put_plan(plan.clone()),
        )?;

        tracing::info!(item_id = %item.id, plan_id = %plan.id, "initial plan created");
        self.emit(SchedulerEvent::PlanCreated {
            item_id: item.id,
            plan_id: plan.id.clone(),
        });

        Ok(plan)
    }

    // ========================================================================
    // COMPLETE REVIEW
    // ========================================================================

    /// Complete a review: retire the acted plan, fold the score into the
    /// item aggregates, and schedule exactly one pending successor.
    ///
    /// Returns the successor plan. A score outside 0-5 is a caller error
    /// handled as a no-op returning the plan unchanged; a plan whose item
    /// is missing returns `Ok(None)`.
    pub fn complete_review(
        &self,
        plan: &ReviewPlan,
        score: i32,
        confidence: Option<Confidence>,
        time_spent_secs: Option<i64>,
    ) -> Result<Option<ReviewPlan>> {
        self.complete_review_at(plan, score, confidence, time_spent_secs, Utc::now())
    }

    /// Clock-injected variant of [`Self::complete_review`]
    pub fn complete_review_at(
        &self,
        plan: &ReviewPlan,
        score: i32,
        confidence: Option<Confidence>,
        time_spent_secs: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<ReviewPlan>> {
        if !sm2::is_valid_score(score) {
            tracing::warn!(plan_id = %plan.id, score, "score outside 0-5, review ignored");
            return Ok(Some(plan.clone()));
        }

        // Item read and aggregate write happen inside one writer
        // transaction: two concurrent completions for the same item must
        // not both fold their review into the same stale snapshot.
        let outcome = self.store.commit_with(|view| {
            let Some(mut item) = view.get_item(&plan.item_id)? else {
                return Ok((WriteBatch::new(), None));
            };

            let ease = sm2::next_ease_factor(plan.ease_factor, score);
            let level = sm2::next_level(plan.interval_level, score);
            let days = sm2::interval_days(level, ease, plan.difficulty_adjustment);
            let scheduled_at = now + Duration::seconds((days * 86_400.0).round() as i64);

            let mut completed = plan.clone();
            completed.status = PlanStatus::Completed;
            completed.score = Some(score);
            completed.confidence = confidence;
            completed.time_spent_secs = time_spent_secs;
            completed.completed_at = Some(now);

            let next = plan.successor(level, ease, scheduled_at, now);

            item.record_review(score, now);

            Ok((
                WriteBatch::new()
                    .put_plan(completed)
                    .put_item(item)
                    .put_plan(next.clone()),
                Some((next, days)),
            ))
        })?;

        let Some((next, days)) = outcome else {
            tracing::warn!(plan_id = %plan.id, item_id = %plan.item_id, "plan has no item");
            return Ok(None);
        };

        tracing::info!(
            plan_id = %plan.id,
            next_plan_id = %next.id,
            score,
            interval_days = days,
            "review completed"
        );
        self.emit(SchedulerEvent::ReviewCompleted {
            item_id: plan.item_id.clone(),
            new_plan_id: next.id.clone(),
        });

        Ok(Some(next))
    }

    // ========================================================================
    // SKIP REVIEW
    // ========================================================================

    /// Skip a review.
    ///
    /// Soft path: when another pending plan sits later today and one more
    /// minute still fits inside today, the acted plan is rescheduled to the
    /// end of today's queue and stays pending. Hard path otherwise: the
    /// plan is marked skipped and a sibling pending plan is inserted for
    /// tomorrow with the same level, ease and difficulty adjustment.
    ///
    /// Returns the plan as it now stands (rescheduled original or sibling).
    pub fn skip_review(&self, plan: &ReviewPlan) -> Result<ReviewPlan> {
        self.skip_review_at(plan, Utc::now())
    }

    /// Clock-injected variant of [`Self::skip_review`]
    pub fn skip_review_at(&self, plan: &ReviewPlan, now: DateTime<Utc>) -> Result<ReviewPlan> {
        let start_of_today = start_of_day(now);
        let start_of_tomorrow = start_of_today + Duration::days(1);

        let latest_today = self
            .store
            .pending_plans()?
            .into_iter()
            .filter(|p| {
                p.id != plan.id
                    && p.scheduled_at >= start_of_today
                    && p.scheduled_at < start_of_tomorrow
            })
            .map(|p| p.scheduled_at)
            .max();

        if let Some(latest) = latest_today {
            let candidate = latest + Duration::minutes(1);
            if candidate < start_of_tomorrow {
                let mut pushed = plan.clone();
                pushed.scheduled_at = candidate;

                self.store.commit(WriteBatch::new().put_plan(pushed.clone()))?;

                tracing::info!(plan_id = %plan.id, "review pushed to end of today's queue");
                self.emit(SchedulerEvent::ReviewRescheduled {
                    item_id: plan.item_id.clone(),
                    plan_id: plan.id.clone(),
                });

                return Ok(pushed);
            }
        }

        // Hard skip: retire this plan, try again tomorrow
        let mut skipped = plan.clone();
        skipped.status = PlanStatus::Skipped;

        let replacement = plan.successor(
            plan.interval_level,
            plan.ease_factor,
            now + Duration::days(1),
            now,
        );

        self.store.commit(
            WriteBatch::new()
                .put_plan(skipped)
                .put_plan(replacement.clone()),
        )?;

        tracing::info!(
            plan_id = %plan.id,
            replacement_plan_id = %replacement.id,
            "review hard-skipped to tomorrow"
        );
        self.emit(SchedulerEvent::ReviewSkipped {
            item_id: plan.item_id.clone(),
            plan_id: plan.id.clone(),
            replacement_plan_id: replacement.id.clone(),
        });

        Ok(replacement)
    }

    // ========================================================================
    // POSTPONE REVIEW
    // ========================================================================

    /// Defer a review by `days`, reusing the same plan instance.
    ///
    /// The difficulty adjustment shrinks by 5% per deferral so repeatedly
    /// deferred items come back with shorter intervals. Returns `false`
    /// for a non-positive `days` without touching the store.
    pub fn postpone_review(&self, plan: &ReviewPlan, days: i64) -> Result<bool> {
        self.postpone_review_at(plan, days, Utc::now())
    }

    /// Clock-injected variant of [`Self::postpone_review`]
    pub fn postpone_review_at(
        &self,
        plan: &ReviewPlan,
        days: i64,
        _now: DateTime<Utc>,
    ) -> Result<bool> {
        if days < 1 {
            tracing::warn!(plan_id = %plan.id, days, "postpone needs at least one day");
            return Ok(false);
        }

        let mut postponed = plan.clone();
        postponed.scheduled_at = plan.scheduled_at + Duration::days(days);
        postponed.status = PlanStatus::Postponed;
        postponed.difficulty_adjustment = (plan.difficulty_adjustment * sm2::DEFERRAL_LENIENCY)
            .clamp(sm2::MIN_DIFFICULTY_ADJUSTMENT, sm2::MAX_DIFFICULTY_ADJUSTMENT);

        self.store.commit(WriteBatch::new().put_plan(postponed))?;

        tracing::info!(plan_id = %plan.id, days, "review postponed");
        self.emit(SchedulerEvent::ReviewPostponed {
            item_id: plan.item_id.clone(),
            plan_id: plan.id.clone(),
        });

        Ok(true)
    }
}

// ============================================================================
// TESTS
// ============================================================================
