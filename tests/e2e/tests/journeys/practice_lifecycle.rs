//! Journey: tracking an item from first review to lapse and back
//!
//! Exercises the full write path end to end against a real database
//! file, including a process-restart boundary.

use chrono::{Duration, TimeZone, Utc};
use grind_e2e_tests::mocks::{seed_tracked_item, simulate_reviews};
use grind_e2e_tests::TestEnv;
use grind_core::{Confidence, IntervalLevel, PlanStatus, Scheduler};

#[test]
fn climb_lapse_and_recover() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let (item, plan) = seed_tracked_item(&env.scheduler, "Two Sum", "arrays", now);

    // Three perfect recalls climb the ladder one step per review
    let plan = simulate_reviews(&env.scheduler, plan, &[5, 5, 5], now);
    assert_eq!(plan.interval_level, IntervalLevel::Fourth);

    let climbed = env.store.get_item(&item.id).unwrap().unwrap();
    assert_eq!(climbed.total_reviews, 3);
    assert_eq!(climbed.streak_count, 3);
    assert_eq!(climbed.longest_streak, 3);
    assert_eq!(climbed.last_practiced_at, Some(now));

    // A lapse drops back to the first step and zeroes the streak
    let plan = simulate_reviews(&env.scheduler, plan, &[1], now);
    assert_eq!(plan.interval_level, IntervalLevel::First);

    let lapsed = env.store.get_item(&item.id).unwrap().unwrap();
    assert_eq!(lapsed.streak_count, 0);
    assert_eq!(lapsed.longest_streak, 3, "high-water mark survives the lapse");
    assert!(lapsed.mastery < climbed.mastery);

    // Recovery starts a fresh streak without rewriting history
    let plan = simulate_reviews(&env.scheduler, plan, &[4, 4], now);
    assert_eq!(plan.interval_level, IntervalLevel::Third);

    let recovered = env.store.get_item(&item.id).unwrap().unwrap();
    assert_eq!(recovered.total_reviews, 6);
    assert_eq!(recovered.streak_count, 2);
    assert_eq!(recovered.longest_streak, 3);

    // Every retired plan is still on disk: 6 completed + 1 pending
    let history = env.store.plans_for_item(&item.id).unwrap();
    assert_eq!(history.len(), 7);
    assert_eq!(
        history
            .iter()
            .filter(|p| p.status == PlanStatus::Completed)
            .count(),
        6
    );
}

#[test]
fn outcome_metadata_round_trips_through_the_store() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let (_item, plan) = seed_tracked_item(&env.scheduler, "LRU Cache", "design", now);

    env.scheduler
        .complete_review_at(&plan, 4, Some(Confidence::Medium), Some(1500), now)
        .unwrap()
        .unwrap();

    let acted = env.store.get_plan(&plan.id).unwrap().unwrap();
    assert_eq!(acted.status, PlanStatus::Completed);
    assert_eq!(acted.score, Some(4));
    assert_eq!(acted.confidence, Some(Confidence::Medium));
    assert_eq!(acted.time_spent_secs, Some(1500));
    assert_eq!(acted.completed_at, Some(now));
}

#[test]
fn state_survives_a_restart() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let (item, plan) = seed_tracked_item(&env.scheduler, "Merge Intervals", "intervals", now);
    let plan = simulate_reviews(&env.scheduler, plan, &[5, 4], now);

    // Reopen the same database file, as after a process restart
    let (store, scheduler) = env.reopen();

    let reloaded = store.get_item(&item.id).unwrap().unwrap();
    assert_eq!(reloaded.total_reviews, 2);
    assert_eq!(reloaded.streak_count, 2);

    // The reopened engine continues the same schedule
    let next = scheduler
        .complete_review_at(&plan, 5, None, None, now)
        .unwrap()
        .unwrap();
    assert_eq!(next.interval_level, IntervalLevel::Fourth);
    assert_eq!(store.get_item(&item.id).unwrap().unwrap().total_reviews, 3);
}

#[test]
fn skip_and_postpone_keep_history_append_only() {
    let env = TestEnv::new();
    // Late evening with an empty queue forces the hard-skip path
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 23, 58, 0).unwrap();
    let (item, mut plan) = seed_tracked_item(&env.scheduler, "Word Ladder", "graphs", now);
    plan.scheduled_at = now - Duration::hours(3);
    env.store
        .commit(grind_core::WriteBatch::new().put_plan(plan.clone()))
        .unwrap();

    let replacement = env.scheduler.skip_review_at(&plan, now).unwrap();
    assert_ne!(replacement.id, plan.id);
    assert_eq!(replacement.scheduled_at, now + Duration::days(1));
    assert_eq!(
        env.store.get_plan(&plan.id).unwrap().unwrap().status,
        PlanStatus::Skipped
    );

    // Postponing the replacement reuses the instance and softens difficulty
    assert!(env.scheduler.postpone_review_at(&replacement, 2, now).unwrap());
    let postponed = env.store.get_plan(&replacement.id).unwrap().unwrap();
    assert_eq!(postponed.status, PlanStatus::Postponed);
    assert_eq!(
        postponed.scheduled_at,
        replacement.scheduled_at + Duration::days(2)
    );
    assert!(postponed.difficulty_adjustment < replacement.difficulty_adjustment);

    // Skipping never folds into item aggregates
    let untouched = env.store.get_item(&item.id).unwrap().unwrap();
    assert_eq!(untouched.total_reviews, 0);
    assert_eq!(env.store.plans_for_item(&item.id).unwrap().len(), 2);
}

#[test]
fn events_follow_the_committed_operations() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let mut rx = env.scheduler.subscribe();

    let (item, plan) = seed_tracked_item(&env.scheduler, "Two Sum", "arrays", now);
    let next = env
        .scheduler
        .complete_review_at(&plan, 5, None, None, now)
        .unwrap()
        .unwrap();

    use grind_core::SchedulerEvent;
    assert_eq!(
        rx.try_recv().unwrap(),
        SchedulerEvent::PlanCreated {
            item_id: item.id.clone(),
            plan_id: plan.id,
        }
    );
    assert_eq!(
        rx.try_recv().unwrap(),
        SchedulerEvent::ReviewCompleted {
            item_id: item.id,
            new_plan_id: next.id,
        }
    );
    assert!(rx.try_recv().is_err(), "no spurious events");
}

/// Engines are shared by value behind `Arc`, never re-created per call
#[test]
fn one_engine_serves_many_items() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
    let scheduler: &Scheduler = &env.scheduler;

    for (title, category) in [
        ("Two Sum", "arrays"),
        ("Course Schedule", "graphs"),
        ("Min Stack", "stacks"),
    ] {
        let (_item, plan) = seed_tracked_item(scheduler, title, category, now);
        simulate_reviews(scheduler, plan, &[4], now);
    }

    let items = env.store.items().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|i| i.total_reviews == 1));
}
