//! Journey: nightly difficulty calibration over real review history
//!
//! Builds category history through the engine (not hand-written rows),
//! runs the calibrator, and checks the downstream effect on scheduling.

use chrono::{TimeZone, Utc};
use grind_core::{calibrate_difficulty, sm2, PlanStatus};
use grind_e2e_tests::mocks::{seed_tracked_item, simulate_reviews};
use grind_e2e_tests::TestEnv;

#[test]
fn strong_category_earns_longer_intervals() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    // "arrays" averages 5.0 over three completions, "graphs" averages 1.0
    let (_strong_item, strong_plan) =
        seed_tracked_item(&env.scheduler, "Two Sum", "arrays", now);
    let strong_pending = simulate_reviews(&env.scheduler, strong_plan, &[5, 5, 5], now);

    let (_weak_item, weak_plan) =
        seed_tracked_item(&env.scheduler, "Word Ladder", "graphs", now);
    let weak_pending = simulate_reviews(&env.scheduler, weak_plan, &[1, 1, 1], now);

    let report = calibrate_difficulty(&env.store).unwrap();
    assert_eq!(report.categories_adjusted, 2);
    assert_eq!(report.plans_updated, 2);

    let strong = env.store.get_plan(&strong_pending.id).unwrap().unwrap();
    let weak = env.store.get_plan(&weak_pending.id).unwrap().unwrap();
    assert!((strong.difficulty_adjustment - 1.05).abs() < 1e-9);
    assert!((weak.difficulty_adjustment - 0.95).abs() < 1e-9);

    // The adjustment feeds straight into the next interval: compare the
    // calibrated successor against what an uncalibrated plan would get
    let next = env
        .scheduler
        .complete_review_at(&strong, 5, None, None, now)
        .unwrap()
        .unwrap();
    let uncalibrated_days = sm2::interval_days(
        sm2::next_level(strong.interval_level, 5),
        sm2::next_ease_factor(strong.ease_factor, 5),
        1.0,
    );
    let calibrated_days = sm2::interval_days(
        sm2::next_level(strong.interval_level, 5),
        sm2::next_ease_factor(strong.ease_factor, 5),
        strong.difficulty_adjustment,
    );
    assert!(calibrated_days > uncalibrated_days);
    assert!(next.scheduled_at > now);
}

#[test]
fn sparse_history_changes_nothing() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    // Only two completed reviews: below the sample threshold
    let (_item, plan) = seed_tracked_item(&env.scheduler, "Min Stack", "stacks", now);
    let pending = simulate_reviews(&env.scheduler, plan, &[5, 5], now);

    let report = calibrate_difficulty(&env.store).unwrap();
    assert_eq!(report.categories_adjusted, 0);
    assert_eq!(report.plans_updated, 0);

    let untouched = env.store.get_plan(&pending.id).unwrap().unwrap();
    assert!((untouched.difficulty_adjustment - 1.0).abs() < 1e-9);
}

#[test]
fn category_signal_pools_across_items() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    // Each item alone is under the threshold; the category is not
    let (_a, plan_a) = seed_tracked_item(&env.scheduler, "Course Schedule", "graphs", now);
    let pending_a = simulate_reviews(&env.scheduler, plan_a, &[1, 2], now);
    let (_b, plan_b) = seed_tracked_item(&env.scheduler, "Clone Graph", "graphs", now);
    let pending_b = simulate_reviews(&env.scheduler, plan_b, &[1, 1], now);

    let report = calibrate_difficulty(&env.store).unwrap();
    assert_eq!(report.categories_adjusted, 1);
    assert_eq!(report.plans_updated, 2);

    for id in [&pending_a.id, &pending_b.id] {
        let plan = env.store.get_plan(id).unwrap().unwrap();
        assert!((plan.difficulty_adjustment - 0.95).abs() < 1e-9);
    }
}

#[test]
fn nightly_runs_compound_until_the_clamp() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    let (_item, plan) = seed_tracked_item(&env.scheduler, "Two Sum", "arrays", now);
    let pending = simulate_reviews(&env.scheduler, plan, &[5, 5, 5], now);

    calibrate_difficulty(&env.store).unwrap();
    calibrate_difficulty(&env.store).unwrap();
    let after_two = env.store.get_plan(&pending.id).unwrap().unwrap();
    assert!((after_two.difficulty_adjustment - 1.05 * 1.05).abs() < 1e-9);

    for _ in 0..40 {
        calibrate_difficulty(&env.store).unwrap();
    }
    let capped = env.store.get_plan(&pending.id).unwrap().unwrap();
    assert!(capped.difficulty_adjustment <= sm2::MAX_DIFFICULTY_ADJUSTMENT);
}

#[test]
fn calibration_touches_only_pending_plans() {
    let env = TestEnv::new();
    let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    let (item, plan) = seed_tracked_item(&env.scheduler, "Two Sum", "arrays", now);
    simulate_reviews(&env.scheduler, plan, &[5, 5, 5], now);

    calibrate_difficulty(&env.store).unwrap();

    for plan in env.store.plans_for_item(&item.id).unwrap() {
        match plan.status {
            PlanStatus::Pending => {
                assert!((plan.difficulty_adjustment - 1.05).abs() < 1e-9)
            }
            _ => assert!((plan.difficulty_adjustment - 1.0).abs() < 1e-9),
        }
    }
}
