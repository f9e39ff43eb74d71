//! Property tests for the adherence rollup.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use smartpharma_core::adherence::adherence_rate;
use smartpharma_core::{AdherenceEngine, IntakeLogEntry, RecommendationRef, ReminderSchedule};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn reminder_strategy() -> impl Strategy<Value = ReminderSchedule> {
    (
        prop::option::of(1u32..4),
        prop::option::of(1u32..20),
        prop::option::of(-20i64..5),
    )
        .prop_map(|(frequency, duration, start_offset)| ReminderSchedule {
            id: "r".into(),
            user_id: None,
            recommendation: RecommendationRef::Custom,
            frequency_per_day: frequency,
            times: Vec::new(),
            duration_days: duration,
            start_date: start_offset.map(|d| (now() + Duration::days(d)).fixed_offset()),
            note: None,
        })
}

fn log_strategy() -> impl Strategy<Value = IntakeLogEntry> {
    prop::option::of(-10i64 * 24..24).prop_map(|hours| IntakeLogEntry {
        id: "l".into(),
        user_id: None,
        reminder_id: None,
        recommendation_id: None,
        time_index: None,
        taken_at: hours.map(|h| (now() + Duration::hours(h)).fixed_offset()),
        created_at: None,
    })
}

proptest! {
    #[test]
    fn streak_never_exceeds_window(
        reminders in prop::collection::vec(reminder_strategy(), 0..6),
        logs in prop::collection::vec(log_strategy(), 0..40),
        window in 0u32..35,
    ) {
        let report = AdherenceEngine::with_window(window).report(&reminders, &logs, &now());
        prop_assert!(report.summary.streak <= window);
        prop_assert_eq!(report.days.len(), window as usize);
    }

    #[test]
    fn totals_are_sums_of_days(
        reminders in prop::collection::vec(reminder_strategy(), 0..6),
        logs in prop::collection::vec(log_strategy(), 0..40),
    ) {
        let report = AdherenceEngine::new().report(&reminders, &logs, &now());
        let expected: u32 = report.days.iter().map(|d| d.expected).sum();
        let taken: u32 = report.days.iter().map(|d| d.taken).sum();
        prop_assert_eq!(report.summary.doses_expected, expected);
        prop_assert_eq!(report.summary.doses_taken, taken);
        prop_assert!(report.summary.doses_taken as usize <= logs.len());
    }

    #[test]
    fn rate_is_zero_without_expectation_and_bounded_when_not_over_logged(
        taken in 0u32..1000,
        expected in 0u32..1000,
    ) {
        let rate = adherence_rate(taken, expected);
        if expected == 0 {
            prop_assert_eq!(rate, 0);
        } else if taken <= expected {
            prop_assert!(rate <= 100);
        }
    }
}
