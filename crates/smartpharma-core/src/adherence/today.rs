//! Today's dose slots.
//!
//! Expands every currently active, recommendation-linked reminder into one
//! entry per dose time and marks the slots already logged today. Unlike the
//! rollup, a log only counts for the exact `(reminder, time_index)` it names.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::records::{IntakeLogEntry, ReminderSchedule};

/// One dose slot on today's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledDose {
    /// `"{reminder_id}-{time_index}"`
    pub key: String,
    pub reminder_id: String,
    pub recommendation_id: String,
    pub time_index: usize,
    /// Local time of day in the reference zone
    pub time_of_day: NaiveTime,
    pub note: Option<String>,
    pub taken_today: bool,
}

/// Today's slots for recommendation-linked reminders.
pub fn todays_doses<Tz: TimeZone>(
    reminders: &[ReminderSchedule],
    logs: &[IntakeLogEntry],
    now: &DateTime<Tz>,
) -> Vec<ScheduledDose> {
    todays_doses_with(reminders, logs, now, false)
}

/// Same as [`todays_doses`], optionally keeping `"custom"` reminders.
pub fn todays_doses_with<Tz: TimeZone>(
    reminders: &[ReminderSchedule],
    logs: &[IntakeLogEntry],
    now: &DateTime<Tz>,
    include_custom: bool,
) -> Vec<ScheduledDose> {
    let tz = now.timezone();
    let taken = logged_slots_on(logs, now.date_naive(), &tz);
    let (taken, tz) = (&taken, &tz);

    reminders
        .iter()
        .filter(|r| include_custom || !r.recommendation.is_custom())
        .filter(|r| r.is_active_at(now))
        .flat_map(move |r| {
            r.times.iter().enumerate().filter_map(move |(index, time)| {
                let Some(time) = time else {
                    tracing::debug!(reminder_id = %r.id, index, "unparseable dose time, slot skipped");
                    return None;
                };
                Some(ScheduledDose {
                    key: format!("{}-{}", r.id, index),
                    reminder_id: r.id.clone(),
                    recommendation_id: r.recommendation.as_str().to_string(),
                    time_index: index,
                    time_of_day: time.with_timezone(tz).time(),
                    note: r.note.clone(),
                    taken_today: taken.contains(&(r.id.as_str(), index)),
                })
            })
        })
        .collect()
}

/// Whether a log exists for this reminder slot on `date`.
pub(crate) fn slot_logged_on<Tz: TimeZone>(
    logs: &[IntakeLogEntry],
    reminder_id: &str,
    time_index: usize,
    date: NaiveDate,
    tz: &Tz,
) -> bool {
    logged_slots_on(logs, date, tz).contains(&(reminder_id, time_index))
}

fn logged_slots_on<'a, Tz: TimeZone>(
    logs: &'a [IntakeLogEntry],
    date: NaiveDate,
    tz: &Tz,
) -> HashSet<(&'a str, usize)> {
    logs.iter()
        .filter_map(|log| {
            let reminder_id = log.reminder_id.as_deref()?;
            let index = log.time_index?;
            let logged_at = log.logged_at()?;
            (logged_at.with_timezone(tz).date_naive() == date).then_some((reminder_id, index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecommendationRef;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn reminder(id: &str, recommendation: RecommendationRef, times: &[DateTime<Utc>]) -> ReminderSchedule {
        ReminderSchedule {
            id: id.into(),
            user_id: Some("user-1".into()),
            recommendation,
            frequency_per_day: Some(times.len() as u32),
            times: times.iter().map(|t| Some(t.fixed_offset())).collect(),
            duration_days: Some(7),
            start_date: Some((now() - Duration::days(1)).fixed_offset()),
            note: Some("with water".into()),
        }
    }

    fn log(reminder_id: &str, index: usize, created: DateTime<Utc>) -> IntakeLogEntry {
        IntakeLogEntry {
            id: format!("log-{reminder_id}-{index}"),
            user_id: Some("user-1".into()),
            reminder_id: Some(reminder_id.into()),
            recommendation_id: Some("rec-1".into()),
            time_index: Some(index),
            taken_at: Some(created.fixed_offset()),
            created_at: Some(created.fixed_offset()),
        }
    }

    fn linked() -> RecommendationRef {
        RecommendationRef::Linked("rec-1".into())
    }

    #[test]
    fn test_expands_one_entry_per_time() {
        let reminders = vec![reminder("rem-1", linked(), &[at(8, 0), at(20, 30)])];
        let doses = todays_doses(&reminders, &[], &now());

        assert_eq!(doses.len(), 2);
        assert_eq!(doses[0].key, "rem-1-0");
        assert_eq!(doses[1].key, "rem-1-1");
        assert_eq!(doses[1].time_of_day, NaiveTime::from_hms_opt(20, 30, 0).unwrap());
        assert!(doses.iter().all(|d| !d.taken_today));
    }

    #[test]
    fn test_marks_slot_taken_only_for_matching_index() {
        let reminders = vec![reminder("rem-1", linked(), &[at(8, 0), at(20, 0)])];
        let logs = vec![log("rem-1", 0, now() - Duration::hours(3))];

        let doses = todays_doses(&reminders, &logs, &now());
        assert!(doses[0].taken_today);
        assert!(!doses[1].taken_today);
    }

    #[test]
    fn test_yesterdays_log_does_not_count() {
        let reminders = vec![reminder("rem-1", linked(), &[at(8, 0)])];
        let logs = vec![log("rem-1", 0, now() - Duration::days(1))];

        let doses = todays_doses(&reminders, &logs, &now());
        assert!(!doses[0].taken_today);
    }

    #[test]
    fn test_creation_time_wins_over_taken_at() {
        let reminders = vec![reminder("rem-1", linked(), &[at(8, 0)])];
        let mut entry = log("rem-1", 0, now() - Duration::days(1));
        entry.created_at = Some(now().fixed_offset());

        let doses = todays_doses(&reminders, &[entry], &now());
        assert!(doses[0].taken_today);
    }

    #[test]
    fn test_custom_reminders_excluded_by_default() {
        let reminders = vec![
            reminder("rem-1", RecommendationRef::Custom, &[at(8, 0)]),
            reminder("rem-2", linked(), &[at(9, 0)]),
        ];

        let doses = todays_doses(&reminders, &[], &now());
        assert_eq!(doses.len(), 1);
        assert_eq!(doses[0].reminder_id, "rem-2");

        let all = todays_doses_with(&reminders, &[], &now(), true);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_inactive_reminders_excluded() {
        let mut expired = reminder("rem-1", linked(), &[at(8, 0)]);
        expired.start_date = Some((now() - Duration::days(10)).fixed_offset());
        let mut future = reminder("rem-2", linked(), &[at(8, 0)]);
        future.start_date = Some((now() + Duration::hours(1)).fixed_offset());
        let mut undated = reminder("rem-3", linked(), &[at(8, 0)]);
        undated.start_date = None;

        assert!(todays_doses(&[expired, future, undated], &[], &now()).is_empty());
    }

    #[test]
    fn test_unparseable_time_skipped_but_indices_kept() {
        let mut r = reminder("rem-1", linked(), &[at(8, 0), at(20, 0)]);
        r.times.insert(0, None);

        let doses = todays_doses(&[r], &[], &now());
        let keys: Vec<_> = doses.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["rem-1-1", "rem-1-2"]);
    }

    #[test]
    fn test_slot_logged_on() {
        let logs = vec![log("rem-1", 1, now())];
        let today = now().date_naive();
        assert!(slot_logged_on(&logs, "rem-1", 1, today, &Utc));
        assert!(!slot_logged_on(&logs, "rem-1", 0, today, &Utc));
        assert!(!slot_logged_on(&logs, "rem-2", 1, today, &Utc));
    }
}
