//! Trailing-window adherence rollup.
//!
//! For each of the last `window_days` calendar days (most recent first) the
//! engine compares doses expected by active reminders with the number of
//! intake logs recorded that day:
//! - **Expected**: sum of `frequency_per_day` over reminders whose active date
//!   range covers the day
//! - **Taken**: raw count of logs whose `taken_at` falls on the day, whatever
//!   reminder or slot they point at
//! - **Streak**: consecutive satisfied days counted back from today
//!
//! Calendar days are taken in the time zone of the reference instant. Windows
//! longer than [`MAX_WINDOW_DAYS`] are cut to that length.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ProgressPeriod, StreakPolicy};
use crate::records::{IntakeLogEntry, ReminderSchedule};

/// Window used by the progress screen unless told otherwise.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// Longest window the engine walks, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

/// Headline adherence metrics for a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceSummary {
    pub doses_taken: u32,
    pub doses_expected: u32,
    /// Rounded percentage; exceeds 100 when more doses were logged than expected
    pub adherence_rate: u32,
    /// Consecutive satisfied days ending today
    pub streak: u32,
}

/// Per-day aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub expected: u32,
    pub taken: u32,
    /// `expected > 0 && taken >= expected`
    pub satisfied: bool,
}

/// Summary plus the day-by-day series behind it, most recent day first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceReport {
    pub summary: AdherenceSummary,
    pub days: Vec<DayAdherence>,
}

/// Computes adherence over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdherenceEngine {
    /// Number of calendar days ending with the reference day
    pub window_days: u32,
    pub streak_policy: StreakPolicy,
}

impl Default for AdherenceEngine {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            streak_policy: StreakPolicy::BreakOnIdleDay,
        }
    }
}

impl AdherenceEngine {
    /// Create an engine with the default 7-day window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom window length
    pub fn with_window(window_days: u32) -> Self {
        Self {
            window_days,
            ..Self::default()
        }
    }

    /// Create an engine sized for a progress period
    pub fn for_period(period: ProgressPeriod) -> Self {
        Self::with_window(period.window_days())
    }

    pub fn streak_policy(mut self, policy: StreakPolicy) -> Self {
        self.streak_policy = policy;
        self
    }

    /// Number of days a report actually covers
    pub fn effective_window(&self) -> u32 {
        self.window_days.min(MAX_WINDOW_DAYS)
    }

    /// Headline metrics only.
    pub fn summarize<Tz: TimeZone>(
        &self,
        reminders: &[ReminderSchedule],
        logs: &[IntakeLogEntry],
        now: &DateTime<Tz>,
    ) -> AdherenceSummary {
        self.report(reminders, logs, now).summary
    }

    /// Build the full report as of `now`.
    ///
    /// Never fails: reminders missing a start date, duration or frequency
    /// expect nothing, and logs without a parseable `taken_at` count nowhere.
    pub fn report<Tz: TimeZone>(
        &self,
        reminders: &[ReminderSchedule],
        logs: &[IntakeLogEntry],
        now: &DateTime<Tz>,
    ) -> AdherenceReport {
        let tz = now.timezone();
        let today = now.date_naive();
        let taken_by_day = count_logs_by_day(logs, &tz);

        let schedules: Vec<(u32, NaiveDate, NaiveDate)> = reminders
            .iter()
            .filter_map(|r| match (r.frequency_per_day, r.active_dates(&tz)) {
                (Some(frequency), Some((start, end))) => Some((frequency, start, end)),
                _ => {
                    tracing::debug!(reminder_id = %r.id, "reminder lacks schedule fields, expects nothing");
                    None
                }
            })
            .collect();

        let window = self.effective_window();
        let mut summary = AdherenceSummary::default();
        let mut days = Vec::with_capacity(window as usize);
        let mut streak_open = true;

        for offset in 0..window {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };

            let expected = schedules
                .iter()
                .filter(|(_, start, end)| *start <= date && date <= *end)
                .map(|(frequency, _, _)| *frequency)
                .fold(0u32, u32::saturating_add);
            let taken = taken_by_day.get(&date).copied().unwrap_or(0);
            let satisfied = expected > 0 && taken >= expected;

            tracing::trace!(%date, expected, taken, "adherence day");

            summary.doses_expected = summary.doses_expected.saturating_add(expected);
            summary.doses_taken = summary.doses_taken.saturating_add(taken);

            if streak_open {
                match (satisfied, self.streak_policy) {
                    (true, _) => summary.streak += 1,
                    (false, StreakPolicy::SkipIdleDay) if expected == 0 => {}
                    (false, _) => streak_open = false,
                }
            }

            days.push(DayAdherence {
                date,
                expected,
                taken,
                satisfied,
            });
        }

        summary.adherence_rate = adherence_rate(summary.doses_taken, summary.doses_expected);

        AdherenceReport { summary, days }
    }
}

/// Summary over the default 7-day window with the default streak policy.
pub fn adherence_summary<Tz: TimeZone>(
    reminders: &[ReminderSchedule],
    logs: &[IntakeLogEntry],
    now: &DateTime<Tz>,
) -> AdherenceSummary {
    AdherenceEngine::default().summarize(reminders, logs, now)
}

/// `round(taken / expected * 100)`, or 0 when nothing was expected.
///
/// Integer arithmetic, halves round up.
pub fn adherence_rate(taken: u32, expected: u32) -> u32 {
    if expected == 0 {
        return 0;
    }
    let taken = u64::from(taken);
    let expected = u64::from(expected);
    let rate = (taken * 200 + expected) / (expected * 2);
    u32::try_from(rate).unwrap_or(u32::MAX)
}

fn count_logs_by_day<Tz: TimeZone>(
    logs: &[IntakeLogEntry],
    tz: &Tz,
) -> HashMap<NaiveDate, u32> {
    let mut counts = HashMap::new();
    for log in logs {
        match log.taken_at {
            Some(taken_at) => {
                *counts
                    .entry(taken_at.with_timezone(tz).date_naive())
                    .or_insert(0u32) += 1;
            }
            None => {
                tracing::debug!(log_id = %log.id, "intake log without takenAt, not counted");
            }
        }
    }
    counts
}
