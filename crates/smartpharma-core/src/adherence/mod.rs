//! Adherence views over reminders and intake logs.
//!
//! Two deliberately separate views:
//! - [`AdherenceEngine`]: trailing-window rollup that counts raw log volume
//!   per day against expected doses, with a consecutive-day streak
//! - [`todays_doses`]: today's dose slots, each matched against the log
//!   for that exact reminder and slot

mod summary;
mod today;

pub use summary::{
    adherence_rate, adherence_summary, AdherenceEngine, AdherenceReport, AdherenceSummary,
    DayAdherence, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS,
};
pub use today::{todays_doses, todays_doses_with, ScheduledDose};

pub(crate) use today::slot_logged_on;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a day with no expected doses affects the streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// An idle day ends the streak
    #[default]
    BreakOnIdleDay,
    /// An idle day neither extends nor ends the streak
    SkipIdleDay,
}

/// Progress screen period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPeriod {
    #[default]
    Week,
    Month,
}

impl ProgressPeriod {
    /// Trailing window length in days
    pub fn window_days(self) -> u32 {
        match self {
            ProgressPeriod::Week => 7,
            ProgressPeriod::Month => 30,
        }
    }
}

impl fmt::Display for ProgressPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressPeriod::Week => write!(f, "week"),
            ProgressPeriod::Month => write!(f, "month"),
        }
    }
}

impl FromStr for ProgressPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(ProgressPeriod::Week),
            "month" => Ok(ProgressPeriod::Month),
            other => Err(format!("unknown period '{other}', expected 'week' or 'month'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_window_days() {
        assert_eq!(ProgressPeriod::Week.window_days(), 7);
        assert_eq!(ProgressPeriod::Month.window_days(), 30);
    }

    #[test]
    fn period_parses_case_insensitively() {
        assert_eq!("Month".parse::<ProgressPeriod>(), Ok(ProgressPeriod::Month));
        assert!("fortnight".parse::<ProgressPeriod>().is_err());
    }

    #[test]
    fn streak_policy_serializes_snake_case() {
        let json = serde_json::to_string(&StreakPolicy::SkipIdleDay).unwrap();
        assert_eq!(json, "\"skip_idle_day\"");
        assert_eq!(StreakPolicy::default(), StreakPolicy::BreakOnIdleDay);
    }
}
