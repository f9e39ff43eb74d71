//! Daily reminder trigger times.
//!
//! Dose reminders repeat daily at a fixed hour and minute. The OS owns
//! delivery; this only answers "when does this reminder fire next".

use chrono::{DateTime, Days, NaiveTime, TimeZone, Timelike};

use crate::records::ReminderSchedule;

/// Next instant at `time_of_day`'s hour and minute (seconds zeroed) strictly
/// after `now`, in `now`'s zone.
///
/// Returns `None` only if neither today's nor tomorrow's occurrence exists
/// as a local time.
pub fn next_trigger<Tz: TimeZone>(time_of_day: NaiveTime, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let target = NaiveTime::from_hms_opt(time_of_day.hour(), time_of_day.minute(), 0)?;
    let tz = now.timezone();
    let today = now.date_naive();

    [Some(today), today.checked_add_days(Days::new(1)), today.checked_add_days(Days::new(2))]
        .into_iter()
        .flatten()
        .filter_map(|date| tz.from_local_datetime(&date.and_time(target)).earliest())
        .find(|candidate| candidate > now)
}

/// Next trigger for dose `time_index` of `reminder`, converting the stored
/// dose time into `now`'s zone first.
pub fn next_dose_trigger<Tz: TimeZone>(
    reminder: &ReminderSchedule,
    time_index: usize,
    now: &DateTime<Tz>,
) -> Option<DateTime<Tz>> {
    let dose = reminder.times.get(time_index).copied().flatten()?;
    next_trigger(dose.with_timezone(&now.timezone()).time(), now)
}
