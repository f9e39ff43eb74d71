//! Recording a dose as taken.
//!
//! The store accepts duplicate logs, so the one-entry-per-slot-per-day rule
//! is checked here before a new entry is produced.

use chrono::{DateTime, TimeZone};
use uuid::Uuid;

use crate::adherence::slot_logged_on;
use crate::error::ValidationError;
use crate::records::{IntakeLogEntry, ReminderSchedule};
use crate::session::SessionContext;

/// Build a new intake entry for dose `time_index` of `reminder_id`.
///
/// # Errors
///
/// - [`ValidationError::UnknownReminder`] when no reminder has that id
/// - [`ValidationError::ForeignReminder`] when it belongs to another user
/// - [`ValidationError::InactiveReminder`] when `now` is outside its schedule
/// - [`ValidationError::OutOfBounds`] when `time_index` is past its `times`
/// - [`ValidationError::AlreadyLogged`] when that slot already has a log today
pub fn new_intake_entry<Tz: TimeZone>(
    session: &SessionContext,
    reminders: &[ReminderSchedule],
    logs: &[IntakeLogEntry],
    reminder_id: &str,
    time_index: usize,
    now: &DateTime<Tz>,
) -> Result<IntakeLogEntry, ValidationError> {
    let reminder = reminders
        .iter()
        .find(|r| r.id == reminder_id)
        .ok_or_else(|| ValidationError::UnknownReminder(reminder_id.to_string()))?;

    if !session.owns(reminder.user_id.as_deref()) {
        return Err(ValidationError::ForeignReminder {
            reminder_id: reminder_id.to_string(),
            user_id: session.user_id().to_string(),
        });
    }

    if !reminder.is_active_at(now) {
        return Err(ValidationError::InactiveReminder(reminder_id.to_string()));
    }

    if time_index >= reminder.times.len() {
        return Err(ValidationError::OutOfBounds {
            collection: format!("times of reminder '{reminder_id}'"),
            index: time_index,
            len: reminder.times.len(),
        });
    }

    let today = now.date_naive();
    if slot_logged_on(logs, reminder_id, time_index, today, &now.timezone()) {
        return Err(ValidationError::AlreadyLogged {
            reminder_id: reminder_id.to_string(),
            time_index,
            date: today,
        });
    }

    let entry = IntakeLogEntry {
        id: Uuid::new_v4().to_string(),
        user_id: Some(session.user_id().to_string()),
        reminder_id: Some(reminder_id.to_string()),
        recommendation_id: Some(reminder.recommendation.as_str().to_string()),
        time_index: Some(time_index),
        taken_at: Some(now.fixed_offset()),
        created_at: None,
    };
    tracing::debug!(log_id = %entry.id, reminder_id, time_index, "intake entry created");
    Ok(entry)
}
