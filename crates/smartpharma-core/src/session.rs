//! Explicit session context.
//!
//! The signed-in user travels as a value passed to whatever needs it, never
//! as ambient global state. The adherence engine takes no session at all;
//! callers scope the collections first.

use serde::{Deserialize, Serialize};

use crate::recommendation::RecommendationRecord;
use crate::records::{IntakeLogEntry, ReminderSchedule};

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    user_id: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Records without an owner are accepted; the store query already
    /// scoped them to this user.
    pub fn owns(&self, owner: Option<&str>) -> bool {
        owner.map_or(true, |owner| owner == self.user_id)
    }

    /// Drop reminders that belong to someone else.
    pub fn scope_reminders(&self, reminders: Vec<ReminderSchedule>) -> Vec<ReminderSchedule> {
        reminders
            .into_iter()
            .filter(|r| {
                let owned = self.owns(r.user_id.as_deref());
                if !owned {
                    tracing::debug!(reminder_id = %r.id, "reminder owned by another user, ignored");
                }
                owned
            })
            .collect()
    }

    /// Drop intake logs that belong to someone else.
    pub fn scope_logs(&self, logs: Vec<IntakeLogEntry>) -> Vec<IntakeLogEntry> {
        logs.into_iter()
            .filter(|l| {
                let owned = self.owns(l.user_id.as_deref());
                if !owned {
                    tracing::debug!(log_id = %l.id, "intake log owned by another user, ignored");
                }
                owned
            })
            .collect()
    }

    /// Drop recommendation records that belong to someone else.
    pub fn scope_recommendations(
        &self,
        records: Vec<RecommendationRecord>,
    ) -> Vec<RecommendationRecord> {
        records
            .into_iter()
            .filter(|r| self.owns(r.user_id.as_deref()))
            .collect()
    }
}
