//! Loading store exports from disk.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use clap::Args;
use serde_json::Value;
use smartpharma_core::{
    parse_logs, parse_reminders, IntakeLogEntry, ReminderSchedule, SessionContext,
};
use std::path::{Path, PathBuf};

/// Store exports every data command reads.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// JSON export of the user's reminder documents
    #[arg(long)]
    pub reminders: PathBuf,
    /// JSON export of the user's intake-log documents
    #[arg(long)]
    pub logs: PathBuf,
    /// Only keep records owned by this user
    #[arg(long)]
    pub user: Option<String>,
    /// Reference instant. RFC 3339 pins a fixed offset; a bare
    /// `YYYY-MM-DDTHH:MM:SS` is read in the system zone. Defaults to now.
    #[arg(long)]
    pub now: Option<String>,
}

/// Reference instant, carried in the zone calendar days are counted in.
#[derive(Debug, Clone, Copy)]
pub enum Reference {
    /// System zone, following its daylight-saving rules
    Local(DateTime<Local>),
    /// Explicit UTC offset
    Fixed(DateTime<FixedOffset>),
}

impl Reference {
    fn parse(raw: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        let Some(raw) = raw else {
            return Ok(Reference::Local(Local::now()));
        };
        if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Reference::Fixed(fixed));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|e| format!("invalid --now '{raw}': {e}"))?;
        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| format!("invalid --now '{raw}': no such local time"))?;
        Ok(Reference::Local(local))
    }

    pub fn fixed_offset(&self) -> DateTime<FixedOffset> {
        match self {
            Reference::Local(now) => now.fixed_offset(),
            Reference::Fixed(now) => *now,
        }
    }
}

/// Records ready for the engine.
pub struct Inputs {
    pub reminders: Vec<ReminderSchedule>,
    pub logs: Vec<IntakeLogEntry>,
    pub now: Reference,
    pub session: Option<SessionContext>,
}

impl StoreArgs {
    pub fn load(&self) -> Result<Inputs, Box<dyn std::error::Error>> {
        let now = Reference::parse(self.now.as_deref())?;

        let mut reminders = parse_reminders(&read_text(&self.reminders)?)
            .map_err(|e| format!("{}: {e}", self.reminders.display()))?;
        let mut logs = parse_logs(&read_text(&self.logs)?)
            .map_err(|e| format!("{}: {e}", self.logs.display()))?;

        let session = self.user.as_deref().map(SessionContext::new);
        if let Some(session) = &session {
            reminders = session.scope_reminders(reminders);
            logs = session.scope_logs(logs);
        }

        tracing::debug!(
            reminders = reminders.len(),
            logs = logs.len(),
            now = %now.fixed_offset(),
            "loaded store exports"
        );

        Ok(Inputs {
            reminders,
            logs,
            now,
            session,
        })
    }
}

fn read_text(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Ok(content)
}

pub fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let value = serde_json::from_str(&read_text(path)?)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    Ok(value)
}
