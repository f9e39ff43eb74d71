//! # SmartPharma Core Library
//!
//! Business logic behind the SmartPharma dose reminder app. Authentication,
//! persistence and notification delivery belong to the backend service and
//! the mobile OS; this crate works on records already fetched from them.
//!
//! ## Architecture
//!
//! - **Records**: Typed reminder and intake-log records, coerced from the
//!   document store's loosely shaped JSON
//! - **Adherence**: Trailing-window adherence rollup with streaks, and the
//!   per-slot view of today's doses
//! - **Intake**: Validation of new "dose taken" entries
//! - **Recommendations**: Herbs parsed from model replies and stored documents
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`AdherenceEngine`]: Adherence and streak computation
//! - [`todays_doses`]: Today's dose slots with taken flags
//! - [`SessionContext`]: The signed-in user, passed explicitly
//! - [`Config`]: Application configuration management

pub mod adherence;
pub mod error;
pub mod intake;
pub mod recommendation;
pub mod records;
pub mod schedule;
pub mod session;
pub mod storage;

pub use adherence::{
    adherence_summary, todays_doses, AdherenceEngine, AdherenceReport, AdherenceSummary,
    DayAdherence, ProgressPeriod, ScheduledDose, StreakPolicy,
};
pub use error::{ConfigError, CoreError, IngestError, ValidationError};
pub use intake::new_intake_entry;
pub use recommendation::{
    ingest_recommendations, parse_recommendation, parse_recommendation_reply, parse_recommendations,
    HerbalRecommendation, RecommendationRecord,
};
pub use records::{
    ingest_logs, ingest_reminders, parse_logs, parse_reminders, IntakeLogEntry, RecommendationRef, ReminderSchedule,
};
pub use schedule::{next_dose_trigger, next_trigger};
pub use session::SessionContext;
pub use storage::Config;
