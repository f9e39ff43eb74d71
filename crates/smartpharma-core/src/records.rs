//! Typed reminder and intake-log records.
//!
//! Records arrive from the document store as loosely shaped JSON: camelCase
//! keys, `$id`/`$createdAt` system fields, numbers that are sometimes strings
//! and timestamps as ISO-8601 text. Everything is coerced here, once, into
//! strongly typed records. A field that cannot be coerced becomes `None` and
//! the engine skips whatever that field would have contributed.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IngestError;

/// Marker stored in `recommendationId` for reminders not linked to a recommendation.
pub const CUSTOM_RECOMMENDATION: &str = "custom";

/// Link from a reminder to the recommendation it was created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecommendationRef {
    /// Created from a stored recommendation
    Linked(String),
    /// Created directly by the user
    Custom,
}

impl RecommendationRef {
    pub fn is_custom(&self) -> bool {
        matches!(self, RecommendationRef::Custom)
    }

    pub fn as_str(&self) -> &str {
        match self {
            RecommendationRef::Linked(id) => id,
            RecommendationRef::Custom => CUSTOM_RECOMMENDATION,
        }
    }
}

impl From<String> for RecommendationRef {
    fn from(value: String) -> Self {
        if value.is_empty() || value == CUSTOM_RECOMMENDATION {
            RecommendationRef::Custom
        } else {
            RecommendationRef::Linked(value)
        }
    }
}

impl From<RecommendationRef> for String {
    fn from(value: RecommendationRef) -> Self {
        match value {
            RecommendationRef::Linked(id) => id,
            RecommendationRef::Custom => CUSTOM_RECOMMENDATION.to_string(),
        }
    }
}

/// A recurring dose reminder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSchedule {
    pub id: String,
    pub user_id: Option<String>,
    pub recommendation: RecommendationRef,
    /// Doses per day
    pub frequency_per_day: Option<u32>,
    /// Dose times; only the time of day is meaningful. Unparseable entries
    /// are kept as `None` so later indices keep their position.
    pub times: Vec<Option<DateTime<FixedOffset>>>,
    pub duration_days: Option<u32>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub note: Option<String>,
}

impl ReminderSchedule {
    /// Coerce a store document into a reminder.
    ///
    /// Returns `None` only when the document is not an object or has no id.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let obj = doc.as_object()?;
        let id = document_id(doc)?;

        let times = match obj.get("times") {
            Some(Value::Array(items)) => items.iter().map(timestamp).collect(),
            _ => Vec::new(),
        };

        Some(Self {
            id,
            user_id: string_field(doc, "userId"),
            recommendation: string_field(doc, "recommendationId")
                .map(RecommendationRef::from)
                .unwrap_or(RecommendationRef::Custom),
            frequency_per_day: positive_int(doc, "frequencyPerDay"),
            times,
            duration_days: positive_int(doc, "durationDays"),
            start_date: obj.get("startDate").and_then(timestamp),
            note: string_field(doc, "note"),
        })
    }

    /// First and last active calendar dates in the given zone.
    ///
    /// `None` when the start date or duration is missing. An end past the
    /// calendar's range saturates to [`NaiveDate::MAX`].
    pub fn active_dates<Tz: TimeZone>(&self, tz: &Tz) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date?.with_timezone(tz).date_naive();
        let span = u64::from(self.duration_days?).checked_sub(1)?;
        let end = start
            .checked_add_days(chrono::Days::new(span))
            .unwrap_or(NaiveDate::MAX);
        Some((start, end))
    }

    /// Doses this reminder expects on `date`, zero when inactive or malformed.
    pub fn expected_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> u32 {
        let Some(frequency) = self.frequency_per_day else {
            return 0;
        };
        match self.active_dates(tz) {
            Some((start, end)) if start <= date && date <= end => frequency,
            _ => 0,
        }
    }

    /// Whether `now` lies between the raw start instant and the end of the
    /// last active day.
    pub fn is_active_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let Some(start) = self.start_date else {
            return false;
        };
        let Some((_, end)) = self.active_dates(&now.timezone()) else {
            return false;
        };
        start <= now.fixed_offset() && now.date_naive() <= end
    }
}

/// One "dose taken" record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeLogEntry {
    pub id: String,
    pub user_id: Option<String>,
    pub reminder_id: Option<String>,
    pub recommendation_id: Option<String>,
    /// Index into the reminder's `times`
    pub time_index: Option<usize>,
    pub taken_at: Option<DateTime<FixedOffset>>,
    /// Store-assigned creation time (`$createdAt`)
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl IntakeLogEntry {
    /// Coerce a store document into a log entry.
    ///
    /// Returns `None` only when the document is not an object or has no id.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let obj = doc.as_object()?;
        let id = document_id(doc)?;

        Some(Self {
            id,
            user_id: string_field(doc, "userId"),
            reminder_id: string_field(doc, "reminderId"),
            recommendation_id: string_field(doc, "recommendationId"),
            time_index: index_field(doc, "timeIndex"),
            taken_at: obj.get("takenAt").and_then(timestamp),
            created_at: obj.get("$createdAt").and_then(timestamp),
        })
    }

    /// Serialize back into the store's document shape.
    pub fn to_document(&self) -> Value {
        let mut doc = serde_json::Map::new();
        doc.insert("$id".into(), Value::String(self.id.clone()));
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                doc.insert(key.into(), value);
            }
        };
        put("userId", self.user_id.clone().map(Value::String));
        put("reminderId", self.reminder_id.clone().map(Value::String));
        put(
            "recommendationId",
            self.recommendation_id.clone().map(Value::String),
        );
        put("timeIndex", self.time_index.map(|i| Value::from(i as u64)));
        put("takenAt", self.taken_at.map(|t| Value::String(t.to_rfc3339())));
        put(
            "$createdAt",
            self.created_at.map(|t| Value::String(t.to_rfc3339())),
        );
        Value::Object(doc)
    }

    /// Instant the entry was logged: creation time, falling back to `takenAt`.
    pub fn logged_at(&self) -> Option<DateTime<FixedOffset>> {
        self.created_at.or(self.taken_at)
    }
}

/// Read a batch of reminder documents.
///
/// Accepts a bare JSON array or a list response (`{ "documents": [...] }`).
/// Entries without an id are dropped.
pub fn ingest_reminders(value: &Value) -> Result<Vec<ReminderSchedule>, IngestError> {
    Ok(documents(value)?
        .iter()
        .filter_map(|doc| {
            let reminder = ReminderSchedule::from_document(doc);
            if reminder.is_none() {
                tracing::debug!("dropping reminder document without id");
            }
            reminder
        })
        .collect())
}

/// Read a batch of intake-log documents. Same shapes as [`ingest_reminders`].
pub fn ingest_logs(value: &Value) -> Result<Vec<IntakeLogEntry>, IngestError> {
    Ok(documents(value)?
        .iter()
        .filter_map(|doc| {
            let entry = IntakeLogEntry::from_document(doc);
            if entry.is_none() {
                tracing::debug!("dropping intake log document without id");
            }
            entry
        })
        .collect())
}

/// Parse and ingest a reminder export given as JSON text.
pub fn parse_reminders(text: &str) -> crate::error::Result<Vec<ReminderSchedule>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(ingest_reminders(&value)?)
}

/// Parse and ingest an intake-log export given as JSON text.
pub fn parse_logs(text: &str) -> crate::error::Result<Vec<IntakeLogEntry>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(ingest_logs(&value)?)
}

pub(crate) fn documents(value: &Value) -> Result<&Vec<Value>, IngestError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(obj) => match obj.get("documents") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(IngestError::UnexpectedShape("an object without 'documents'")),
        },
        Value::Null => Err(IngestError::UnexpectedShape("null")),
        Value::Bool(_) => Err(IngestError::UnexpectedShape("a boolean")),
        Value::Number(_) => Err(IngestError::UnexpectedShape("a number")),
        Value::String(_) => Err(IngestError::UnexpectedShape("a string")),
    }
}

pub(crate) fn document_id(doc: &Value) -> Option<String> {
    string_field(doc, "$id").or_else(|| string_field(doc, "id"))
}

pub(crate) fn string_field(doc: &Value, key: &str) -> Option<String> {
    match doc.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn non_negative_int(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn positive_int(doc: &Value, key: &str) -> Option<u32> {
    non_negative_int(doc.get(key)?)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn index_field(doc: &Value, key: &str) -> Option<usize> {
    non_negative_int(doc.get(key)?).and_then(|n| usize::try_from(n).ok())
}

/// Parse an RFC 3339 timestamp, a bare `YYYY-MM-DD` date (UTC midnight) or
/// epoch milliseconds.
pub fn timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s).ok().or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| Utc.from_utc_datetime(&dt).fixed_offset())
            })
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|dt| dt.fixed_offset()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reminder_from_store_document() {
        let doc = json!({
            "$id": "rem-1",
            "userId": "user-1",
            "recommendationId": "rec-9",
            "frequencyPerDay": 2,
            "times": ["2024-03-01T08:00:00.000Z", "2024-03-01T20:00:00.000Z"],
            "durationDays": "7",
            "startDate": "2024-03-01T07:30:00.000Z",
            "note": "after meals"
        });

        let reminder = ReminderSchedule::from_document(&doc).unwrap();
        assert_eq!(reminder.id, "rem-1");
        assert_eq!(reminder.user_id.as_deref(), Some("user-1"));
        assert_eq!(reminder.recommendation, RecommendationRef::Linked("rec-9".into()));
        assert_eq!(reminder.frequency_per_day, Some(2));
        assert_eq!(reminder.duration_days, Some(7));
        assert_eq!(reminder.times.len(), 2);
        assert!(reminder.times.iter().all(Option::is_some));
        assert_eq!(reminder.note.as_deref(), Some("after meals"));
    }

    #[test]
    fn missing_recommendation_is_custom() {
        let reminder = ReminderSchedule::from_document(&json!({"$id": "r"})).unwrap();
        assert!(reminder.recommendation.is_custom());

        let reminder =
            ReminderSchedule::from_document(&json!({"$id": "r", "recommendationId": "custom"}))
                .unwrap();
        assert!(reminder.recommendation.is_custom());
    }

    #[test]
    fn malformed_fields_become_none() {
        let doc = json!({
            "$id": "rem-2",
            "frequencyPerDay": 0,
            "durationDays": "seven",
            "startDate": "yesterday",
            "times": ["08:00", "2024-03-01T20:00:00Z", null]
        });

        let reminder = ReminderSchedule::from_document(&doc).unwrap();
        assert_eq!(reminder.frequency_per_day, None);
        assert_eq!(reminder.duration_days, None);
        assert_eq!(reminder.start_date, None);
        assert_eq!(reminder.times.len(), 3);
        assert!(reminder.times[0].is_none());
        assert!(reminder.times[1].is_some());
        assert!(reminder.times[2].is_none());
    }

    #[test]
    fn documents_without_id_are_dropped() {
        let batch = json!([{"$id": "a"}, {"userId": "u"}, 42, {"id": "b"}]);
        let reminders = ingest_reminders(&batch).unwrap();
        let ids: Vec<_> = reminders.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn accepts_list_response_shape() {
        let batch = json!({"total": 1, "documents": [{"$id": "log-1", "timeIndex": 0}]});
        let logs = ingest_logs(&batch).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].time_index, Some(0));
    }

    #[test]
    fn rejects_non_collection_input() {
        assert!(ingest_logs(&json!("nope")).is_err());
        assert!(ingest_logs(&json!({"items": []})).is_err());
    }

    #[test]
    fn parse_errors_map_to_core_error() {
        use crate::error::CoreError;

        assert_eq!(parse_reminders(r#"[{"$id": "a"}]"#).unwrap().len(), 1);
        assert!(matches!(parse_logs("{not json"), Err(CoreError::Json(_))));
        assert!(matches!(parse_logs("42"), Err(CoreError::Ingest(_))));
    }

    #[test]
    fn timestamp_formats() {
        assert!(timestamp(&json!("2024-03-01T08:00:00+09:00")).is_some());
        assert!(timestamp(&json!("2024-03-01")).is_some());
        assert!(timestamp(&json!(1_709_280_000_000_i64)).is_some());
        assert!(timestamp(&json!("not a date")).is_none());
        assert!(timestamp(&json!(true)).is_none());
    }

    #[test]
    fn active_dates_span_duration() {
        let doc = json!({
            "$id": "r",
            "durationDays": 3,
            "frequencyPerDay": 1,
            "startDate": "2024-03-01T07:30:00Z"
        });
        let reminder = ReminderSchedule::from_document(&doc).unwrap();
        let (start, end) = reminder.active_dates(&Utc).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(reminder.expected_on(end, &Utc), 1);
        assert_eq!(reminder.expected_on(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), &Utc), 0);
    }

    #[test]
    fn active_dates_saturate_at_calendar_end() {
        let doc = json!({
            "$id": "r",
            "durationDays": u32::MAX,
            "frequencyPerDay": 1,
            "startDate": "2024-03-01T07:30:00Z"
        });
        let reminder = ReminderSchedule::from_document(&doc).unwrap();
        let (_, end) = reminder.active_dates(&Utc).unwrap();
        assert_eq!(end, NaiveDate::MAX);
        assert_eq!(reminder.expected_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(), &Utc), 1);
        assert!(reminder.is_active_at(&Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn is_active_uses_raw_start_and_end_of_day() {
        let doc = json!({
            "$id": "r",
            "durationDays": 2,
            "frequencyPerDay": 1,
            "startDate": "2024-03-01T09:00:00Z"
        });
        let reminder = ReminderSchedule::from_document(&doc).unwrap();
        let before_start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let last_minute = Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap();
        assert!(!reminder.is_active_at(&before_start));
        assert!(reminder.is_active_at(&last_minute));
        assert!(!reminder.is_active_at(&next_day));
    }

    #[test]
    fn log_document_roundtrip_keeps_store_keys() {
        let doc = json!({
            "$id": "log-1",
            "userId": "u",
            "reminderId": "rem-1",
            "recommendationId": "rec-1",
            "timeIndex": "1",
            "takenAt": "2024-03-01T08:05:00Z",
            "$createdAt": "2024-03-01T08:05:01Z"
        });
        let entry = IntakeLogEntry::from_document(&doc).unwrap();
        assert_eq!(entry.time_index, Some(1));
        assert_eq!(entry.logged_at(), entry.created_at);

        let back = entry.to_document();
        assert_eq!(back["$id"], "log-1");
        assert_eq!(back["reminderId"], "rem-1");
        assert_eq!(back["timeIndex"], 1);
        assert_eq!(IntakeLogEntry::from_document(&back).unwrap(), entry);
    }
}
