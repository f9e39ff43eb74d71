//! Herbal recommendations.
//!
//! Two sources feed this module. The language model's free-text reply holds
//! one herb per paragraph:
//!
//! ```text
//! Herb: Ginger
//! Effect: Reduces inflammation
//! Dosage: 1 tsp grated root in hot water, twice daily
//! ```
//!
//! Accepted recommendations are stored as documents whose `recommendations`
//! field holds a JSON array of herbs as text.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IngestError;
use crate::records::{document_id, documents, string_field, timestamp};

/// One suggested herb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HerbalRecommendation {
    pub herb: String,
    pub effect: String,
    pub dosage: String,
}

/// A stored recommendation: the symptoms a user reported and the herbs they accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub symptoms: Vec<String>,
    pub custom_symptoms: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub herbs: Vec<HerbalRecommendation>,
}

impl RecommendationRecord {
    /// Coerce a store document into a record.
    ///
    /// Returns `None` only when the document is not an object or has no id.
    /// An unreadable `recommendations` field leaves `herbs` empty.
    pub fn from_document(doc: &Value) -> Option<Self> {
        let obj = doc.as_object()?;
        let id = document_id(doc)?;

        let symptoms = match obj.get("symptoms") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|s| s.as_str())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        let herbs = match obj.get("recommendations") {
            Some(Value::String(text)) => match serde_json::from_str::<Value>(text) {
                Ok(value) => herbs_from_json(&value),
                Err(e) => {
                    tracing::debug!(recommendation_id = %id, error = %e, "unreadable recommendations text");
                    Vec::new()
                }
            },
            Some(value @ Value::Array(_)) => herbs_from_json(value),
            _ => Vec::new(),
        };

        Some(Self {
            id,
            user_id: string_field(doc, "userId"),
            symptoms,
            custom_symptoms: string_field(doc, "customSymptoms"),
            created_at: obj
                .get("createdAt")
                .or_else(|| obj.get("$createdAt"))
                .and_then(timestamp),
            herbs,
        })
    }
}

/// Pull herbs out of the model's paragraph-per-herb reply.
///
/// Paragraphs are separated by blank lines. Within a paragraph the first line
/// starting with each of `herb:`, `effect:` and `dosage:` (any case) supplies
/// that field; paragraphs missing any of the three are dropped.
pub fn parse_recommendation(raw: &str) -> Vec<HerbalRecommendation> {
    paragraphs(raw)
        .into_iter()
        .filter_map(|lines| {
            let field = |label: &str| {
                lines
                    .iter()
                    .find_map(|line| strip_label(line, label))
                    .map(|rest| rest.trim().to_string())
            };
            Some(HerbalRecommendation {
                herb: field("herb:")?,
                effect: field("effect:")?,
                dosage: field("dosage:")?,
            })
        })
        .collect()
}

/// Read a model reply in either shape: a JSON array of herbs, optionally
/// wrapped in a Markdown code fence, or the paragraph format.
pub fn parse_recommendation_reply(raw: &str) -> Vec<HerbalRecommendation> {
    let cleaned = strip_code_fence(raw);
    match serde_json::from_str::<Value>(cleaned) {
        Ok(value @ Value::Array(_)) => herbs_from_json(&value),
        _ => parse_recommendation(raw),
    }
}

/// Read a batch of recommendation documents.
///
/// Accepts a bare JSON array or a list response (`{ "documents": [...] }`).
pub fn ingest_recommendations(value: &Value) -> Result<Vec<RecommendationRecord>, IngestError> {
    Ok(documents(value)?
        .iter()
        .filter_map(|doc| {
            let record = RecommendationRecord::from_document(doc);
            if record.is_none() {
                tracing::debug!("dropping recommendation document without id");
            }
            record
        })
        .collect())
}

/// Parse and ingest a recommendation export given as JSON text.
pub fn parse_recommendations(text: &str) -> crate::error::Result<Vec<RecommendationRecord>> {
    let value: Value = serde_json::from_str(text)?;
    Ok(ingest_recommendations(&value)?)
}

fn herbs_from_json(value: &Value) -> Vec<HerbalRecommendation> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Lines grouped into paragraphs; runs of empty lines separate them.
fn paragraphs(raw: &str) -> Vec<Vec<&str>> {
    let mut blocks = vec![Vec::new()];
    let mut lines = raw.split('\n').peekable();
    while let Some(line) = lines.next() {
        if line.is_empty() {
            while lines.next_if(|l| l.is_empty()).is_some() {}
            blocks.push(Vec::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }
    blocks.retain(|b| !b.is_empty());
    blocks
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let head = line.get(..label.len())?;
    head.eq_ignore_ascii_case(label).then(|| &line[label.len()..])
}

fn strip_code_fence(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
