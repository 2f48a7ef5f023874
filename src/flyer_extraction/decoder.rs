//! Response decoding and draft population
//!
//! Decoding runs in three steps: strip the formatting the collaborator
//! wraps around its JSON, parse, then check the shape. Parse failures and
//! shape failures stay separate variants of [`DecodeError`].

use super::types::{ExtractedEvent, ExtractionResponse};
use crate::event_store::{parse_event_date, parse_event_time, EventDraft, TBD};
use crate::models::{Category, Eligibility, VerificationTier};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Decoding failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("response text is empty")]
    Empty,

    #[error("response is not valid JSON: {0}")]
    Unparseable(String),

    #[error("response JSON is not an object")]
    NotAnObject,

    #[error("unknown error sentinel: {0:?}")]
    UnknownSentinel(String),

    #[error("field {0} must be a string")]
    InvalidType(&'static str),

    #[error("category {0:?} is not a known category")]
    UnknownCategory(String),
}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").ok())
        .as_ref()
}

/// Remove code fences and any prose around the outermost JSON object
pub fn strip_wrapping(text: &str) -> &str {
    let text = text.trim();
    let fenced = fence_pattern().and_then(|p| p.captures(text)).and_then(|c| c.get(1));
    let text = match fenced {
        Some(inner) => inner.as_str(),
        None => text,
    };

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text.trim(),
    }
}

/// Decode collaborator text into one of the three response shapes
pub fn decode_response(text: &str) -> Result<ExtractionResponse, DecodeError> {
    let body = strip_wrapping(text);
    if body.is_empty() {
        return Err(DecodeError::Empty);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| DecodeError::Unparseable(e.to_string()))?;
    let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

    if let Some(sentinel) = object.get("error") {
        return match sentinel.as_str() {
            Some("not_event") => Ok(ExtractionResponse::NotEvent),
            Some("unreadable") => Ok(ExtractionResponse::Unreadable),
            Some(other) => Err(DecodeError::UnknownSentinel(other.to_string())),
            None => Err(DecodeError::UnknownSentinel(sentinel.to_string())),
        };
    }

    let title = optional_text(object, "title")?.unwrap_or_else(|| TBD.to_string());

    let category = match optional_text(object, "category")? {
        None => None,
        Some(c) if c == TBD => None,
        Some(c) => Some(
            c.parse::<Category>()
                .map_err(|_| DecodeError::UnknownCategory(c.clone()))?,
        ),
    };

    Ok(ExtractionResponse::Event(ExtractedEvent {
        title,
        date: optional_text(object, "date")?,
        time: optional_text(object, "time")?,
        location: optional_text(object, "location")?,
        description: optional_text(object, "description")?,
        category,
    }))
}

/// Absent, null and blank all read as `None`
fn optional_text(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, DecodeError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(_) => Err(DecodeError::InvalidType(key)),
    }
}

/// Build the draft an accepted extraction produces.
///
/// Every field is replaced: unusable dates become `today`, missing text
/// becomes `TBD`. Category falls back to what the draft already had.
/// Eligibility is always `All Students`; the tier comes from the creator.
pub fn apply_to_draft(
    extracted: &ExtractedEvent,
    current: &EventDraft,
    tier: VerificationTier,
    today: NaiveDate,
) -> EventDraft {
    let date = extracted
        .date
        .as_deref()
        .and_then(parse_event_date)
        .unwrap_or(today);

    let time = extracted
        .time
        .as_deref()
        .and_then(parse_event_time)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| TBD.to_string());

    let or_tbd = |field: &Option<String>| field.clone().unwrap_or_else(|| TBD.to_string());

    EventDraft {
        title: extracted.title.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        time,
        location: or_tbd(&extracted.location),
        description: or_tbd(&extracted.description),
        category: extracted.category.unwrap_or(current.category),
        eligibility: Eligibility::AllStudents,
        verification_tier: Some(tier),
    }
}
