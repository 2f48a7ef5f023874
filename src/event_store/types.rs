//! Event Store data types

use crate::account_store::Account;
use crate::authorization::resolve_verification_tier;
use crate::error::{Error, Result};
use crate::models::{AccountKind, Category, Eligibility, VerificationTier};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Placeholder for text the flyer did not provide
pub const TBD: &str = "TBD";

/// Event identifier (monotonic, never reused)
pub type EventId = u64;

/// Canonical event record
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_hhmm")]
    pub time: Option<NaiveTime>,
    pub location: String,
    pub description: String,
    pub category: Category,
    pub eligibility: Eligibility,
    pub verification_tier: VerificationTier,
    /// Creator's username
    pub created_by: String,
    /// Creator's kind at creation time
    pub account_type: AccountKind,
    pub flag_count: u32,
    /// Base64 flyer, attached only through extraction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flyer_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fully-validated input for [`super::EventStore::insert`]
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: String,
    pub description: String,
    pub category: Category,
    pub eligibility: Eligibility,
    pub verification_tier: VerificationTier,
    pub created_by: String,
    pub account_type: AccountKind,
    pub flyer_image: Option<String>,
}

impl NewEvent {
    /// Validate a draft and stamp it with the creator's identity and tier.
    ///
    /// Title and date are required. A time of `""` or `TBD` means no time.
    /// The result carries no flyer image; see [`NewEvent::with_flyer_image`].
    pub fn from_draft(draft: &EventDraft, creator: &Account) -> Result<Self> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Title and date are required".to_string()));
        }

        let date_text = draft.date.trim();
        if date_text.is_empty() {
            return Err(Error::Validation("Title and date are required".to_string()));
        }
        let date = parse_event_date(date_text).ok_or_else(|| {
            Error::Validation(format!("Date must be YYYY-MM-DD, got \"{}\"", date_text))
        })?;

        let time_text = draft.time.trim();
        let time = if time_text.is_empty() || time_text == TBD {
            None
        } else {
            Some(parse_event_time(time_text).ok_or_else(|| {
                Error::Validation(format!("Time must be HH:MM (24-hour), got \"{}\"", time_text))
            })?)
        };

        Ok(Self {
            title: title.to_string(),
            date,
            time,
            location: draft.location.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: draft.category,
            eligibility: draft.eligibility,
            verification_tier: resolve_verification_tier(creator),
            created_by: creator.username.clone(),
            account_type: creator.kind,
            flyer_image: None,
        })
    }

    /// Attach the image accepted by the flyer pipeline
    pub(crate) fn with_flyer_image(mut self, flyer_image: Option<String>) -> Self {
        self.flyer_image = flyer_image;
        self
    }
}

/// Event under construction (form state)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, empty, or `TBD`
    pub time: String,
    pub location: String,
    pub description: String,
    pub category: Category,
    pub eligibility: Eligibility,
    /// Tier preview; recomputed from the creator on submit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_tier: Option<VerificationTier>,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            date: String::new(),
            time: String::new(),
            location: String::new(),
            description: String::new(),
            category: Category::Cultural,
            eligibility: Eligibility::AllStudents,
            verification_tier: None,
        }
    }
}

/// The editable draft plus the flyer image accepted for it.
///
/// Callers edit `fields`; only the flyer pipeline sets the image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftState {
    fields: EventDraft,
    flyer_image: Option<String>,
}

impl DraftState {
    pub fn fields(&self) -> &EventDraft {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut EventDraft {
        &mut self.fields
    }

    /// Image from the last accepted extraction, if any
    pub fn flyer_image(&self) -> Option<&str> {
        self.flyer_image.as_deref()
    }

    /// Replace everything with an accepted extraction
    pub(crate) fn accept(&mut self, fields: EventDraft, flyer_image: String) {
        self.fields = fields;
        self.flyer_image = Some(flyer_image);
    }

    /// Validate for `creator`, attaching the accepted image
    pub fn to_new_event(&self, creator: &Account) -> Result<NewEvent> {
        Ok(NewEvent::from_draft(&self.fields, creator)?.with_flyer_image(self.flyer_image.clone()))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Strict `YYYY-MM-DD`
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Strict 24-hour `HH:MM`
pub fn parse_event_time(s: &str) -> Option<NaiveTime> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn serialize_hhmm<S: Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match time {
        Some(t) => serializer.serialize_some(&t.format("%H:%M").to_string()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_store::StoredCredential;

    fn club(verified: bool) -> Account {
        Account {
            username: "dance".to_string(),
            credential: StoredCredential::new("pw"),
            email: "dance@campus.edu".to_string(),
            kind: AccountKind::Club,
            club_name: Some("Dance Club".to_string()),
            verified,
            created_at: Utc::now(),
        }
    }

    fn draft() -> EventDraft {
        EventDraft {
            title: "Salsa Workshop".to_string(),
            date: "2025-11-05".to_string(),
            time: "19:30".to_string(),
            location: "Gym B".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_date_parsing_is_strict() {
        assert!(parse_event_date("2025-11-05").is_some());
        assert!(parse_event_date("2025-1-5").is_none());
        assert!(parse_event_date("11/05/2025").is_none());
        assert!(parse_event_date("2025-02-30").is_none());
    }

    #[test]
    fn test_time_parsing_is_strict() {
        assert_eq!(
            parse_event_time("18:15"),
            NaiveTime::from_hms_opt(18, 15, 0)
        );
        assert!(parse_event_time("6:15").is_none());
        assert!(parse_event_time("24:00").is_none());
        assert!(parse_event_time("6 PM").is_none());
    }

    #[test]
    fn test_from_draft_requires_title_and_date() {
        let mut d = draft();
        d.title = "   ".to_string();
        assert!(matches!(NewEvent::from_draft(&d, &club(false)), Err(Error::Validation(_))));

        let mut d = draft();
        d.date.clear();
        assert!(matches!(NewEvent::from_draft(&d, &club(false)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_from_draft_tbd_time_means_none() {
        let mut d = draft();
        d.time = TBD.to_string();
        let event = NewEvent::from_draft(&d, &club(false)).unwrap();
        assert!(event.time.is_none());
    }

    #[test]
    fn test_from_draft_ignores_previewed_tier() {
        let mut d = draft();
        d.verification_tier = Some(VerificationTier::Official);
        let event = NewEvent::from_draft(&d, &club(false)).unwrap();
        assert_eq!(event.verification_tier, VerificationTier::StudentPosted);
        assert_eq!(event.account_type, AccountKind::Club);

        let event = NewEvent::from_draft(&draft(), &club(true)).unwrap();
        assert_eq!(event.verification_tier, VerificationTier::Official);
    }

    #[test]
    fn test_flyer_image_only_from_accepted_extraction() {
        let forged: EventDraft = serde_json::from_str(
            r#"{"title":"Salsa Workshop","date":"2025-11-05","time":"19:30","location":"Gym B","description":"","category":"Arts","eligibility":"All Students","flyer_image":"forged"}"#,
        )
        .unwrap();
        assert!(NewEvent::from_draft(&forged, &club(false)).unwrap().flyer_image.is_none());

        let mut state = DraftState::default();
        *state.fields_mut() = draft();
        assert!(state.to_new_event(&club(false)).unwrap().flyer_image.is_none());

        state.accept(draft(), "data:image/png;base64,aW1n".to_string());
        let event = state.to_new_event(&club(false)).unwrap();
        assert_eq!(event.flyer_image.as_deref(), Some("data:image/png;base64,aW1n"));

        state.reset();
        assert_eq!(state, DraftState::default());
    }
}
