//! Flyer extraction types

use crate::event_store::EventDraft;
use crate::models::Category;
use serde::Serialize;
use std::path::PathBuf;

/// Pipeline state for the upload slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionPhase {
    #[default]
    Idle,
    Encoding,
    AwaitingExtraction,
    Accepted,
    RejectedNotAnEvent,
    RejectedUnreadable,
    RejectedMalformedResponse,
    RejectedTransportFailure,
}

/// Why an extraction attempt was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionRejection {
    /// Collaborator says the image is not an event flyer
    #[error("image is not an event flyer")]
    NotAnEvent,

    /// Collaborator could not read the image
    #[error("flyer is unreadable")]
    Unreadable,

    /// Response parsed badly or failed structural validation
    #[error("malformed extraction response: {reason}")]
    MalformedResponse { reason: String },

    /// Encoding, network, status, envelope or timeout failure
    #[error("extraction transport failure: {reason}")]
    TransportFailure { reason: String },
}

impl ExtractionRejection {
    pub fn phase(&self) -> ExtractionPhase {
        match self {
            ExtractionRejection::NotAnEvent => ExtractionPhase::RejectedNotAnEvent,
            ExtractionRejection::Unreadable => ExtractionPhase::RejectedUnreadable,
            ExtractionRejection::MalformedResponse { .. } => {
                ExtractionPhase::RejectedMalformedResponse
            }
            ExtractionRejection::TransportFailure { .. } => {
                ExtractionPhase::RejectedTransportFailure
            }
        }
    }

    pub(crate) fn transport(reason: impl Into<String>) -> Self {
        ExtractionRejection::TransportFailure {
            reason: reason.into(),
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Draft fully populated; the value is the new editable fields
    Accepted(EventDraft),
    /// Draft untouched
    Rejected(ExtractionRejection),
    /// A newer upload took the slot; this response was discarded
    Superseded,
}

/// Raw flyer input
#[derive(Debug, Clone)]
pub enum FlyerSource {
    /// In-memory image with declared media type
    Bytes { data: Vec<u8>, media_type: String },
    /// Image file; media type comes from the extension
    File(PathBuf),
}

/// Transport-safe flyer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFlyer {
    pub media_type: String,
    /// Standard base64
    pub data: String,
}

/// What is sent to the extraction collaborator
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub image: EncodedFlyer,
    pub instruction: String,
}

/// Event fields read from a flyer (untrusted)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedEvent {
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// One of the three accepted response shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResponse {
    Event(ExtractedEvent),
    NotEvent,
    Unreadable,
}
