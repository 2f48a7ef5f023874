//! FlyerExtraction - Flyer to Draft Pipeline
//!
//! ## Responsibilities
//!
//! - Encode the uploaded image for transport
//! - One request to the extraction collaborator, bounded by a timeout
//! - Decode and validate the untrusted reply
//! - Populate the draft on acceptance, leave it alone otherwise
//!
//! ## Phases
//!
//! `Idle -> Encoding -> AwaitingExtraction -> Accepted | Rejected* -> Idle`
//!
//! A new upload supersedes a pending one. The older run's reply is dropped
//! when it arrives and that run reports [`ExtractionOutcome::Superseded`].

mod client;
mod decoder;
mod encoder;
mod slot;
mod types;

pub use client::{ExtractionCollaborator, TransportError, VisionClient, EXTRACTION_INSTRUCTION};
pub use decoder::{apply_to_draft, decode_response, strip_wrapping, DecodeError};
pub use encoder::{encode, media_type_for_path, EncodeError, MAX_IMAGE_BYTES, SUPPORTED_MEDIA_TYPES};
pub use slot::{UploadSlot, UploadTicket};
pub use types::*;

use crate::account_store::Account;
use crate::authorization::resolve_verification_tier;
use crate::error::{Error, Result};
use crate::event_store::DraftState;
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Flyer extraction pipeline bound to one upload slot
pub struct FlyerPipeline {
    collaborator: Arc<dyn ExtractionCollaborator>,
    slot: UploadSlot,
    timeout: Duration,
    today: fn() -> NaiveDate,
}

impl FlyerPipeline {
    pub fn new(collaborator: Arc<dyn ExtractionCollaborator>, timeout: Duration) -> Self {
        Self {
            collaborator,
            slot: UploadSlot::new(),
            timeout,
            today: local_today,
        }
    }

    /// Replace the clock used for the missing-date default
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn slot(&self) -> &UploadSlot {
        &self.slot
    }

    /// Run one upload through the pipeline.
    ///
    /// Fails with `Unauthenticated` before touching the slot when there is
    /// no creator. Every other failure is reported as an outcome.
    pub async fn run(
        &self,
        creator: Option<&Account>,
        source: FlyerSource,
        draft: &RwLock<DraftState>,
    ) -> Result<ExtractionOutcome> {
        let creator = creator.ok_or(Error::Unauthenticated)?;

        let ticket = self.slot.begin().await;
        tracing::debug!(
            generation = ticket.generation(),
            username = %creator.username,
            "Flyer upload: encoding"
        );

        let encoded = match encode(source).await {
            Ok(encoded) => encoded,
            Err(e) => {
                let rejection = ExtractionRejection::transport(e.to_string());
                return Ok(self.reject(ticket, rejection).await);
            }
        };

        let preview = format!("data:{};base64,{}", encoded.media_type, encoded.data);
        if !self.slot.attach_preview(ticket, preview.clone()).await
            || !self
                .slot
                .set_phase(ticket, ExtractionPhase::AwaitingExtraction)
                .await
        {
            return Ok(self.superseded(ticket));
        }
        tracing::debug!(generation = ticket.generation(), "Flyer upload: awaiting extraction");

        let request = ExtractionRequest::new(encoded);
        let reply = tokio::time::timeout(self.timeout, self.collaborator.extract(&request)).await;

        let text = match reply {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                let rejection = ExtractionRejection::transport(e.to_string());
                return Ok(self.reject(ticket, rejection).await);
            }
            Err(_) => {
                let rejection = ExtractionRejection::transport(format!(
                    "no reply within {}s",
                    self.timeout.as_secs_f64()
                ));
                return Ok(self.reject(ticket, rejection).await);
            }
        };

        let extracted = match decode_response(&text) {
            Ok(ExtractionResponse::Event(extracted)) => extracted,
            Ok(ExtractionResponse::NotEvent) => {
                return Ok(self.reject(ticket, ExtractionRejection::NotAnEvent).await)
            }
            Ok(ExtractionResponse::Unreadable) => {
                return Ok(self.reject(ticket, ExtractionRejection::Unreadable).await)
            }
            Err(e) => {
                let rejection = ExtractionRejection::MalformedResponse {
                    reason: e.to_string(),
                };
                return Ok(self.reject(ticket, rejection).await);
            }
        };

        let Some(guard) = self.slot.conclude(ticket).await else {
            return Ok(self.superseded(ticket));
        };

        let tier = resolve_verification_tier(creator);
        let mut current = draft.write().await;
        let populated = apply_to_draft(&extracted, current.fields(), tier, (self.today)());
        current.accept(populated.clone(), preview);
        drop(current);
        guard.finish(ExtractionPhase::Accepted);

        tracing::info!(
            generation = ticket.generation(),
            username = %creator.username,
            title = %populated.title,
            "Flyer extraction accepted"
        );

        Ok(ExtractionOutcome::Accepted(populated))
    }

    async fn reject(&self, ticket: UploadTicket, rejection: ExtractionRejection) -> ExtractionOutcome {
        match self.slot.conclude(ticket).await {
            Some(guard) => {
                guard.finish(rejection.phase());
                tracing::warn!(
                    generation = ticket.generation(),
                    phase = ?rejection.phase(),
                    reason = %rejection,
                    "Flyer extraction rejected"
                );
                ExtractionOutcome::Rejected(rejection)
            }
            None => self.superseded(ticket),
        }
    }

    fn superseded(&self, ticket: UploadTicket) -> ExtractionOutcome {
        tracing::debug!(
            generation = ticket.generation(),
            "Discarding reply for superseded upload"
        );
        ExtractionOutcome::Superseded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_store::{AccountStore, RegisterRequest};
    use crate::event_store::EventDraft;
    use crate::models::{Category, Eligibility, VerificationTier};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replies in order; each entry may wait before answering
    struct ScriptedCollaborator {
        replies: Mutex<VecDeque<(Duration, std::result::Result<String, String>)>>,
        calls: AtomicUsize,
    }

    impl ScriptedCollaborator {
        fn new(replies: Vec<(Duration, std::result::Result<String, String>)>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn replying(text: &str) -> Arc<Self> {
            Self::new(vec![(Duration::ZERO, Ok(text.to_string()))])
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExtractionCollaborator for ScriptedCollaborator {
        async fn extract(
            &self,
            _request: &ExtractionRequest,
        ) -> std::result::Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.replies.lock().unwrap().pop_front();
            let (delay, reply) = next.unwrap_or((Duration::ZERO, Err("script exhausted".into())));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            reply.map_err(TransportError::Envelope)
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn pipeline(collaborator: Arc<ScriptedCollaborator>) -> FlyerPipeline {
        FlyerPipeline::new(collaborator, Duration::from_secs(5)).with_clock(fixed_today)
    }

    fn flyer() -> FlyerSource {
        FlyerSource::Bytes {
            data: b"flyer".to_vec(),
            media_type: "image/png".to_string(),
        }
    }

    async fn student() -> Account {
        AccountStore::new()
            .register(RegisterRequest::student("alice", "pw", "alice@campus.edu"))
            .await
            .unwrap()
    }

    fn edited_draft() -> RwLock<DraftState> {
        let mut state = DraftState::default();
        *state.fields_mut() = EventDraft {
            title: "Half-typed title".to_string(),
            location: "Library".to_string(),
            category: Category::Sports,
            eligibility: Eligibility::Juniors,
            ..EventDraft::default()
        };
        RwLock::new(state)
    }

    #[tokio::test]
    async fn test_not_event_leaves_draft_unchanged() {
        let collaborator = ScriptedCollaborator::replying(r#"{"error":"not_event"}"#);
        let pipeline = pipeline(collaborator.clone());
        let draft = edited_draft();
        let before = draft.read().await.clone();
        let alice = student().await;

        let outcome = pipeline.run(Some(&alice), flyer(), &draft).await.unwrap();

        assert_eq!(outcome, ExtractionOutcome::Rejected(ExtractionRejection::NotAnEvent));
        assert_eq!(*draft.read().await, before);
        assert_eq!(pipeline.slot().phase().await, ExtractionPhase::Idle);
        assert_eq!(
            pipeline.slot().last_outcome().await,
            Some(ExtractionPhase::RejectedNotAnEvent)
        );
        assert!(pipeline.slot().preview().await.is_none());
        assert_eq!(collaborator.calls(), 1);
    }

    #[tokio::test]
    async fn test_accepted_populates_draft() {
        let reply = "```json\n{\"title\":\"Diwali Night\",\"date\":\"2025-11-01\",\"time\":\"19:30\",\"location\":\"Student Union\",\"category\":\"Cultural\",\"eligibility\":\"Seniors\"}\n```";
        let pipeline = pipeline(ScriptedCollaborator::replying(reply));
        let draft = edited_draft();
        let alice = student().await;

        let outcome = pipeline.run(Some(&alice), flyer(), &draft).await.unwrap();

        let ExtractionOutcome::Accepted(populated) = outcome else {
            panic!("expected acceptance, got {:?}", outcome);
        };
        assert_eq!(*draft.read().await.fields(), populated);
        assert_eq!(populated.title, "Diwali Night");
        assert_eq!(populated.date, "2025-11-01");
        assert_eq!(populated.time, "19:30");
        assert_eq!(populated.description, "TBD");
        assert_eq!(populated.category, Category::Cultural);
        assert_eq!(populated.eligibility, Eligibility::AllStudents);
        assert_eq!(populated.verification_tier, Some(VerificationTier::StudentPosted));
        assert_eq!(
            draft.read().await.flyer_image(),
            Some("data:image/png;base64,Zmx5ZXI=")
        );
        assert_eq!(pipeline.slot().last_outcome().await, Some(ExtractionPhase::Accepted));
    }

    #[tokio::test]
    async fn test_missing_date_uses_today() {
        let pipeline = pipeline(ScriptedCollaborator::replying(r#"{"title":"Pop-up Market"}"#));
        let draft = RwLock::new(DraftState::default());
        let alice = student().await;

        pipeline.run(Some(&alice), flyer(), &draft).await.unwrap();
        assert_eq!(draft.read().await.fields().date, "2025-10-20");
    }

    #[tokio::test]
    async fn test_unreadable_and_malformed_are_distinct() {
        let alice = student().await;
        let draft = edited_draft();
        let before = draft.read().await.clone();

        let unreadable = pipeline(ScriptedCollaborator::replying(r#"{"error":"unreadable"}"#))
            .run(Some(&alice), flyer(), &draft)
            .await
            .unwrap();
        assert_eq!(unreadable, ExtractionOutcome::Rejected(ExtractionRejection::Unreadable));

        let malformed = pipeline(ScriptedCollaborator::replying(r#"{"title":"X","category":"Music"}"#))
            .run(Some(&alice), flyer(), &draft)
            .await
            .unwrap();
        assert!(matches!(
            malformed,
            ExtractionOutcome::Rejected(ExtractionRejection::MalformedResponse { .. })
        ));

        let garbage = pipeline(ScriptedCollaborator::replying("Sorry, I can't help with that."))
            .run(Some(&alice), flyer(), &draft)
            .await
            .unwrap();
        assert!(matches!(
            garbage,
            ExtractionOutcome::Rejected(ExtractionRejection::MalformedResponse { .. })
        ));

        assert_eq!(*draft.read().await, before);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let collaborator = ScriptedCollaborator::new(vec![
            (Duration::ZERO, Err("503 from upstream".to_string())),
            (Duration::ZERO, Ok(r#"{"title":"Should not be used"}"#.to_string())),
        ]);
        let pipeline = pipeline(collaborator.clone());
        let draft = edited_draft();
        let alice = student().await;

        let outcome = pipeline.run(Some(&alice), flyer(), &draft).await.unwrap();
        assert!(matches!(
            outcome,
            ExtractionOutcome::Rejected(ExtractionRejection::TransportFailure { .. })
        ));
        assert_eq!(collaborator.calls(), 1);
        assert_eq!(draft.read().await.fields().title, "Half-typed title");
    }

    #[tokio::test]
    async fn test_encoding_failure_skips_collaborator() {
        let collaborator = ScriptedCollaborator::replying(r#"{"title":"X"}"#);
        let pipeline = pipeline(collaborator.clone());
        let draft = edited_draft();
        let alice = student().await;

        let outcome = pipeline
            .run(
                Some(&alice),
                FlyerSource::File("/nonexistent/flyer.png".into()),
                &draft,
            )
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            ExtractionOutcome::Rejected(ExtractionRejection::TransportFailure { .. })
        ));
        assert_eq!(collaborator.calls(), 0);
        assert_eq!(
            pipeline.slot().last_outcome().await,
            Some(ExtractionPhase::RejectedTransportFailure)
        );
    }

    #[tokio::test]
    async fn test_oversize_flyer_is_transport_failure() {
        let collaborator = ScriptedCollaborator::replying(r#"{"title":"X"}"#);
        let pipeline = pipeline(collaborator.clone());
        let draft = edited_draft();
        let alice = student().await;

        let oversize = FlyerSource::Bytes {
            data: vec![0u8; MAX_IMAGE_BYTES + 1],
            media_type: "image/jpeg".to_string(),
        };
        let outcome = pipeline.run(Some(&alice), oversize, &draft).await.unwrap();
        assert!(matches!(
            outcome,
            ExtractionOutcome::Rejected(ExtractionRejection::TransportFailure { reason })
                if reason.contains("5 MiB")
        ));
        assert_eq!(collaborator.calls(), 0);
        assert_eq!(draft.read().await.fields().title, "Half-typed title");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_transport_failure() {
        let collaborator = ScriptedCollaborator::new(vec![(
            Duration::from_secs(60),
            Ok(r#"{"title":"Too late"}"#.to_string()),
        )]);
        let pipeline = FlyerPipeline::new(collaborator, Duration::from_secs(1));
        let draft = edited_draft();
        let alice = student().await;

        let outcome = pipeline.run(Some(&alice), flyer(), &draft).await.unwrap();
        assert!(matches!(
            outcome,
            ExtractionOutcome::Rejected(ExtractionRejection::TransportFailure { .. })
        ));
        assert_eq!(draft.read().await.fields().title, "Half-typed title");
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_upload_supersedes_pending_one() {
        let collaborator = ScriptedCollaborator::new(vec![
            (Duration::from_millis(500), Ok(r#"{"title":"Old Flyer"}"#.to_string())),
            (Duration::ZERO, Ok(r#"{"title":"New Flyer"}"#.to_string())),
        ]);
        let pipeline = pipeline(collaborator.clone());
        let draft = RwLock::new(DraftState::default());
        let alice = student().await;

        let (first, second) = tokio::join!(
            pipeline.run(Some(&alice), flyer(), &draft),
            pipeline.run(Some(&alice), flyer(), &draft),
        );

        assert_eq!(first.unwrap(), ExtractionOutcome::Superseded);
        assert!(matches!(second.unwrap(), ExtractionOutcome::Accepted(_)));
        assert_eq!(draft.read().await.fields().title, "New Flyer");
        assert_eq!(collaborator.calls(), 2);
        assert_eq!(pipeline.slot().phase().await, ExtractionPhase::Idle);
    }

    #[tokio::test]
    async fn test_no_session_makes_no_call() {
        let collaborator = ScriptedCollaborator::replying(r#"{"title":"X"}"#);
        let pipeline = pipeline(collaborator.clone());
        let draft = edited_draft();

        let result = pipeline.run(None, flyer(), &draft).await;
        assert!(matches!(result, Err(Error::Unauthenticated)));
        assert_eq!(collaborator.calls(), 0);
        assert_eq!(pipeline.slot().generation().await, 0);
        assert_eq!(pipeline.slot().phase().await, ExtractionPhase::Idle);
    }
}
