//! Upload slot
//!
//! One upload at a time. Each `begin` takes a fresh generation and the
//! previous ticket goes stale, so a slow earlier response can never
//! overwrite a newer one.

use super::types::ExtractionPhase;
use tokio::sync::{RwLock, RwLockWriteGuard};

#[derive(Debug, Default)]
pub(crate) struct SlotState {
    generation: u64,
    phase: ExtractionPhase,
    preview: Option<String>,
    last_outcome: Option<ExtractionPhase>,
}

/// Claim on the slot held by one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

impl UploadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Single-occupancy upload slot
#[derive(Debug, Default)]
pub struct UploadSlot {
    state: RwLock<SlotState>,
}

impl UploadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot, superseding any run in flight
    pub async fn begin(&self) -> UploadTicket {
        let mut state = self.state.write().await;
        if !matches!(state.phase, ExtractionPhase::Idle) {
            tracing::info!(
                superseded = state.generation,
                phase = ?state.phase,
                "New flyer upload supersedes in-flight extraction"
            );
        }
        state.generation += 1;
        state.phase = ExtractionPhase::Encoding;
        state.preview = None;
        UploadTicket {
            generation: state.generation,
        }
    }

    /// Advance the phase; returns false when the ticket is stale
    pub async fn set_phase(&self, ticket: UploadTicket, phase: ExtractionPhase) -> bool {
        let mut state = self.state.write().await;
        if state.generation != ticket.generation {
            return false;
        }
        state.phase = phase;
        true
    }

    /// Show the encoded flyer while extraction runs
    pub async fn attach_preview(&self, ticket: UploadTicket, preview: String) -> bool {
        let mut state = self.state.write().await;
        if state.generation != ticket.generation {
            return false;
        }
        state.preview = Some(preview);
        true
    }

    /// Lock the slot for the final step; `None` when the ticket is stale.
    ///
    /// The caller writes its result while holding the guard and then calls
    /// [`SlotGuard::finish`]. A newer `begin` waits on the guard.
    pub(crate) async fn conclude(&self, ticket: UploadTicket) -> Option<SlotGuard<'_>> {
        let state = self.state.write().await;
        (state.generation == ticket.generation).then_some(SlotGuard { state })
    }

    pub async fn phase(&self) -> ExtractionPhase {
        self.state.read().await.phase
    }

    pub async fn preview(&self) -> Option<String> {
        self.state.read().await.preview.clone()
    }

    /// Terminal phase of the last run that was not superseded
    pub async fn last_outcome(&self) -> Option<ExtractionPhase> {
        self.state.read().await.last_outcome
    }

    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }
}

/// Exclusive hold on a current slot
pub(crate) struct SlotGuard<'a> {
    state: RwLockWriteGuard<'a, SlotState>,
}

impl SlotGuard<'_> {
    /// Record the terminal phase and free the slot
    pub(crate) fn finish(mut self, outcome: ExtractionPhase) {
        self.state.phase = ExtractionPhase::Idle;
        self.state.last_outcome = Some(outcome);
        self.state.preview = None;
    }
}
