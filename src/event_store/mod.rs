//! EventStore - Canonical event collection
//!
//! ## Responsibilities
//!
//! - Store events in creation order
//! - Assign monotonic ids (never reused)
//! - Flag counting
//!
//! Authorization is decided by the caller before `remove` is invoked.

mod samples;
mod types;

pub use samples::{sample_events, SEED_ACCOUNT};
pub use types::*;

use crate::account_store::Account;
use crate::error::{Error, Result};
use chrono::Utc;
use tokio::sync::RwLock;

/// Backing collection
struct EventCollection {
    events: Vec<Event>,
    next_id: EventId,
}

impl EventCollection {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    fn push(&mut self, new: NewEvent) -> Event {
        let event = Event {
            id: self.next_id,
            title: new.title,
            date: new.date,
            time: new.time,
            location: new.location,
            description: new.description,
            category: new.category,
            eligibility: new.eligibility,
            verification_tier: new.verification_tier,
            created_by: new.created_by,
            account_type: new.account_type,
            flag_count: 0,
            flyer_image: new.flyer_image,
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.events.push(event.clone());
        event
    }

    fn position(&self, id: EventId) -> Option<usize> {
        self.events.iter().position(|e| e.id == id)
    }
}

/// EventStore instance
pub struct EventStore {
    collection: RwLock<EventCollection>,
}

impl EventStore {
    /// Create empty store
    pub fn new() -> Self {
        Self {
            collection: RwLock::new(EventCollection::new()),
        }
    }

    /// Create store pre-loaded with events
    pub async fn with_events(events: Vec<NewEvent>) -> Self {
        let store = Self::new();
        for event in events {
            store.insert(event).await;
        }
        store
    }

    /// Insert an already-validated event
    pub async fn insert(&self, new: NewEvent) -> Event {
        let mut collection = self.collection.write().await;
        let event = collection.push(new);
        tracing::info!(
            event_id = event.id,
            created_by = %event.created_by,
            tier = %event.verification_tier,
            "Event created"
        );
        event
    }

    /// Validate a draft and insert it on behalf of `creator`
    pub async fn create_from_draft(&self, draft: &EventDraft, creator: &Account) -> Result<Event> {
        let new = NewEvent::from_draft(draft, creator)?;
        Ok(self.insert(new).await)
    }

    /// Snapshot of all events in creation order
    pub async fn list(&self) -> Vec<Event> {
        self.collection.read().await.events.clone()
    }

    /// Get event by id
    pub async fn get(&self, id: EventId) -> Option<Event> {
        let collection = self.collection.read().await;
        collection.position(id).map(|i| collection.events[i].clone())
    }

    /// Remove event by id
    pub async fn remove(&self, id: EventId) -> Result<Event> {
        let mut collection = self.collection.write().await;
        let index = collection
            .position(id)
            .ok_or_else(|| Error::NotFound(format!("Event {} not found.", id)))?;
        let event = collection.events.remove(index);
        tracing::info!(event_id = id, "Event deleted");
        Ok(event)
    }

    /// Increment the report counter
    pub async fn increment_flags(&self, id: EventId) -> Result<Event> {
        let mut collection = self.collection.write().await;
        let index = collection
            .position(id)
            .ok_or_else(|| Error::NotFound(format!("Event {} not found.", id)))?;
        let event = &mut collection.events[index];
        event.flag_count = event.flag_count.saturating_add(1);
        tracing::info!(event_id = id, flag_count = event.flag_count, "Event reported");
        Ok(event.clone())
    }

    /// Event count
    pub async fn count(&self) -> usize {
        self.collection.read().await.events.len()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}
