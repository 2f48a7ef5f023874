//! Authorization - Who may create, delete, and earn trust
//!
//! Pure decisions over account/session/event shapes. No storage access.

use crate::account_store::{Account, Session};
use crate::error::{Error, Result};
use crate::event_store::Event;
use crate::models::{AccountKind, VerificationTier};

/// True iff a session is active
pub fn can_create_event(session: Option<&Session>) -> bool {
    session.is_some()
}

/// Return the active session or fail with `Unauthenticated`
pub fn require_session(session: Option<&Session>) -> Result<&Session> {
    session.ok_or(Error::Unauthenticated)
}

/// True iff the session owns the event. No admin override.
pub fn can_delete_event(session: &Session, event: &Event) -> bool {
    session.username == event.created_by
}

/// Gate for deletion: session required, ownership required
pub fn authorize_delete(session: Option<&Session>, event: &Event) -> Result<()> {
    let session = require_session(session)?;
    if can_delete_event(session, event) {
        Ok(())
    } else {
        Err(Error::Unauthorized(format!(
            "{} cannot delete event {} created by {}",
            session.username, event.id, event.created_by
        )))
    }
}

/// Tier an event gets from its creator's account state
pub fn resolve_verification_tier(account: &Account) -> VerificationTier {
    if account.kind == AccountKind::Club && account.verified {
        VerificationTier::Official
    } else {
        VerificationTier::StudentPosted
    }
}
