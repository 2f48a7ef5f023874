//! UserApi - User-facing operations
//!
//! Every operation takes the [`AppState`] it works on. Failures come back
//! as [`Error`] values; prior data is untouched when an operation fails.

use crate::account_store::{Account, RegisterRequest, Session};
use crate::authorization::{authorize_delete, require_session};
use crate::catalog_query::{filter_events, group_by_date, insights, InsightsSummary};
use crate::error::{Error, Result};
use crate::event_store::{Event, EventDraft, EventId};
use crate::flyer_extraction::{ExtractionOutcome, FlyerSource};
use crate::models::{FilterValue, View};
use crate::state::AppState;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Data the selected view renders
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ViewModel {
    /// Filtered events bucketed by date
    Calendar(BTreeMap<NaiveDate, Vec<Event>>),
    /// Filtered events in creation order
    List(Vec<Event>),
    /// Summary over the whole catalog
    Insights(InsightsSummary),
}

/// Create an account; does not log in
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<Account> {
    state.accounts.register(req).await
}

/// Start a session, replacing any current one
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<Session> {
    let account = state.accounts.authenticate(username, password).await?;
    let session = Session::for_account(&account);

    let previous = state.session.write().await.replace(session.clone());
    if let Some(previous) = previous {
        tracing::debug!(previous = %previous.username, "Replacing active session");
    }
    tracing::info!(
        username = %session.username,
        kind = %session.kind,
        session_id = %session.session_id,
        "Logged in"
    );
    Ok(session)
}

/// End the session, if any
pub async fn logout(state: &AppState) -> Option<Session> {
    let ended = state.session.write().await.take();
    if let Some(session) = &ended {
        tracing::info!(username = %session.username, "Logged out");
    }
    ended
}

pub async fn current_session(state: &AppState) -> Option<Session> {
    state.session.read().await.clone()
}

/// Account behind the active session
async fn session_account(state: &AppState) -> Result<Account> {
    let session = current_session(state).await;
    let session = require_session(session.as_ref())?;
    state
        .accounts
        .get(&session.username)
        .await
        .ok_or(Error::Unauthenticated)
}

/// Create an event from manually entered fields; never carries a flyer image
pub async fn create_event_manual(state: &AppState, fields: EventDraft) -> Result<Event> {
    let account = session_account(state).await?;
    state.events.create_from_draft(&fields, &account).await
}

/// Populate the draft from a flyer image.
///
/// Returns the populated draft on acceptance. The draft is left as it was
/// on every failure, and each rejection keeps its own error.
pub async fn create_event_from_flyer(state: &AppState, source: FlyerSource) -> Result<EventDraft> {
    let account = match session_account(state).await {
        Ok(account) => Some(account),
        Err(Error::Unauthenticated) => None,
        Err(e) => return Err(e),
    };

    match state.flyer.run(account.as_ref(), source, &state.draft).await? {
        ExtractionOutcome::Accepted(draft) => Ok(draft),
        ExtractionOutcome::Rejected(rejection) => Err(Error::Extraction(rejection)),
        ExtractionOutcome::Superseded => Err(Error::Superseded),
    }
}

/// Current draft fields
pub async fn draft(state: &AppState) -> EventDraft {
    state.draft.read().await.fields().clone()
}

/// Image attached to the draft by the last accepted flyer
pub async fn draft_flyer_image(state: &AppState) -> Option<String> {
    state.draft.read().await.flyer_image().map(str::to_string)
}

/// Edit the draft fields in place; returns the edited fields
pub async fn update_draft<F>(state: &AppState, edit: F) -> EventDraft
where
    F: FnOnce(&mut EventDraft),
{
    let mut draft = state.draft.write().await;
    edit(draft.fields_mut());
    draft.fields().clone()
}

/// Commit the draft under manual-entry rules, then reset it.
///
/// The draft stays locked from validation to reset, so a flyer accepted
/// meanwhile waits and lands in the fresh draft.
pub async fn submit_draft(state: &AppState) -> Result<Event> {
    let mut draft = state.draft.write().await;
    let account = session_account(state).await?;
    let new = draft.to_new_event(&account)?;
    let event = state.events.insert(new).await;
    draft.reset();
    Ok(event)
}

pub async fn reset_draft(state: &AppState) {
    state.draft.write().await.reset();
}

/// Delete an event the session owns
pub async fn delete_event(state: &AppState, id: EventId) -> Result<Event> {
    let session = current_session(state).await;
    require_session(session.as_ref())?;

    let event = get_event(state, id).await?;
    authorize_delete(session.as_ref(), &event)?;
    state.events.remove(id).await
}

/// Flag an event for review; no session needed
pub async fn report_event(state: &AppState, id: EventId) -> Result<Event> {
    state.events.increment_flags(id).await
}

pub async fn get_event(state: &AppState, id: EventId) -> Result<Event> {
    state
        .events
        .get(id)
        .await
        .ok_or_else(|| Error::NotFound(format!("Event {} not found.", id)))
}

/// Events passing the current filters
pub async fn list_events(state: &AppState) -> Vec<Event> {
    let events = state.events.list().await;
    let selection = state.filters.read().await;
    filter_events(&events, &selection).into_iter().cloned().collect()
}

/// Turn one filter value on or off
pub async fn set_filter(state: &AppState, value: FilterValue, on: bool) {
    state.filters.write().await.set(value, on);
    tracing::debug!(?value, on, "Filter changed");
}

pub async fn clear_filters(state: &AppState) {
    state.filters.write().await.clear();
}

pub async fn select_view(state: &AppState, view: View) {
    *state.view.write().await = view;
    tracing::debug!(?view, "View selected");
}

/// Build the data for the selected view
pub async fn current_view(state: &AppState) -> ViewModel {
    let view = *state.view.read().await;
    let events = state.events.list().await;

    match view {
        View::Insights => ViewModel::Insights(insights(&events, state.config.popular_times_top_n)),
        View::List | View::Calendar => {
            let selection = state.filters.read().await.clone();
            let filtered = filter_events(&events, &selection);
            if view == View::List {
                ViewModel::List(filtered.into_iter().cloned().collect())
            } else {
                let buckets = group_by_date(&filtered)
                    .into_iter()
                    .map(|(date, day)| (date, day.into_iter().cloned().collect()))
                    .collect();
                ViewModel::Calendar(buckets)
            }
        }
    }
}
