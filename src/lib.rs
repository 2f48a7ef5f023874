//! Campus Events Library
//!
//! Event catalog engine for a campus calendar
//!
//! ## Architecture (6 Components)
//!
//! 1. AccountStore - Registration, login, credential verification
//! 2. EventStore - Event collection and draft validation
//! 3. Authorization - Who may create and delete, which tier an event gets
//! 4. CatalogQuery - Filters, calendar buckets, insights
//! 5. FlyerExtraction - Flyer image to populated draft
//! 6. UserApi - User-facing operations over `AppState`
//!
//! ## Design Principles
//!
//! - Explicit state: every operation receives the `AppState` it acts on
//! - Untrusted input: collaborator replies are decoded and validated before use
//! - Local failures: a failed operation leaves prior data untouched

pub mod account_store;
pub mod authorization;
pub mod catalog_query;
pub mod error;
pub mod event_store;
pub mod flyer_extraction;
pub mod models;
pub mod state;
pub mod user_api;

pub use error::{Error, Result};
pub use state::{AppConfig, AppState};
