//! Application state
//!
//! Holds the stores, the current session and the UI selections that every
//! user-facing operation works against

use crate::account_store::{AccountStore, Session};
use crate::catalog_query::{FilterSelection, DEFAULT_TOP_N};
use crate::error::{Error, Result};
use crate::event_store::{sample_events, DraftState, EventStore};
use crate::flyer_extraction::{ExtractionCollaborator, FlyerPipeline, VisionClient};
use crate::models::View;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Extraction messages endpoint
    pub extraction_api_url: String,
    /// API key sent as `x-api-key`
    pub extraction_api_key: Option<String>,
    pub extraction_model: String,
    pub extraction_max_tokens: u32,
    /// Upper bound on one collaborator call
    pub extraction_timeout: Duration,
    /// Number of hours shown under popular times
    pub popular_times_top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extraction_api_url: std::env::var("EXTRACTION_API_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1/messages".to_string()),
            extraction_api_key: std::env::var("EXTRACTION_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            extraction_model: std::env::var("EXTRACTION_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            extraction_max_tokens: std::env::var("EXTRACTION_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            extraction_timeout: Duration::from_secs(
                std::env::var("EXTRACTION_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            popular_times_top_n: std::env::var("POPULAR_TIMES_TOP_N")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOP_N),
        }
    }
}

impl AppConfig {
    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.extraction_api_url.trim().is_empty() {
            return Err(Error::Config("EXTRACTION_API_URL is empty".to_string()));
        }
        if self.extraction_timeout.is_zero() {
            return Err(Error::Config("EXTRACTION_TIMEOUT_SECS must be positive".to_string()));
        }
        if self.popular_times_top_n == 0 {
            return Err(Error::Config("POPULAR_TIMES_TOP_N must be positive".to_string()));
        }
        Ok(())
    }
}

/// Application state passed to every operation
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub accounts: Arc<AccountStore>,
    pub events: Arc<EventStore>,
    /// The single authenticated identity, if any
    pub session: Arc<RwLock<Option<Session>>>,
    pub filters: Arc<RwLock<FilterSelection>>,
    pub view: Arc<RwLock<View>>,
    /// Event under construction and its accepted flyer
    pub draft: Arc<RwLock<DraftState>>,
    pub flyer: Arc<FlyerPipeline>,
}

impl AppState {
    /// Empty catalog with the given collaborator
    pub fn new(config: AppConfig, collaborator: Arc<dyn ExtractionCollaborator>) -> Self {
        let flyer = FlyerPipeline::new(collaborator, config.extraction_timeout);
        Self {
            config,
            accounts: Arc::new(AccountStore::new()),
            events: Arc::new(EventStore::new()),
            session: Arc::new(RwLock::new(None)),
            filters: Arc::new(RwLock::new(FilterSelection::default())),
            view: Arc::new(RwLock::new(View::default())),
            draft: Arc::new(RwLock::new(DraftState::default())),
            flyer: Arc::new(flyer),
        }
    }

    /// Build with the HTTP collaborator
    pub fn from_config(config: AppConfig) -> Result<Self> {
        config.validate()?;
        let client = VisionClient::new(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Load the sample catalog
    pub async fn seed_samples(&self) -> usize {
        let samples = sample_events();
        let count = samples.len();
        for event in samples {
            self.events.insert(event).await;
        }
        tracing::info!(count, "Sample events loaded");
        count
    }
}
