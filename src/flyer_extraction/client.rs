//! Extraction collaborator adapter
//!
//! ## Responsibilities
//!
//! - Send the encoded flyer and instruction to the vision service
//! - Unwrap the response envelope to its text
//! - Report transport problems (status, envelope, network) as [`TransportError`]

use super::types::{EncodedFlyer, ExtractionRequest};
use crate::error::Result;
use crate::state::AppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Anthropic messages API version header
const API_VERSION: &str = "2023-06-01";

/// Instruction sent alongside every flyer
pub const EXTRACTION_INSTRUCTION: &str = r#"Extract the event details from this flyer. Reply with ONLY one JSON object and no other text.

If the image is an event flyer, reply with:
{
  "title": "event name",
  "date": "YYYY-MM-DD",
  "time": "HH:MM in 24-hour format",
  "location": "venue",
  "description": "one or two sentence summary",
  "category": "one of: Cultural, Professional, Academic, Social, Sports, Service, Arts"
}
Use "TBD" for any text field you cannot determine.

If the image is not an event flyer, reply with {"error": "not_event"}.
If the image is too blurry or dark to read, reply with {"error": "unreadable"}."#;

/// Transport-level failure
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("extraction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response envelope: {0}")]
    Envelope(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// External image-understanding service
#[async_trait]
pub trait ExtractionCollaborator: Send + Sync {
    /// Submit one request; return the model's text reply
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> std::result::Result<String, TransportError>;
}

impl ExtractionRequest {
    pub fn new(image: EncodedFlyer) -> Self {
        Self {
            image,
            instruction: EXTRACTION_INSTRUCTION.to_string(),
        }
    }
}

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'static str,
    media_type: &'a str,
    data: &'a str,
}

/// Messages API response envelope (only what we read)
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    fn first_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
    }
}

/// HTTP client for the vision messages API
#[derive(Clone)]
pub struct VisionClient {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl VisionClient {
    /// Create client from config
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.extraction_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_url: config.extraction_api_url.clone(),
            api_key: config.extraction_api_key.clone(),
            model: config.extraction_model.clone(),
            max_tokens: config.extraction_max_tokens,
        })
    }

    fn body<'a>(&'a self, request: &'a ExtractionRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &request.image.media_type,
                            data: &request.image.data,
                        },
                    },
                    ContentBlock::Text {
                        text: &request.instruction,
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl ExtractionCollaborator for VisionClient {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> std::result::Result<String, TransportError> {
        let mut req = self
            .http
            .post(&self.api_url)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(request));

        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        tracing::debug!(
            api_url = %self.api_url,
            model = %self.model,
            media_type = %request.image.media_type,
            "Sending flyer to extraction service"
        );

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: MessagesResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Envelope(e.to_string()))?;

        envelope
            .first_text()
            .ok_or_else(|| TransportError::Envelope("no text block in response".to_string()))
    }
}
