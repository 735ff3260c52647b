//! Drafting minutes with an external text-generation service.
//!
//! [`GeminiClient`] talks to the Generative Language API. Every request has a
//! timeout, and transport failures, timeouts, `429` and `5xx` responses are
//! retried with exponential backoff. Other client errors fail immediately.
//!
//! Failures never surface as hard errors to the review flow: they become a
//! [`DraftState::Failed`] carrying a fixed user-facing message.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::document::{build_prompt, require_current_minutes};
use crate::error::Result;
use crate::lifecycle::{Clock, MeetingService};
use crate::meeting::Meeting;
use crate::storage::RecordStore;

/// Shown when no credential is configured.
pub const MISSING_KEY_MESSAGE: &str =
    "API key is not configured. Please set the API_KEY environment variable.";

/// Shown when the service call fails for any other reason.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate minutes. The AI service may be \
     unavailable or there might be an issue with your request.";

/// Longest pause between two attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// Errors from a text-generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// No credential is configured.
    #[error("API key is not configured")]
    MissingCredential,

    /// The request could not be sent or its response could not be read.
    #[error("Generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Generation service returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response carried no text.
    #[error("Generation service returned no text")]
    EmptyResponse,
}

impl GenerationError {
    /// Whether another attempt could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(err) => !(err.is_decode() || err.is_builder()),
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::MissingCredential | Self::EmptyResponse => false,
        }
    }

    /// The message shown to the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredential => MISSING_KEY_MESSAGE,
            _ => GENERATION_FAILED_MESSAGE,
        }
    }
}

/// A service that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for `prompt`.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Client for the Generative Language `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    url: String,
    max_retries: usize,
    retry_base_ms: u64,
}

impl GeminiClient {
    /// Build a client from configuration.
    ///
    /// A missing credential is not an error here; it is reported by
    /// [`TextGenerator::generate`] without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &GenerationConfig) -> std::result::Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim().trim_end_matches('/'),
            config.model.trim()
        );

        Ok(Self {
            http,
            api_key: config.api_key().map(str::to_string),
            url,
            max_retries: config.max_retries,
            retry_base_ms: config.retry_base_ms.max(1),
        })
    }

    /// The request URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a credential is configured.
    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn attempt(
        &self,
        api_key: &str,
        prompt: &str,
    ) -> std::result::Result<String, GenerationError> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredential)?;

        // Delays: 2x, 4x, 8x ... the configured base
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(self.retry_base_ms)
            .max_delay(MAX_BACKOFF)
            .take(self.max_retries);

        debug!("Requesting minutes draft from {}", self.url);
        RetryIf::start(
            strategy,
            || self.attempt(api_key, prompt),
            |err: &GenerationError| {
                let retry = err.is_retryable();
                if retry {
                    warn!("Generation attempt failed, retrying: {}", err);
                }
                retry
            },
        )
        .await
    }
}

/// Outcome of drafting minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    /// Generation succeeded.
    Ready(String),
    /// Generation failed; the message is meant for the user.
    Failed(String),
}

impl DraftState {
    /// Export and email are only offered for a successful draft.
    #[must_use]
    pub fn exports_enabled(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The draft text or the failure message.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Ready(text) | Self::Failed(text) => text,
        }
    }
}

/// Draft minutes for `meeting`.
pub async fn draft_minutes<G>(generator: &G, meeting: &Meeting) -> DraftState
where
    G: TextGenerator + ?Sized,
{
    let prompt = match build_prompt(meeting) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("Could not build prompt for meeting {}: {}", meeting.id, e);
            return DraftState::Failed(GENERATION_FAILED_MESSAGE.to_string());
        }
    };

    match generator.generate(&prompt).await {
        Ok(text) => {
            info!("Drafted minutes for meeting {} ({} chars)", meeting.id, text.len());
            DraftState::Ready(text)
        }
        Err(e) => {
            warn!("Minutes generation failed for meeting {}: {}", meeting.id, e);
            DraftState::Failed(e.user_message().to_string())
        }
    }
}

/// Result of reviewing a meeting's minutes.
#[derive(Debug, Clone)]
pub struct Review {
    /// The meeting after the review; holds the stored minutes on success.
    pub meeting: Meeting,
    /// The draft shown to the user.
    pub draft: DraftState,
    /// Whether a new draft was generated during this review.
    pub regenerated: bool,
}

/// Show the meeting's minutes, generating them when missing or stale.
///
/// Current stored minutes are reused unless `force` is set. A successful
/// draft is stored with the meeting; a failed one leaves the record as is.
///
/// # Errors
///
/// Returns an error if the meeting does not exist or the store fails.
pub async fn review_minutes<S, C, G>(
    service: &MeetingService<S, C>,
    generator: &G,
    meeting_id: &str,
    force: bool,
) -> Result<Review>
where
    S: RecordStore,
    C: Clock,
    G: TextGenerator + ?Sized,
{
    let meeting = service.get_meeting(meeting_id)?;

    if !force {
        if let Ok(record) = require_current_minutes(&meeting) {
            debug!("Reusing stored minutes for meeting {}", meeting.id);
            let draft = DraftState::Ready(record.text.clone());
            return Ok(Review {
                meeting,
                draft,
                regenerated: false,
            });
        }
    }

    match draft_minutes(generator, &meeting).await {
        DraftState::Ready(text) => {
            let meeting = service.store_minutes(meeting_id, text.clone())?;
            Ok(Review {
                meeting,
                draft: DraftState::Ready(text),
                regenerated: true,
            })
        }
        failed @ DraftState::Failed(_) => Ok(Review {
            meeting,
            draft: failed,
            regenerated: false,
        }),
    }
}
