//! Client for the question generation endpoint.
//!
//! Mirrors what the form front end does: POST the transcript, read the SSE
//! frames as they arrive, fold them into a draft, and come away with either
//! the next question or the knowledge that the interview is over.

use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use tracing::warn;

use crate::error::GenerationError;
use crate::generation::draft::DraftQuestion;
use crate::generation::GenerationRequest;
use crate::model::{Question, ResponseEntry};

/// Hard cap on one generation round trip, stream included.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Consumes the generation endpoint's stream.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: GENERATION_TIMEOUT,
        }
    }

    /// Shrink the round-trip timeout (tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the next question.
    ///
    /// `Ok(Some(question))` — a renderable follow-up arrived.
    /// `Ok(None)` — the service completed the interview.
    /// `Err` — timeout, transport failure, or an error status.
    pub async fn next_question(
        &self,
        responses: &[ResponseEntry],
        ai_generated: usize,
    ) -> Result<Option<Question>, GenerationError> {
        tokio::time::timeout(self.timeout, self.fetch_question(responses, ai_generated))
            .await
            .map_err(|_| GenerationError::Timeout {
                timeout: self.timeout,
            })?
    }

    async fn fetch_question(
        &self,
        responses: &[ResponseEntry],
        ai_generated: usize,
    ) -> Result<Option<Question>, GenerationError> {
        let request = GenerationRequest {
            responses: responses.to_vec(),
            ai_questions_generated: ai_generated,
        };
        let url = format!(
            "{}/api/generate-question",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| GenerationError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Http {
                status: status.as_u16(),
            });
        }

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));

        // Older deployments answer the short-circuit cases with plain JSON
        // instead of a one-frame stream; treat the body as a single frame.
        if !is_event_stream {
            let value: serde_json::Value = response
                .json()
                .await
                .map_err(|err| GenerationError::Request(err.to_string()))?;
            let draft = DraftQuestion::from_value(&value);
            if draft.signals_complete() {
                return Ok(None);
            }
            return Ok(draft.into_question(next_id(ai_generated)));
        }

        let mut events = response.bytes_stream().eventsource();
        let mut draft = DraftQuestion::default();
        let mut final_question: Option<Question> = None;

        while let Some(event) = events.next().await {
            let event = event.map_err(|err| GenerationError::Stream(err.to_string()))?;
            if event.data == "[DONE]" {
                break;
            }
            let value: serde_json::Value = match serde_json::from_str(&event.data) {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "Skipping malformed generation frame");
                    continue;
                }
            };

            let patch = DraftQuestion::from_value(&value);
            if patch.signals_complete() {
                return Ok(None);
            }
            draft.merge(patch.clone());

            // Any frame that is renderable on its own becomes the candidate;
            // later frames supersede earlier ones.
            if let Some(question) = patch.into_question(next_id(ai_generated)) {
                final_question = Some(question);
            }
        }

        // A delta-style stream may only be renderable once merged.
        Ok(final_question.or_else(|| draft.into_question(next_id(ai_generated))))
    }
}

fn next_id(ai_generated: usize) -> String {
    format!("ai_{}", ai_generated + 1)
}
