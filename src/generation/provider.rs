//! Question generation providers.
//!
//! The service talks to a model through [`QuestionProvider`], which streams
//! one follow-up question as a series of cumulative [`DraftQuestion`]
//! snapshots. [`OpenAiProvider`] implements it against any OpenAI-compatible
//! chat completions API.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::GenerationError;
use crate::generation::draft::DraftQuestion;
use crate::generation::partial_json::parse_partial;
use crate::generation::prompts;
use crate::model::ResponseEntry;

/// Default model when `OPENAI_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default API root when `OPENAI_BASE_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Cumulative draft snapshots. Each item supersedes the previous one; the
/// stream ends when the model's document is finished.
pub type DraftStream = Pin<Box<dyn Stream<Item = Result<DraftQuestion, GenerationError>> + Send>>;

/// A backend that can generate the next discovery question.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Start generating the next question for the given transcript.
    async fn stream_question(
        &self,
        responses: &[ResponseEntry],
        ai_generated: usize,
        max_ai_questions: usize,
    ) -> Result<DraftStream, GenerationError>;
}

/// Credentials and endpoint for an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
}

/// Build the provider for the configured backend, if credentials are set.
pub fn create_provider(config: Option<ProviderConfig>) -> Option<Arc<dyn QuestionProvider>> {
    config.map(|config| Arc::new(OpenAiProvider::new(config)) as Arc<dyn QuestionProvider>)
}

/// Streams question JSON from an OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl QuestionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn stream_question(
        &self,
        responses: &[ResponseEntry],
        ai_generated: usize,
        max_ai_questions: usize,
    ) -> Result<DraftStream, GenerationError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompts::SYSTEM_PROMPT},
                {
                    "role": "user",
                    "content": prompts::discovery_prompt(responses, ai_generated, max_ai_questions),
                },
            ],
            "temperature": 0.7,
            "stream": true,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "discovery_question",
                    "schema": question_schema(),
                },
            },
        });

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerationError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GenerationError::Provider {
                provider: "openai".into(),
                reason: format!("HTTP {}: {}", status, detail.chars().take(200).collect::<String>()),
            });
        }

        let mut events = response.bytes_stream().eventsource();
        let stream = async_stream::try_stream! {
            // The model emits one JSON document in content deltas. After each
            // delta the accumulated prefix is repaired and reparsed; a snapshot
            // is yielded only when it differs from the last one.
            let mut accumulated = String::new();
            let mut last = DraftQuestion::default();

            while let Some(event) = events.next().await {
                let event = event.map_err(|err| GenerationError::Stream(err.to_string()))?;
                if event.data == "[DONE]" {
                    break;
                }
                let chunk: serde_json::Value = match serde_json::from_str(&event.data) {
                    Ok(value) => value,
                    Err(err) => {
                        debug!(error = %err, "Skipping unparseable stream chunk");
                        continue;
                    }
                };
                let Some(delta) = chunk["choices"][0]["delta"]["content"].as_str() else {
                    continue;
                };
                accumulated.push_str(delta);

                if let Some(partial) = parse_partial(&accumulated) {
                    let draft = DraftQuestion::from_value(&partial);
                    if draft != last {
                        last = draft.clone();
                        yield draft;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// JSON schema the model must produce. `contact` is deliberately absent from
/// the input types: the contact pair is always collected by the first fixed
/// question, never generated.
fn question_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Concise question title, 2-5 words"
            },
            "description": {
                "type": "string",
                "description": "Brief explanation of the information needed and its purpose"
            },
            "inputType": {
                "type": "string",
                "enum": [
                    "text", "long_text", "yes_no", "dropdown", "multiselect",
                    "date", "number", "rating", "email", "url"
                ]
            },
            "options": {
                "type": "array",
                "items": {"type": "string"},
                "description": "4-6 choices, dropdown/multiselect only"
            },
            "suggestedAnswers": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Example answers for long_text questions"
            },
            "complete": {
                "type": "boolean",
                "description": "True when discovery has gathered enough to scope the project"
            }
        },
        "required": ["title", "description", "inputType", "complete"],
        "additionalProperties": false
    })
}
