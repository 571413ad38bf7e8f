//! Configuration types.

use secrecy::SecretString;

use crate::generation::provider::{ProviderConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::webhook::WebhookConfig;

/// Maximum AI follow-up questions generated per session.
pub const DEFAULT_MAX_AI_QUESTIONS: usize = 8;

/// Service configuration, assembled from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP server binds.
    pub port: u16,
    /// AI follow-up budget per session.
    pub max_ai_questions: usize,
    /// Question-generation backend. `None` disables generation; sessions
    /// then submit after the fixed questions.
    pub provider: Option<ProviderConfig>,
    /// Webhook delivery settings.
    pub webhook: WebhookConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_ai_questions: DEFAULT_MAX_AI_QUESTIONS,
            provider: None,
            webhook: WebhookConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment. Every variable is optional:
    /// without `OPENAI_API_KEY` generation is disabled, without `WEBHOOK_URL`
    /// submissions are logged instead of delivered.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);

        let provider = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|key| ProviderConfig {
                api_key: SecretString::from(key),
                model: std::env::var("OPENAI_MODEL")
                    .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
                base_url: std::env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            });

        let webhook = WebhookConfig {
            url: std::env::var("WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            ..WebhookConfig::default()
        };

        Self {
            port,
            max_ai_questions: DEFAULT_MAX_AI_QUESTIONS,
            provider,
            webhook,
        }
    }
}
