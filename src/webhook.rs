//! Webhook delivery with bounded retries.
//!
//! Accepted submissions are forwarded to an external webhook. Transient
//! failures (5xx, transport errors, timeouts) are retried with doubling
//! backoff; a 4xx means the receiver understood us and said no, so it is
//! never retried. With no webhook configured the submission is logged and
//! treated as delivered, which keeps local development working end to end.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::DeliveryError;
use crate::submission::WebhookPayload;

/// Delivery tuning. Fields are public so tests can shrink the timeouts.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Where to POST accepted submissions. `None` disables delivery.
    pub url: Option<String>,
    /// Total attempts per submission.
    pub max_attempts: u32,
    /// Hard cap per attempt, covering connect + response.
    pub attempt_timeout: Duration,
    /// First retry delay; doubles on each subsequent retry.
    pub backoff_base: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(15),
            backoff_base: Duration::from_secs(2), // then 4s before the third try
        }
    }
}

/// Posts webhook payloads, retrying per [`WebhookConfig`].
#[derive(Debug, Clone)]
pub struct WebhookSender {
    config: WebhookConfig,
    client: reqwest::Client,
}

impl WebhookSender {
    pub fn new(config: WebhookConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Deliver one payload. Returns once delivered, permanently rejected, or
    /// out of attempts.
    pub async fn deliver(&self, payload: &WebhookPayload) -> Result<(), DeliveryError> {
        let Some(url) = self.config.url.as_deref() else {
            info!(
                submission_id = %payload.metadata.submission_id,
                responses = payload.responses.len(),
                "No webhook URL configured, logging submission only"
            );
            debug!(payload = ?payload, "Unforwarded submission");
            return Ok(());
        };

        let mut last_error = String::new();
        for attempt in 1..=self.config.max_attempts {
            match self.attempt(url, payload).await {
                Ok(status) => {
                    info!(
                        submission_id = %payload.metadata.submission_id,
                        attempt,
                        status,
                        "Webhook delivered"
                    );
                    return Ok(());
                }
                Err(DeliveryError::Rejected { status }) => {
                    warn!(
                        submission_id = %payload.metadata.submission_id,
                        status,
                        "Webhook rejected the payload, not retrying"
                    );
                    return Err(DeliveryError::Rejected { status });
                }
                Err(err) => {
                    warn!(
                        submission_id = %payload.metadata.submission_id,
                        attempt,
                        error = %err,
                        "Webhook attempt failed"
                    );
                    last_error = err.to_string();
                    if attempt < self.config.max_attempts {
                        tokio::time::sleep(self.backoff_for(attempt)).await;
                    }
                }
            }
        }

        Err(DeliveryError::Exhausted {
            attempts: self.config.max_attempts,
            last_error,
        })
    }

    /// Delay after the given (1-based) failed attempt.
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.config.backoff_base * 2u32.pow(attempt.saturating_sub(1))
    }

    async fn attempt(&self, url: &str, payload: &WebhookPayload) -> Result<u16, DeliveryError> {
        let send = self.client.post(url).json(payload).send();
        let response = tokio::time::timeout(self.config.attempt_timeout, send)
            .await
            .map_err(|_| DeliveryError::Timeout {
                timeout: self.config.attempt_timeout,
            })?
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else if status.is_client_error() {
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
            })
        } else {
            Err(DeliveryError::Transport(format!("HTTP {}", status)))
        }
    }
}
