//! Submission wire types, IDs, and the submit-form API client.

use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::model::ResponseEntry;

/// Version tag stamped into every submission's metadata.
pub const FORM_VERSION: &str = "1.0.0";

/// The `goal` label attached to discovery submissions.
pub const SUBMISSION_GOAL: &str = "scoping a software project";

/// Body of `POST /api/submit-form`. Unknown or missing fields are tolerated;
/// only `responses` is actually checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
}

/// Request metadata recorded alongside a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionMeta {
    pub user_agent: String,
    pub ip: String,
    pub form_version: String,
    pub submission_id: String,
}

/// What gets POSTed to the webhook: the client's payload plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub responses: Vec<ResponseEntry>,
    pub metadata: SubmissionMeta,
}

/// Mint a submission ID: `sub_<unix millis>_<9 base36 chars>`.
pub fn generate_submission_id() -> String {
    const CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
        .collect();
    format!("sub_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// How the submit endpoint answered.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// Whether the endpoint returned 2xx.
    pub accepted: bool,
    pub submission_id: Option<String>,
    pub message: Option<String>,
}

/// Response body shape from `/api/submit-form`, success or failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReply {
    #[serde(default)]
    submission_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the submit-form endpoint.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl SubmissionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Shrink the round-trip timeout (tests).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// POST the responses. `Err` is transport-level only; an HTTP error status
    /// still resolves to an outcome so the caller can show the server's message.
    pub async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, DeliveryError> {
        let url = format!("{}/api/submit-form", self.base_url.trim_end_matches('/'));
        let send = self.client.post(&url).json(request).send();
        let response = tokio::time::timeout(self.timeout, send)
            .await
            .map_err(|_| DeliveryError::Timeout {
                timeout: self.timeout,
            })?
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        let accepted = response.status().is_success();
        let reply: SubmitReply = response
            .json()
            .await
            .map_err(|err| DeliveryError::Transport(err.to_string()))?;

        Ok(SubmitOutcome {
            accepted,
            submission_id: reply.submission_id,
            message: reply.message,
        })
    }
}
