//! Drives a form session against the live endpoints.
//!
//! The machine decides, the driver does: every [`Effect`] coming out of
//! [`FormSession::apply`] is executed here (fetch the next question, submit
//! the responses) and the outcome is fed straight back in as the next event,
//! until the session settles.

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};

use crate::error::{DeliveryError, ValidationError};
use crate::form::machine::{Effect, FormSession, StepEvent};
use crate::generation::GenerationClient;
use crate::model::AnswerValue;
use crate::submission::{SubmissionClient, SubmitRequest, SUBMISSION_GOAL};

const OFFLINE_MESSAGE: &str =
    "You're currently offline. Please check your internet connection and try again.";
const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your connection and try again.";
const SUCCESS_FALLBACK_MESSAGE: &str = "Form submitted successfully!";
const FAILURE_FALLBACK_MESSAGE: &str = "Submission failed. Please try again.";

/// A form session wired to its generation and submission endpoints.
pub struct SessionDriver {
    session: FormSession,
    generation: GenerationClient,
    submission: SubmissionClient,
    online: bool,
}

impl SessionDriver {
    /// Drive a fresh session against one base URL.
    pub fn new(base_url: impl Into<String>, max_ai_questions: usize) -> Self {
        let base_url = base_url.into();
        Self::with_clients(
            FormSession::new(max_ai_questions),
            GenerationClient::new(base_url.clone()),
            SubmissionClient::new(base_url),
        )
    }

    /// Assemble a driver from parts (tests shrink the client timeouts).
    pub fn with_clients(
        session: FormSession,
        generation: GenerationClient,
        submission: SubmissionClient,
    ) -> Self {
        Self {
            session,
            generation,
            submission,
            online: true,
        }
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Record connectivity. While offline, submissions fail immediately with
    /// an explanatory message instead of being attempted.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }

    /// Answer the current question and run whatever follows (question
    /// generation, submission) to completion.
    pub async fn submit_answer(&mut self, answer: AnswerValue) -> Result<(), ValidationError> {
        let effect = self.session.apply(StepEvent::Answer(answer))?;
        self.run_effect(effect).await;
        Ok(())
    }

    /// Step back one question; returns the answer to pre-fill.
    pub fn go_back(&mut self) -> Option<AnswerValue> {
        let _ = self.session.apply(StepEvent::Back);
        self.session.take_restored_answer()
    }

    /// Retry a failed submission.
    pub async fn retry_submission(&mut self) {
        let effect = self
            .session
            .apply(StepEvent::RetrySubmission)
            .unwrap_or(Effect::None);
        self.run_effect(effect).await;
    }

    async fn run_effect(&mut self, mut effect: Effect) {
        // Effects chain (a finished generation rolls into submission) but the
        // chain is short and always ends in None.
        loop {
            effect = match effect {
                Effect::None => return,
                Effect::RequestQuestion => self.request_next_question().await,
                Effect::SubmitResponses => self.deliver_responses().await,
            };
        }
    }

    async fn request_next_question(&mut self) -> Effect {
        let outcome = self
            .generation
            .next_question(self.session.responses(), self.session.ai_generated())
            .await;

        let event = match outcome {
            Ok(Some(question)) => {
                info!(id = %question.id, title = %question.title, "Follow-up question ready");
                StepEvent::QuestionReady(question)
            }
            Ok(None) => {
                info!("Discovery complete, no further questions");
                StepEvent::GenerationComplete
            }
            Err(err) => {
                warn!(error = %err, "Question generation failed");
                StepEvent::GenerationFailed
            }
        };
        self.session.apply(event).unwrap_or(Effect::None)
    }

    async fn deliver_responses(&mut self) -> Effect {
        if !self.online {
            let event = StepEvent::DeliveryFailed {
                submission_id: None,
                message: OFFLINE_MESSAGE.into(),
            };
            return self.session.apply(event).unwrap_or(Effect::None);
        }

        let request = SubmitRequest {
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            goal: Some(SUBMISSION_GOAL.into()),
            responses: self.session.submission_responses(),
        };

        let event = match self.submission.submit(&request).await {
            Ok(outcome) if outcome.accepted => StepEvent::DeliverySucceeded {
                submission_id: outcome.submission_id.unwrap_or_default(),
                message: outcome
                    .message
                    .unwrap_or_else(|| SUCCESS_FALLBACK_MESSAGE.into()),
            },
            Ok(outcome) => StepEvent::DeliveryFailed {
                submission_id: outcome.submission_id,
                message: outcome
                    .message
                    .unwrap_or_else(|| FAILURE_FALLBACK_MESSAGE.into()),
            },
            Err(DeliveryError::Timeout { .. }) => StepEvent::DeliveryFailed {
                submission_id: None,
                message: TIMEOUT_MESSAGE.into(),
            },
            Err(err) => {
                warn!(error = %err, "Submission transport failed");
                StepEvent::DeliveryFailed {
                    submission_id: None,
                    message: NETWORK_ERROR_MESSAGE.into(),
                }
            }
        };
        self.session.apply(event).unwrap_or(Effect::None)
    }
}
