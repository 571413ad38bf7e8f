//! AI question generation — drafts, providers, the streaming relay, and the
//! consuming client.

pub mod client;
pub mod draft;
pub mod fallback;
pub mod partial_json;
pub mod prompts;
pub mod provider;
pub mod service;

use serde::{Deserialize, Serialize};

use crate::model::ResponseEntry;

pub use client::{GenerationClient, GENERATION_TIMEOUT};
pub use draft::DraftQuestion;
pub use provider::{
    create_provider, DraftStream, OpenAiProvider, ProviderConfig, QuestionProvider,
};
pub use service::{FrameStream, GenerationReply, GenerationService};

/// Body of `POST /api/generate-question`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Everything answered so far, fixed and generated.
    #[serde(default)]
    pub responses: Vec<ResponseEntry>,
    /// Follow-ups already generated for this session.
    #[serde(default)]
    pub ai_questions_generated: usize,
}
