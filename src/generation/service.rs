//! Server-side question generation: plans the response to one request.
//!
//! The planner owns the decisions, the transport stays in the route handler:
//! it short-circuits exhausted budgets and missing credentials to a plain
//! completion body, relays draft patches while the model streams, enforces
//! the end-of-stream completion policy, and swaps in the fallback bank when
//! the provider misbehaves.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::{error, warn};

use crate::generation::draft::DraftQuestion;
use crate::generation::fallback::select_fallback;
use crate::generation::provider::QuestionProvider;
use crate::generation::GenerationRequest;

/// JSON frames, in order, for one generation request. The SSE `data:` framing
/// and the `[DONE]` sentinel are added by the transport.
pub type FrameStream = Pin<Box<dyn Stream<Item = serde_json::Value> + Send>>;

/// The planned response to one generation request.
pub enum GenerationReply {
    /// Send as a single plain JSON body, no stream.
    Complete(serde_json::Value),
    /// Send as SSE `data:` frames followed by the `[DONE]` sentinel.
    Frames(FrameStream),
}

/// Plans question generation responses.
#[derive(Clone)]
pub struct GenerationService {
    provider: Option<Arc<dyn QuestionProvider>>,
    max_ai_questions: usize,
}

impl GenerationService {
    pub fn new(provider: Option<Arc<dyn QuestionProvider>>, max_ai_questions: usize) -> Self {
        Self {
            provider,
            max_ai_questions,
        }
    }

    /// Plan the response to one request. An exhausted budget or a missing
    /// provider short-circuits to the plain completion body without touching
    /// the provider; everything else streams.
    pub fn respond(&self, request: GenerationRequest) -> GenerationReply {
        if request.ai_questions_generated >= self.max_ai_questions {
            return GenerationReply::Complete(complete_frame());
        }
        let Some(provider) = self.provider.clone() else {
            error!("No generation provider configured, completing discovery");
            return GenerationReply::Complete(complete_frame());
        };
        GenerationReply::Frames(stream_frames(
            provider,
            request,
            self.max_ai_questions,
        ))
    }
}

fn stream_frames(
    provider: Arc<dyn QuestionProvider>,
    request: GenerationRequest,
    max: usize,
) -> FrameStream {
    Box::pin(async_stream::stream! {
        let count = request.ai_questions_generated;
        let mut drafts = match provider
            .stream_question(&request.responses, count, max)
            .await
        {
            Ok(stream) => stream,
            Err(err) => {
                warn!(
                    provider = provider.name(),
                    error = %err,
                    "Question generation failed, serving fallback"
                );
                for frame in fallback_frames(count, max) {
                    yield frame;
                }
                return;
            }
        };

        let mut latest = DraftQuestion::default();
        let mut broke_mid_stream = false;
        while let Some(item) = drafts.next().await {
            match item {
                Ok(draft) => {
                    latest = draft.clone();
                    if let Ok(frame) = serde_json::to_value(&draft) {
                        yield frame;
                    }
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Generation stream broke, serving fallback"
                    );
                    broke_mid_stream = true;
                    break;
                }
            }
        }
        if broke_mid_stream {
            for frame in fallback_frames(count, max) {
                yield frame;
            }
            return;
        }

        // End-of-stream policy: the model saying "done", or this being the
        // last allowed question, both close the interview. A draft that
        // never became renderable closes it too.
        if latest.signals_complete() || count >= max.saturating_sub(1) {
            yield complete_frame();
        } else if let Some(frame) = final_frame(&latest) {
            yield frame;
        } else {
            warn!("Generated draft never became renderable, completing discovery");
            yield complete_frame();
        }
    })
}

fn complete_frame() -> serde_json::Value {
    json!({"complete": true})
}

/// The sanitized closing frame: exactly the fields the form needs, no
/// `complete` flag and no id (the client assigns ids).
fn final_frame(draft: &DraftQuestion) -> Option<serde_json::Value> {
    if !draft.is_ready() {
        return None;
    }
    let mut frame = json!({
        "title": draft.title,
        "description": draft.description,
        "inputType": draft.input_type,
    });
    if let Some(options) = &draft.options {
        frame["options"] = json!(options);
    }
    if let Some(suggested) = &draft.suggested_answers {
        frame["suggestedAnswers"] = json!(suggested);
    }
    Some(frame)
}

fn fallback_frames(count: usize, max: usize) -> Vec<serde_json::Value> {
    match select_fallback(count, max).and_then(|draft| serde_json::to_value(&draft).ok()) {
        Some(frame) => vec![frame],
        None => vec![complete_frame()],
    }
}
