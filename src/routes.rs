//! HTTP endpoints: question generation (SSE), form submission, health.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::{get, post},
};
use futures::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::generation::{GenerationReply, GenerationRequest, GenerationService};
use crate::submission::{
    FORM_VERSION, SubmissionMeta, SubmitRequest, WebhookPayload, generate_submission_id,
};
use crate::webhook::WebhookSender;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub generation: GenerationService,
    pub webhook: WebhookSender,
}

/// Build the Axum router for the intake service.
pub fn app_routes(generation: GenerationService, webhook: WebhookSender) -> Router {
    let state = AppState {
        generation,
        webhook,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/generate-question", post(generate_question))
        .route("/api/submit-form", post(submit_form))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "discovery-intake"
    }))
}

// ── Question Generation ─────────────────────────────────────────────────

/// Stream question patches as SSE ending with a `[DONE]` frame, or answer
/// with the plain completion body when no generation is attempted. Failures
/// inside the stream degrade to fallback or completion frames rather than
/// broken transport.
async fn generate_question(State(state): State<AppState>, body: String) -> Response {
    // An unreadable body starts from an empty conversation instead of erroring.
    let request: GenerationRequest = serde_json::from_str(&body).unwrap_or_default();
    info!(
        responses = request.responses.len(),
        ai_generated = request.ai_questions_generated,
        "Generating next question"
    );

    match state.generation.respond(request) {
        GenerationReply::Complete(reply) => Json(reply).into_response(),
        GenerationReply::Frames(mut frames) => Sse::new(stream! {
            while let Some(frame) = frames.next().await {
                yield Ok::<_, Infallible>(Event::default().data(frame.to_string()));
            }
            yield Ok(Event::default().data("[DONE]"));
        })
        .into_response(),
    }
}

// ── Submission ──────────────────────────────────────────────────────────

async fn submit_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    // An unreadable body counts as a submission with no responses; both are
    // the client's fault and get the same rejection.
    let request: SubmitRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unreadable submission body");
            SubmitRequest::default()
        }
    };

    if request.responses.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid submission: No responses provided"
            })),
        );
    }

    let submission_id = generate_submission_id();
    info!(
        submission_id = %submission_id,
        responses = request.responses.len(),
        "Form submission received"
    );

    let metadata = SubmissionMeta {
        user_agent: header_value(&headers, "user-agent"),
        ip: headers
            .get("x-forwarded-for")
            .or_else(|| headers.get("x-real-ip"))
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
        form_version: FORM_VERSION.to_string(),
        submission_id: submission_id.clone(),
    };

    let payload = WebhookPayload {
        timestamp: request.timestamp,
        goal: request.goal,
        responses: request.responses,
        metadata,
    };

    match state.webhook.deliver(&payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "submissionId": submission_id,
                "message": "Form submitted successfully"
            })),
        ),
        Err(e) => {
            error!(submission_id = %submission_id, error = %e, "Webhook delivery failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Submission failed",
                    "submissionId": submission_id,
                    "message": "We're experiencing technical difficulties. Your information has been saved and we'll contact you soon."
                })),
            )
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
