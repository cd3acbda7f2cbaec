//! HTTP handlers for the AI proxy.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::ai::{AiError, AiService};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// The proxy.
    pub ai: Arc<AiService>,
}

/// Request body accepted by every POST endpoint.
///
/// Unknown fields are ignored and a body that is not a JSON object reads as
/// empty, so validation always reports the missing field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiRequest {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    album_id: Option<String>,
}

impl AiRequest {
    fn parse(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            debug!(error = %e, "Unparseable request body, treating as empty");
            Self::default()
        })
    }
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = ?self, "AI request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/ai", post(ai))
        .route("/api/ask", post(ask))
        .route("/api/caption", post(caption))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::map_response(no_store))
        .with_state(state)
}

async fn no_store(mut response: Response) -> Response {
    response.headers_mut().insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn ai(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    let request = match read_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match request.mode.as_deref().map(str::trim) {
        Some("ask") => answer(&state, &request).await,
        Some("caption") => describe(&state, &request).await,
        _ => AiError::InvalidMode.into_response(),
    }
}

async fn ask(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    match read_body(body) {
        Ok(request) => answer(&state, &request).await,
        Err(response) => response,
    }
}

async fn caption(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    match read_body(body) {
        Ok(request) => describe(&state, &request).await,
        Err(response) => response,
    }
}

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<AiRequest, Response> {
    match body {
        Ok(bytes) => Ok(AiRequest::parse(&bytes)),
        Err(rejection) => {
            let status = rejection.status();
            warn!(status = status.as_u16(), error = %rejection.body_text(), "Rejected request body");
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Request body too large".to_string()
            } else {
                rejection.body_text()
            };
            Err((status, Json(json!({ "error": message }))).into_response())
        }
    }
}

async fn answer(state: &AppState, request: &AiRequest) -> Response {
    debug!(album_id = ?request.album_id, "Ask request");
    let question = request.question.as_deref().unwrap_or_default();
    let context = request.context.as_deref().unwrap_or_default();
    match state.ai.ask(question, context).await {
        Ok(answer) => Json(answer).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn describe(state: &AppState, request: &AiRequest) -> Response {
    let image_url = request.image_url.as_deref().unwrap_or_default();
    match state.ai.caption(image_url).await {
        Ok(caption) => Json(caption).into_response(),
        Err(e) => e.into_response(),
    }
}
