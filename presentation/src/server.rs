use application::answer_service::AnswerService;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::errors::RagError;
use domain::models::{Answer, AnswerRequest};
use serde_json::json;
use shared::types::Result;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

// Base64 images inflate payloads; leave room for a few megabytes.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub type AppState = Arc<AnswerService>;

pub enum ApiError {
    Rag(RagError),
    /// Body that is not a valid `AnswerRequest`; keeps axum's status code.
    Body(JsonRejection),
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        Self::Rag(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Body(rejection) => {
                let body = Json(json!({ "detail": rejection.body_text() }));
                (rejection.status(), body).into_response()
            }
            Self::Rag(err) if err.is_client_error() => {
                let body = Json(json!({ "detail": err.to_string() }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            Self::Rag(err) => {
                error!(error = %err, "request failed");
                let body = Json(json!({ "detail": "failed to answer the question" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/api/", post(answer_question))
        .route("/api", post(answer_question))
        .route("/health", get(health))
        .with_state(service)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
}

async fn answer_question(
    State(service): State<AppState>,
    payload: std::result::Result<Json<AnswerRequest>, JsonRejection>,
) -> std::result::Result<Json<Answer>, ApiError> {
    let Json(request) = payload?;
    let answer = service.answer(&request).await?;
    Ok(Json(answer))
}

async fn health(State(service): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "chunks": service.rag().corpus().len(),
        "embedding_model": service.rag().model().model_name(),
    }))
}

pub async fn serve(service: AppState, bind_addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
