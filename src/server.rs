//! HTTP surface: the axum router and its handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::PipelineError;
use crate::pipeline::{Brief, Pipeline};

/// Body of a `POST /summarize` request.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    /// Search query to research and summarize.
    pub query: String,
    /// Target summary length in words.
    pub length: u32,
}

/// Pipeline error carried out to an HTTP caller.
struct ApiError(PipelineError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // upstream search, fetching, and summarization failures
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        Self(err)
    }
}

/// Builds the application router around a shared pipeline.
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/summarize", post(handle_summarize))
        .with_state(pipeline)
}

/// `GET /` liveness check.
async fn handle_root() -> Json<serde_json::Value> {
    Json(json!({ "service": "webbrief", "status": "ok" }))
}

/// `POST /summarize` runs the pipeline for one query.
async fn handle_summarize(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<Brief>, ApiError> {
    debug!("Received summarize request for {:?}", request.query);
    let brief = pipeline.run(&request.query, request.length).await?;
    Ok(Json(brief))
}
