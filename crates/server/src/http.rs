//! HTTP Endpoints
//!
//! REST API for dialogue audio rendering.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use narrator_core::{SegmentRequest, TimelineEntry};
use narrator_pipeline::{PipelineError, TempArtifacts};

use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health_check))
        // Single-segment synthesis
        .route("/generate-audio", post(generate_audio))
        // Full render: parallel synthesis -> merge -> publish
        .route("/generate-parallel-audio", post(generate_parallel_audio))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// One script segment on the wire (`para` is the original field name kept
/// for client compatibility)
#[derive(Debug, Deserialize)]
struct SegmentBody {
    role: String,
    para: String,
}

impl From<SegmentBody> for SegmentRequest {
    fn from(body: SegmentBody) -> Self {
        SegmentRequest::new(body.role, body.para)
    }
}

/// Full render request
#[derive(Debug, Deserialize)]
struct ParallelAudioRequest {
    segments: Vec<SegmentBody>,
}

/// Full render response
#[derive(Debug, Serialize)]
struct ParallelAudioResponse {
    merged_audio_url: String,
    timeline: Vec<TimelineEntry>,
    total_duration_sec: f64,
}

/// Error payload for any failed request
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn error_response(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

fn pipeline_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "narrator audio service is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Single-segment response
#[derive(Debug, Serialize)]
struct GenerateAudioResponse {
    file_path: String,
}

/// Synthesize a single segment.
///
/// The resulting file is left in the temp namespace for the caller; it is
/// not registered with the render pipeline's cleanup.
async fn generate_audio(
    State(state): State<AppState>,
    Json(segment): Json<SegmentBody>,
) -> Result<Json<GenerateAudioResponse>, ApiError> {
    let request = SegmentRequest::from(segment);
    let artifacts = TempArtifacts::new();

    match state.synthesizer.synthesize(0, &request, &artifacts).await {
        Ok(synthesized) => Ok(Json(GenerateAudioResponse {
            file_path: synthesized.artifact_path.display().to_string(),
        })),
        Err(e) => {
            tracing::error!(error = %e, "single-segment synthesis failed");
            Err(error_response(pipeline_status(&e), e.to_string()))
        }
    }
}

/// Render a full dialogue script into a published track
async fn generate_parallel_audio(
    State(state): State<AppState>,
    Json(request): Json<ParallelAudioRequest>,
) -> Result<Json<ParallelAudioResponse>, ApiError> {
    if request.segments.is_empty() {
        return Err(error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "segments must not be empty",
        ));
    }

    let segments: Vec<SegmentRequest> = request.segments.into_iter().map(Into::into).collect();

    match state.pipeline.run(segments).await {
        Ok(outcome) => Ok(Json(ParallelAudioResponse {
            merged_audio_url: outcome.remote_url,
            timeline: outcome.timeline,
            total_duration_sec: outcome.total_duration_sec,
        })),
        Err(e) => {
            tracing::error!(error = %e, "dialogue render failed");
            Err(error_response(pipeline_status(&e), e.to_string()))
        }
    }
}
