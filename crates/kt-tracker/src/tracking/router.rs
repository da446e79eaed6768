use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{SubmissionRequest, SubmissionView, TowerId, VarianceReport};
use super::repository::{SubmissionRepository, UpsertOutcome};
use super::service::{TrackingService, TrackingServiceError};
use crate::error::AppError;
use crate::scoring::{
    normalise_week_ending, RagStatus, ScoreComponent, ScoreInput, ScoringEngine, ScoringWeights,
    WeekEnding,
};

/// Router builder exposing submission, reporting and admin endpoints.
pub fn tracking_router<R>(service: Arc<TrackingService<R>>) -> Router
where
    R: SubmissionRepository + 'static,
{
    Router::new()
        .route("/api/v1/submissions", post(submit_handler::<R>))
        .route(
            "/api/v1/towers/:tower_id/history",
            get(history_handler::<R>),
        )
        .route(
            "/api/v1/towers/:tower_id/variance",
            get(variance_handler::<R>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<R>))
        .route(
            "/api/v1/admin/weights",
            get(weights_handler::<R>).put(update_weights_handler::<R>),
        )
        .route(
            "/api/v1/export/submissions.csv",
            get(export_handler::<R>),
        )
        .route("/api/v1/score", post(score_preview_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    #[serde(default)]
    pub week_ending: Option<String>,
}

impl WeekQuery {
    /// Defaults to the reporting week containing today (UTC).
    fn resolve(self) -> Result<WeekEnding, TrackingServiceError> {
        match self.week_ending {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(normalise_week_ending(Utc::now())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub submission: SubmissionView,
    pub variance: VarianceReport,
}

#[derive(Debug, Deserialize)]
pub struct ScorePreviewRequest {
    #[serde(flatten)]
    pub scores: ScoreInput,
    #[serde(default)]
    pub weights: Option<ScoringWeights>,
}

#[derive(Debug, Serialize)]
pub struct ScorePreviewResponse {
    pub total_score: u8,
    pub rag_status: RagStatus,
    pub components: Vec<ScoreComponent>,
    pub weights: ScoringWeights,
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Json(request): Json<SubmissionRequest>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let outcome = service.submit(request)?;
    let status = match outcome.upsert {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    let body = SubmissionResponse {
        submission: outcome.record.view(),
        variance: outcome.variance,
    };
    Ok((status, Json(body)).into_response())
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Path(tower_id): Path<String>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let history = service.history(&TowerId(tower_id))?;
    Ok(Json(history).into_response())
}

pub(crate) async fn variance_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Path(tower_id): Path<String>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let week_ending = query.resolve()?;
    let report = service.variance_for(&TowerId(tower_id), week_ending)?;
    Ok(Json(report).into_response())
}

pub(crate) async fn dashboard_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Query(query): Query<WeekQuery>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let week_ending = query.resolve()?;
    let dashboard = service.dashboard(week_ending)?;
    Ok(Json(dashboard).into_response())
}

pub(crate) async fn weights_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    Json(service.weights()).into_response()
}

pub(crate) async fn update_weights_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Json(weights): Json<ScoringWeights>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let summary = service.update_weights(weights)?;
    Ok(Json(summary).into_response())
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
) -> Result<Response, AppError>
where
    R: SubmissionRepository + 'static,
{
    let mut buffer = Vec::new();
    service.export_csv(&mut buffer)?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.as_ref()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"kt-submissions.csv\"",
            ),
        ],
        buffer,
    )
        .into_response())
}

/// Stateless preview: scores the payload with the supplied weights, or the
/// active ones, without storing anything.
pub(crate) async fn score_preview_handler<R>(
    State(service): State<Arc<TrackingService<R>>>,
    Json(request): Json<ScorePreviewRequest>,
) -> Response
where
    R: SubmissionRepository + 'static,
{
    let engine = match request.weights {
        Some(weights) => ScoringEngine::new(weights),
        None => service.engine(),
    };
    let result = engine.score(&request.scores);

    Json(ScorePreviewResponse {
        total_score: result.total_score,
        rag_status: result.rag_status,
        components: engine.breakdown(&request.scores),
        weights: *engine.weights(),
    })
    .into_response()
}
