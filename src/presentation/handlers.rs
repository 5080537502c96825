// HTTP request handlers
use crate::domain::survey_row::{RowId, RowPatch};
use crate::domain::survey_session::SessionMetadataPatch;
use crate::infrastructure::csv_export::export_session;
use crate::infrastructure::http_response::{accepts_brotli, csv_download_response, json_response};
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ForesightQuery {
    pub fs: f64,
}

#[derive(Debug, Serialize)]
pub struct ForesightAdvice {
    pub warning: Option<String>,
}

type HandlerResult = Result<Response, ApiError>;

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> HandlerResult {
    Ok(json_response(status, data, accepts_brotli(headers)).await?)
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    let status = if state.repository.check_health().await {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthStatus { status })
}

pub async fn get_session(headers: HeaderMap, State(state): State<Arc<AppState>>) -> HandlerResult {
    let session = state.survey_service.session().await;
    respond(StatusCode::OK, &session, &headers).await
}

pub async fn update_session(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<SessionMetadataPatch>,
) -> HandlerResult {
    let session = state.survey_service.update_metadata(patch).await;
    respond(StatusCode::OK, &session, &headers).await
}

pub async fn reset_session(headers: HeaderMap, State(state): State<Arc<AppState>>) -> HandlerResult {
    let session = state.survey_service.reset().await;
    respond(StatusCode::OK, &session, &headers).await
}

pub async fn append_benchmark(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let session = state.survey_service.append_benchmark().await;
    respond(StatusCode::CREATED, &session, &headers).await
}

/// Refused with 409 until a benchmark has produced an HI
pub async fn append_foresight(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let session = state.survey_service.append_foresight().await?;
    respond(StatusCode::CREATED, &session, &headers).await
}

pub async fn update_row(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<RowPatch>,
) -> HandlerResult {
    let update = state.survey_service.update_row(&RowId(id), patch).await?;
    respond(StatusCode::OK, &update, &headers).await
}

pub async fn delete_row(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let session = state.survey_service.delete_row(&RowId(id)).await?;
    respond(StatusCode::OK, &session, &headers).await
}

/// Fill a benchmark row from a saved benchmark
pub async fn apply_saved_benchmark(
    Path((id, benchmark_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let benchmark = state.benchmark_service.get(&benchmark_id).await?;
    let session = state
        .survey_service
        .apply_saved_benchmark(&RowId(id), &benchmark)
        .await?;
    respond(StatusCode::OK, &session, &headers).await
}

/// Save a benchmark row's station name and known elevation for reuse
pub async fn save_row_as_benchmark(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let row = state.survey_service.row(&RowId(id)).await?;
    let benchmark = state.benchmark_service.save_from_row(&row).await?;
    respond(StatusCode::CREATED, &benchmark, &headers).await
}

pub async fn validate_foresight(
    Query(query): Query<ForesightQuery>,
    State(state): State<Arc<AppState>>,
) -> Json<ForesightAdvice> {
    let warning = state.survey_service.validate_foresight(query.fs).await;
    Json(ForesightAdvice { warning })
}

pub async fn export_csv(State(state): State<Arc<AppState>>) -> HandlerResult {
    let session = state.survey_service.session().await;
    let export = export_session(&session, &state.export_settings).map_err(|e| {
        tracing::error!("CSV export error: {:#}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    tracing::info!(
        "Exporting {} rows as {}",
        session.rows.len(),
        export.filename
    );
    Ok(csv_download_response(export)?)
}

pub async fn list_benchmarks(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let benchmarks = state.benchmark_service.list().await;
    respond(StatusCode::OK, &benchmarks, &headers).await
}

pub async fn delete_benchmark(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> HandlerResult {
    let benchmarks = state.benchmark_service.delete(&id).await?;
    respond(StatusCode::OK, &benchmarks, &headers).await
}
