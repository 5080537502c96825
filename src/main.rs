// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::benchmark_service::BenchmarkService;
use crate::application::survey_repository::SurveyRepository;
use crate::application::survey_service::SurveyService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::file_repository::FileRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    append_benchmark, append_foresight, apply_saved_benchmark, delete_benchmark, delete_row,
    export_csv, get_session, health_check, list_benchmarks, reset_session, save_row_as_benchmark,
    update_row, update_session, validate_foresight,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let file_repository = FileRepository::new(config.storage.data_dir.clone());
    tracing::info!("Storing survey data in {}", file_repository.data_dir().display());
    let repository: Arc<dyn SurveyRepository> = Arc::new(file_repository);

    // Create services (application layer)
    let survey_service = SurveyService::load(repository.clone()).await;
    let benchmark_service = BenchmarkService::load(repository.clone()).await;

    // Create application state
    let state = Arc::new(AppState {
        survey_service,
        benchmark_service,
        repository,
        export_settings: config.export.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/session",
            get(get_session).patch(update_session).delete(reset_session),
        )
        .route("/api/session/rows/benchmark", post(append_benchmark))
        .route("/api/session/rows/foresight", post(append_foresight))
        .route("/api/session/rows/:id", patch(update_row).delete(delete_row))
        .route(
            "/api/session/rows/:id/saved-benchmark/:benchmark_id",
            post(apply_saved_benchmark),
        )
        .route("/api/session/rows/:id/save-benchmark", post(save_row_as_benchmark))
        .route("/api/session/validate-foresight", get(validate_foresight))
        .route("/api/session/export.csv", get(export_csv))
        .route("/api/benchmarks", get(list_benchmarks))
        .route("/api/benchmarks/:id", delete(delete_benchmark))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.server.bind_address();
    tracing::info!("Starting level-note service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(&addr).await?, router).await?;

    Ok(())
}
