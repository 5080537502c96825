// Application state for HTTP handlers
use crate::application::benchmark_service::BenchmarkService;
use crate::application::survey_repository::SurveyRepository;
use crate::application::survey_service::SurveyService;
use crate::infrastructure::config::ExportSettings;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub survey_service: SurveyService,
    pub benchmark_service: BenchmarkService,
    pub repository: Arc<dyn SurveyRepository>,
    pub export_settings: ExportSettings,
}
