// Maps domain rejections onto HTTP responses
use crate::domain::error::SurveyError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Survey(SurveyError),
    Status(StatusCode),
}

impl From<SurveyError> for ApiError {
    fn from(err: SurveyError) -> Self {
        ApiError::Survey(err)
    }
}

impl From<StatusCode> for ApiError {
    fn from(status: StatusCode) -> Self {
        ApiError::Status(status)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Survey(SurveyError::RowNotFound(_))
            | ApiError::Survey(SurveyError::SavedBenchmarkNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Survey(SurveyError::NoInstrumentHeight) => StatusCode::CONFLICT,
            ApiError::Survey(SurveyError::NotABenchmark(_))
            | ApiError::Survey(SurveyError::IncompleteBenchmark) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Status(status) => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Survey(err) => err.to_string(),
            ApiError::Status(status) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
