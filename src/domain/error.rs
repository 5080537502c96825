use super::survey_row::RowId;
use thiserror::Error;

/// Rejections raised by session and saved-benchmark operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveyError {
    #[error("row not found: {0}")]
    RowNotFound(RowId),

    #[error("enter the backsight (BS) of a benchmark before adding foresight points")]
    NoInstrumentHeight,

    #[error("row {0} is not a benchmark")]
    NotABenchmark(RowId),

    #[error("enter a station name and known elevation before saving the benchmark")]
    IncompleteBenchmark,

    #[error("saved benchmark not found: {0}")]
    SavedBenchmarkNotFound(String),
}
