// Saved benchmark domain model - known points reused across sessions
use super::error::SurveyError;
use super::survey_row::SurveyRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBenchmark {
    pub id: String,
    pub name: String,
    pub elevation: f64,
    pub last_used: DateTime<Utc>,
}

impl SavedBenchmark {
    pub fn new(name: String, elevation: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            elevation,
            last_used: now,
        }
    }

    /// Capture a benchmark row as a reusable known point.
    pub fn from_row(row: &SurveyRow, now: DateTime<Utc>) -> Result<Self, SurveyError> {
        if !row.is_benchmark() {
            return Err(SurveyError::NotABenchmark(row.id.clone()));
        }
        let name = row.station_name.trim();
        match row.known_elevation() {
            Some(elevation) if !name.is_empty() => {
                Ok(Self::new(name.to_string(), elevation, now))
            }
            _ => Err(SurveyError::IncompleteBenchmark),
        }
    }
}

/// Insert a benchmark, replacing any existing entry with the same name.
pub fn upsert_by_name(list: &mut Vec<SavedBenchmark>, benchmark: SavedBenchmark) {
    match list.iter_mut().find(|b| b.name == benchmark.name) {
        Some(existing) => *existing = benchmark,
        None => list.push(benchmark),
    }
}
