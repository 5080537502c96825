// Benchmark service - Use cases for the saved benchmark list
use crate::application::survey_repository::SurveyRepository;
use crate::domain::error::SurveyError;
use crate::domain::saved_benchmark::{upsert_by_name, SavedBenchmark};
use crate::domain::survey_row::SurveyRow;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct BenchmarkService {
    repository: Arc<dyn SurveyRepository>,
    benchmarks: Arc<Mutex<Vec<SavedBenchmark>>>,
}

impl BenchmarkService {
    pub async fn load(repository: Arc<dyn SurveyRepository>) -> Self {
        let benchmarks = repository.load_benchmarks().await.unwrap_or_default();
        tracing::info!("Loaded {} saved benchmarks", benchmarks.len());

        Self {
            repository,
            benchmarks: Arc::new(Mutex::new(benchmarks)),
        }
    }

    pub async fn list(&self) -> Vec<SavedBenchmark> {
        self.benchmarks.lock().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<SavedBenchmark, SurveyError> {
        self.benchmarks
            .lock()
            .await
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| SurveyError::SavedBenchmarkNotFound(id.to_string()))
    }

    /// Save a benchmark row's name and known elevation for reuse.
    pub async fn save_from_row(&self, row: &SurveyRow) -> Result<SavedBenchmark, SurveyError> {
        let benchmark = SavedBenchmark::from_row(row, Utc::now())?;

        let mut benchmarks = self.benchmarks.lock().await;
        upsert_by_name(&mut benchmarks, benchmark.clone());
        self.persist(&benchmarks).await;

        tracing::info!(
            "Saved benchmark {} at {:.3}",
            benchmark.name,
            benchmark.elevation
        );
        Ok(benchmark)
    }

    pub async fn delete(&self, id: &str) -> Result<Vec<SavedBenchmark>, SurveyError> {
        let mut benchmarks = self.benchmarks.lock().await;
        let before = benchmarks.len();
        benchmarks.retain(|b| b.id != id);
        if benchmarks.len() == before {
            return Err(SurveyError::SavedBenchmarkNotFound(id.to_string()));
        }

        self.persist(&benchmarks).await;
        tracing::info!("Deleted saved benchmark {}", id);
        Ok(benchmarks.clone())
    }

    async fn persist(&self, benchmarks: &[SavedBenchmark]) {
        if let Err(e) = self.repository.save_benchmarks(benchmarks).await {
            tracing::error!("Failed to save benchmark list: {:#}", e);
        }
    }
}
