// Repository trait for persisted survey documents
use crate::domain::saved_benchmark::SavedBenchmark;
use crate::domain::survey_session::SurveySession;
use async_trait::async_trait;

/// Two independent documents: the working session and the saved benchmark list.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Load the stored session. `None` when nothing usable is stored.
    async fn load_session(&self) -> Option<SurveySession>;

    async fn save_session(&self, session: &SurveySession) -> anyhow::Result<()>;

    /// Load the saved benchmarks. `None` when nothing usable is stored.
    async fn load_benchmarks(&self) -> Option<Vec<SavedBenchmark>>;

    async fn save_benchmarks(&self, benchmarks: &[SavedBenchmark]) -> anyhow::Result<()>;

    /// Whether the backing store can currently be written to
    async fn check_health(&self) -> bool;
}
