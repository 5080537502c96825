// In-memory repository for service and handler tests
use crate::application::survey_repository::SurveyRepository;
use crate::domain::saved_benchmark::SavedBenchmark;
use crate::domain::survey_session::SurveySession;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryRepository {
    session: Mutex<Option<SurveySession>>,
    benchmarks: Mutex<Option<Vec<SavedBenchmark>>>,
    failing: bool,
}

impl MemoryRepository {
    /// A store whose saves always fail and whose health check reports degraded.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SurveyRepository for MemoryRepository {
    async fn load_session(&self) -> Option<SurveySession> {
        self.session.lock().unwrap().clone()
    }

    async fn save_session(&self, session: &SurveySession) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("store unavailable");
        }
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    async fn load_benchmarks(&self) -> Option<Vec<SavedBenchmark>> {
        self.benchmarks.lock().unwrap().clone()
    }

    async fn save_benchmarks(&self, benchmarks: &[SavedBenchmark]) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("store unavailable");
        }
        *self.benchmarks.lock().unwrap() = Some(benchmarks.to_vec());
        Ok(())
    }

    async fn check_health(&self) -> bool {
        !self.failing
    }
}
