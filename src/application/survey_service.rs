// Survey service - Session use cases, each applied atomically and persisted
use crate::application::survey_repository::SurveyRepository;
use crate::domain::error::SurveyError;
use crate::domain::saved_benchmark::SavedBenchmark;
use crate::domain::survey_row::{RowId, RowPatch, SurveyRow};
use crate::domain::survey_session::{SessionMetadataPatch, SurveySession};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Session after a row edit, plus the foresight advisory if the edit set one.
#[derive(Debug, Clone, Serialize)]
pub struct RowUpdate {
    pub session: SurveySession,
    pub warning: Option<String>,
}

#[derive(Clone)]
pub struct SurveyService {
    repository: Arc<dyn SurveyRepository>,
    session: Arc<Mutex<SurveySession>>,
}

impl SurveyService {
    /// Restore the stored session, or start a fresh one when none is usable.
    pub async fn load(repository: Arc<dyn SurveyRepository>) -> Self {
        let mut session = match repository.load_session().await {
            Some(session) => session,
            None => {
                tracing::info!("No stored survey session, starting a new one");
                SurveySession::default()
            }
        };
        session.renumber();
        session.recalculate();

        tracing::info!(
            "Survey session {} loaded with {} rows",
            session.id,
            session.rows.len()
        );

        Self {
            repository,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn session(&self) -> SurveySession {
        self.session.lock().await.clone()
    }

    pub async fn row(&self, id: &RowId) -> Result<SurveyRow, SurveyError> {
        self.session
            .lock()
            .await
            .row(id)
            .cloned()
            .ok_or_else(|| SurveyError::RowNotFound(id.clone()))
    }

    pub async fn update_metadata(&self, patch: SessionMetadataPatch) -> SurveySession {
        let ((), session) = self
            .apply(|session, now| session.update_metadata(patch, now))
            .await;
        session
    }

    pub async fn append_benchmark(&self) -> SurveySession {
        let (id, session) = self
            .apply(|session, now| session.append_benchmark(now))
            .await;
        tracing::info!("Appended benchmark row {}", id);
        session
    }

    pub async fn append_foresight(&self) -> Result<SurveySession, SurveyError> {
        let (id, session) = self
            .try_apply(|session, now| session.append_foresight(now))
            .await
            .inspect_err(|e| tracing::info!("Foresight append refused: {}", e))?;
        tracing::info!("Appended foresight row {}", id);
        Ok(session)
    }

    pub async fn update_row(&self, id: &RowId, patch: RowPatch) -> Result<RowUpdate, SurveyError> {
        let fs = patch.fs.flatten();
        let (is_foresight, session) = self
            .try_apply(|session, now| {
                session.update_row(id, patch, now)?;
                Ok(session.row(id).is_some_and(|r| !r.is_benchmark()))
            })
            .await?;

        let warning = match fs {
            Some(fs) if is_foresight => session.validate_foresight(fs),
            _ => None,
        };
        if let Some(warning) = &warning {
            tracing::warn!("Row {}: {}", id, warning);
        }

        Ok(RowUpdate { session, warning })
    }

    pub async fn delete_row(&self, id: &RowId) -> Result<SurveySession, SurveyError> {
        let (_, session) = self
            .try_apply(|session, now| session.delete_row(id, now))
            .await?;
        tracing::info!("Deleted row {}", id);
        Ok(session)
    }

    /// Copy a saved benchmark's name and elevation into a benchmark row.
    pub async fn apply_saved_benchmark(
        &self,
        id: &RowId,
        benchmark: &SavedBenchmark,
    ) -> Result<SurveySession, SurveyError> {
        let (_, session) = self
            .try_apply(|session, now| {
                let row = session
                    .row(id)
                    .ok_or_else(|| SurveyError::RowNotFound(id.clone()))?;
                if !row.is_benchmark() {
                    return Err(SurveyError::NotABenchmark(id.clone()));
                }
                session.update_row(
                    id,
                    RowPatch {
                        station_name: Some(benchmark.name.clone()),
                        known_elevation: Some(Some(benchmark.elevation)),
                        ..Default::default()
                    },
                    now,
                )
            })
            .await?;
        Ok(session)
    }

    pub async fn validate_foresight(&self, fs: f64) -> Option<String> {
        self.session.lock().await.validate_foresight(fs)
    }

    /// Discard the whole session and start an empty one.
    pub async fn reset(&self) -> SurveySession {
        let mut guard = self.session.lock().await;
        *guard = SurveySession::default();
        let session = guard.clone();
        self.persist(&session).await;
        tracing::info!("Survey session reset, new id {}", session.id);
        session
    }

    async fn apply<T, F>(&self, op: F) -> (T, SurveySession)
    where
        F: FnOnce(&mut SurveySession, DateTime<Utc>) -> T,
    {
        let mut guard = self.session.lock().await;
        let value = op(&mut *guard, Utc::now());

        let session = guard.clone();
        self.persist(&session).await;
        (value, session)
    }

    /// Apply a change that may be refused. The edit runs on a copy and is
    /// committed and persisted under the session lock only when it succeeds,
    /// so no caller ever observes a half-applied edit.
    async fn try_apply<T, F>(&self, op: F) -> Result<(T, SurveySession), SurveyError>
    where
        F: FnOnce(&mut SurveySession, DateTime<Utc>) -> Result<T, SurveyError>,
    {
        let mut guard = self.session.lock().await;
        let mut working = guard.clone();
        let value = op(&mut working, Utc::now())?;
        *guard = working;

        let session = guard.clone();
        self.persist(&session).await;
        Ok((value, session))
    }

    async fn persist(&self, session: &SurveySession) {
        if let Err(e) = self.repository.save_session(session).await {
            tracing::error!("Failed to save survey session {}: {:#}", session.id, e);
        }
    }
}
