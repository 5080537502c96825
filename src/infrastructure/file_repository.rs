// JSON document store on the local filesystem
use crate::application::survey_repository::SurveyRepository;
use crate::domain::saved_benchmark::SavedBenchmark;
use crate::domain::survey_session::SurveySession;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const SESSION_KEY: &str = "hi_survey_session";
const BENCHMARKS_KEY: &str = "hi_saved_benchmarks";

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileRepository {
    data_dir: PathBuf,
}

impl FileRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    /// Read and parse a document. Missing, unreadable or malformed documents
    /// all come back as `None`.
    async fn read_document<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.document_path(key);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored document at {}", path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(document) => Some(document),
            Err(e) => {
                tracing::warn!("Discarding invalid document {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write through a temporary file so a crash never leaves half a document.
    async fn write_document<T: Serialize + ?Sized>(&self, key: &str, document: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.data_dir.display()))?;

        let path = self.document_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(document).context("Failed to serialize document")?;

        tokio::fs::write(&tmp_path, json)
            .await
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl SurveyRepository for FileRepository {
    async fn load_session(&self) -> Option<SurveySession> {
        self.read_document(SESSION_KEY).await
    }

    async fn save_session(&self, session: &SurveySession) -> Result<()> {
        self.write_document(SESSION_KEY, session).await
    }

    async fn load_benchmarks(&self) -> Option<Vec<SavedBenchmark>> {
        self.read_document(BENCHMARKS_KEY).await
    }

    async fn save_benchmarks(&self, benchmarks: &[SavedBenchmark]) -> Result<()> {
        self.write_document(BENCHMARKS_KEY, benchmarks).await
    }

    async fn check_health(&self) -> bool {
        if tokio::fs::create_dir_all(&self.data_dir).await.is_err() {
            return false;
        }
        match tokio::fs::metadata(&self.data_dir).await {
            Ok(metadata) => metadata.is_dir() && !metadata.permissions().readonly(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_missing_documents_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileRepository::new(dir.path());

        assert!(repository.load_session().await.is_none());
        assert!(repository.load_benchmarks().await.is_none());
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileRepository::new(dir.path().join("nested"));
        let mut session = SurveySession::default();
        session.site_name = "Riverside".to_string();
        session.append_benchmark(Utc::now());

        repository.save_session(&session).await.unwrap();
        let loaded = repository.load_session().await.unwrap();

        assert_eq!(loaded, session);
        assert!(!repository.document_path(SESSION_KEY).with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_invalid_document_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileRepository::new(dir.path());
        std::fs::write(repository.document_path(SESSION_KEY), "{ not json").unwrap();
        std::fs::write(
            repository.document_path(BENCHMARKS_KEY),
            r#"{"unexpected": "shape"}"#,
        )
        .unwrap();

        assert!(repository.load_session().await.is_none());
        assert!(repository.load_benchmarks().await.is_none());
    }

    #[tokio::test]
    async fn test_benchmarks_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileRepository::new(dir.path());
        let benchmarks = vec![SavedBenchmark::new("BM-1".to_string(), 12.345, Utc::now())];

        repository.save_benchmarks(&benchmarks).await.unwrap();

        assert_eq!(repository.load_benchmarks().await.unwrap(), benchmarks);
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let repository = FileRepository::new(dir.path().join("data"));

        assert!(repository.check_health().await);
        assert!(repository.data_dir().is_dir());
    }
}
