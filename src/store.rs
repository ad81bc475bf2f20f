use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info};

use crate::collector::{JobStore, QualityStore};
use crate::error::{QualipollError, Result};
use crate::model::{QualityRecord, TrackedJob};

struct Inner {
    registry_file: PathBuf,
    records_file: PathBuf,
    // Serializes read-modify-write against per-job saves running in
    // parallel inside one cycle.
    lock: Mutex<()>,
}

/// File-backed persistence for the tracked-job registry and quality
/// records.
///
/// The registry lives in `tracked-jobs.json`; quality records are appended
/// to `quality-records.jsonl`, one JSON document per line, and never
/// rewritten. Files live in the configured data directory, defaulting to
/// the platform data dir (e.g. `~/.local/share/qualipoll` on Linux).
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<Inner>,
}

impl FileStore {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .ok_or_else(|| QualipollError::Storage("No data directory found".into()))?
                .join("qualipoll"),
        };

        fs::create_dir_all(&dir)?;
        info!("Storing collector state in: {}", dir.display());

        Ok(Self {
            inner: Arc::new(Inner {
                registry_file: dir.join("tracked-jobs.json"),
                records_file: dir.join("quality-records.jsonl"),
                lock: Mutex::new(()),
            }),
        })
    }

    fn read_registry(&self) -> Result<Vec<TrackedJob>> {
        if !self.inner.registry_file.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.inner.registry_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_registry(&self, jobs: &[TrackedJob]) -> Result<()> {
        let content = serde_json::to_string(jobs)?;
        fs::write(&self.inner.registry_file, content)?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for FileStore {
    async fn find_all(&self, collector_id: &str) -> Result<Vec<TrackedJob>> {
        let _guard = self.inner.lock.lock().unwrap();
        Ok(self
            .read_registry()?
            .into_iter()
            .filter(|job| job.collector_id == collector_id)
            .collect())
    }

    async fn create(&self, job: &TrackedJob) -> Result<()> {
        let _guard = self.inner.lock.lock().unwrap();
        let mut jobs = self.read_registry()?;
        jobs.push(job.clone());
        self.write_registry(&jobs)?;
        debug!("Registered job {}", job.job_url);
        Ok(())
    }

    async fn delete(&self, job: &TrackedJob) -> Result<()> {
        let _guard = self.inner.lock.lock().unwrap();
        let mut jobs = self.read_registry()?;
        jobs.retain(|j| j.id != job.id);
        self.write_registry(&jobs)?;
        debug!("Deregistered job {}", job.job_url);
        Ok(())
    }
}

#[async_trait]
impl QualityStore for FileStore {
    async fn save(&self, record: &QualityRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;

        let _guard = self.inner.lock.lock().unwrap();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.inner.records_file)?;
        writeln!(file, "{line}")?;

        debug!("Saved quality record for {}", record.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use indexmap::IndexMap;

    use super::*;
    use crate::model::{MetricRecord, MetricStatus};
    use crate::record::build_quality_record;

    fn store(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(Some(dir.path().to_path_buf())).unwrap()
    }

    #[tokio::test]
    async fn test_registry_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let job = TrackedJob::new("quality", "nightly", "http://jenkins/job/nightly/");
        store.create(&job).await.unwrap();

        let found = store.find_all("quality").await.unwrap();
        assert_eq!(found, vec![job.clone()]);

        // Entries belong to their collector only.
        assert!(store.find_all("other").await.unwrap().is_empty());

        store.delete(&job).await.unwrap();
        assert!(store.find_all("quality").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_registry_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let job = TrackedJob::new("quality", "nightly", "http://jenkins/job/nightly/");

        store(&dir).create(&job).await.unwrap();

        let reopened = store(&dir);
        assert_eq!(reopened.find_all("quality").await.unwrap(), vec![job]);
    }

    #[tokio::test]
    async fn test_records_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);

        let job = TrackedJob::new("quality", "J", "http://jenkins/job/J/");
        let mut metrics = IndexMap::new();
        metrics.insert(
            "tests".to_owned(),
            MetricRecord::new("tests", 3, MetricStatus::Ok),
        );

        let record = build_quality_record(&job, &metrics, Utc::now());
        store.save(&record).await.unwrap();
        store.save(&record).await.unwrap();

        let content = fs::read_to_string(dir.path().join("quality-records.jsonl")).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: QualityRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed.url, "http://jenkins/job/J/");
        assert_eq!(parsed.collector_item_id, job.id);
    }
}
