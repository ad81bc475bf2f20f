use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::model::{BuildJob, MetricRecord, QualityRecord, TrackedJob};

/// Build-server access: job discovery and artifact download.
#[async_trait]
pub trait BuildClient: Send + Sync {
    /// Lists jobs across the given server addresses.
    ///
    /// `Ok(None)` means discovery was unavailable, as opposed to servers
    /// that answered with zero jobs.
    async fn list_jobs(&self, servers: &[String]) -> Result<Option<Vec<BuildJob>>>;

    /// Downloads the latest report artifacts of `job` whose filenames match
    /// at least one pattern. Each element is one raw report body.
    async fn fetch_latest_artifacts(&self, job: &BuildJob, patterns: &[Regex])
        -> Result<Vec<String>>;
}

/// Decodes one raw report artifact into a set of named metrics.
pub trait ReportConverter: Send + Sync {
    fn convert(&self, raw: &str) -> Result<Vec<MetricRecord>>;
}

/// Persistence for the tracked-job registry.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn find_all(&self, collector_id: &str) -> Result<Vec<TrackedJob>>;

    async fn create(&self, job: &TrackedJob) -> Result<()>;

    async fn delete(&self, job: &TrackedJob) -> Result<()>;
}

/// Persistence for produced quality records. Records are append-only.
#[async_trait]
pub trait QualityStore: Send + Sync {
    async fn save(&self, record: &QualityRecord) -> Result<()>;
}
