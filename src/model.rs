use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a single quality metric.
///
/// Comparison goes through [`MetricStatus::severity`] so that reordering the
/// variants can never silently change escalation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ok,
    Warning,
    Alert,
}

impl MetricStatus {
    /// Explicit severity ranking, higher is worse.
    pub fn severity(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Alert => 2,
        }
    }

    /// Returns the worse of the two statuses.
    pub fn escalate(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

/// A single named quality measurement extracted from a report artifact.
///
/// Within one aggregated mapping there is at most one record per `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: i64,
    /// Decimal rendering of `value`; kept in sync by every merge.
    pub formatted_value: String,
    pub status: MetricStatus,
    pub status_message: Option<String>,
}

impl MetricRecord {
    pub fn new(name: impl Into<String>, value: i64, status: MetricStatus) -> Self {
        Self {
            name: name.into(),
            value,
            formatted_value: value.to_string(),
            status,
            status_message: None,
        }
    }
}

/// A build job as discovered on a build server, with the artifact paths of
/// its latest successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildJob {
    pub name: String,
    pub url: String,
    pub artifact_paths: Vec<String>,
}

/// A build job the collector has registered as being of interest.
///
/// Identity fields are immutable after creation; the registry only ever
/// creates and deletes entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedJob {
    pub id: Uuid,
    /// Name of the owning collector instance.
    pub collector_id: String,
    pub job_name: String,
    /// External identity of the job, used as the join key against
    /// discovered jobs.
    pub job_url: String,
}

impl TrackedJob {
    pub fn new(collector_id: &str, job_name: &str, job_url: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            collector_id: collector_id.to_owned(),
            job_name: job_name.to_owned(),
            job_url: job_url.to_owned(),
        }
    }
}

/// Classification tag carried by every quality record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityType {
    StaticAnalysis,
}

/// One consolidated quality snapshot for a job, produced once per collection
/// cycle and appended to history, never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRecord {
    /// Identity of the tracked job that produced this record.
    pub collector_item_id: Uuid,
    pub r#type: QualityType,
    pub url: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: Vec<MetricRecord>,
}
