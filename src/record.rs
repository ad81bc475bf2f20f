use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::{MetricRecord, QualityRecord, QualityType, TrackedJob};

/// Wraps an aggregated metric mapping into a persistable quality record for
/// the given tracked job.
///
/// Pure construction: copies the job's url and name, links the record back to
/// the tracked job through its id, and takes the mapping values as the metric
/// set.
pub fn build_quality_record(
    job: &TrackedJob,
    metrics: &IndexMap<String, MetricRecord>,
    timestamp: DateTime<Utc>,
) -> QualityRecord {
    QualityRecord {
        collector_item_id: job.id,
        r#type: QualityType::StaticAnalysis,
        url: job.job_url.clone(),
        name: job.job_name.clone(),
        timestamp,
        metrics: metrics.values().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::MetricStatus;

    #[test]
    fn test_record_copies_job_identity() {
        let job = TrackedJob::new("quality", "nightly-build", "http://jenkins/job/nightly/");
        let mut metrics = IndexMap::new();
        metrics.insert(
            "tests".to_owned(),
            MetricRecord::new("tests", 14, MetricStatus::Ok),
        );

        let now = Utc::now();
        let record = build_quality_record(&job, &metrics, now);

        assert_eq!(record.collector_item_id, job.id);
        assert_eq!(record.url, "http://jenkins/job/nightly/");
        assert_eq!(record.name, "nightly-build");
        assert_eq!(record.timestamp, now);
        assert_eq!(record.r#type, QualityType::StaticAnalysis);
        assert_eq!(record.metrics.len(), 1);
    }

    #[test]
    fn test_record_from_two_aggregated_reports() {
        let job = TrackedJob::new("quality", "J", "http://jenkins/job/J/");
        let reports = vec![
            vec![
                MetricRecord::new("tests", 14, MetricStatus::Ok),
                MetricRecord::new("test_failures", 1, MetricStatus::Warning),
            ],
            vec![
                MetricRecord::new("test_failures", 1, MetricStatus::Warning),
                MetricRecord::new("test_errors", 2, MetricStatus::Alert),
            ],
        ];

        let record = build_quality_record(&job, &aggregate(&reports), Utc::now());

        assert_eq!(record.url, "http://jenkins/job/J/");
        let failures = record
            .metrics
            .iter()
            .find(|m| m.name == "test_failures")
            .unwrap();
        assert_eq!(failures.value, 2);
        assert_eq!(failures.status, MetricStatus::Warning);
    }
}
