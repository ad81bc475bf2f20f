use std::collections::HashMap;

use chrono::Utc;
use log::{debug, info, warn};
use regex::Regex;

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::model::{BuildJob, TrackedJob};
use crate::reconcile::reconcile;
use crate::record::build_quality_record;

use super::ports::{BuildClient, JobStore, QualityStore, ReportConverter};

/// Counters for one completed collection cycle, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Jobs discovered across all servers.
    pub discovered: usize,
    /// Jobs whose artifacts matched a configured pattern.
    pub matched: usize,
    /// Registry entries created this cycle.
    pub created: usize,
    /// Registry entries deleted this cycle.
    pub deleted: usize,
    /// Quality records persisted this cycle.
    pub collected: usize,
    /// Jobs that failed fetch, conversion or persistence.
    pub failed: usize,
}

/// Orchestrates one poll cycle: discover jobs, filter jobs of interest,
/// reconcile the tracked registry, then fetch and aggregate report artifacts
/// per tracked job.
///
/// Parameterized over its four collaborators so the orchestration logic can
/// be exercised against in-memory fakes.
pub struct CollectionCycle<C, V, J, Q> {
    collector_id: String,
    patterns: Vec<Regex>,
    client: C,
    converter: V,
    job_store: J,
    quality_store: Q,
}

impl<C, V, J, Q> CollectionCycle<C, V, J, Q>
where
    C: BuildClient,
    V: ReportConverter,
    J: JobStore,
    Q: QualityStore,
{
    pub fn new(
        collector_id: String,
        patterns: Vec<Regex>,
        client: C,
        converter: V,
        job_store: J,
        quality_store: Q,
    ) -> Self {
        Self {
            collector_id,
            patterns,
            client,
            converter,
            job_store,
            quality_store,
        }
    }

    /// Runs one collection cycle against the given build servers.
    ///
    /// An unavailable discovery result aborts the cycle with no side
    /// effects. Per-job failures are logged and counted; they never stop
    /// the remaining jobs.
    pub async fn run(&self, servers: &[String]) -> Result<CycleSummary> {
        let mut summary = CycleSummary::default();

        let Some(jobs) = self.client.list_jobs(servers).await? else {
            warn!("Job discovery unavailable, skipping cycle");
            return Ok(summary);
        };
        summary.discovered = jobs.len();

        let interesting: Vec<BuildJob> = jobs
            .into_iter()
            .filter(|job| self.matches_patterns(job))
            .collect();
        summary.matched = interesting.len();
        info!(
            "Discovered {} jobs, {} with matching report artifacts",
            summary.discovered, summary.matched
        );

        let tracked = self.job_store.find_all(&self.collector_id).await?;
        let plan = reconcile(&interesting, &tracked);

        for job in &plan.to_create {
            let new_job = TrackedJob::new(&self.collector_id, &job.name, &job.url);
            match self.job_store.create(&new_job).await {
                Ok(()) => summary.created += 1,
                Err(e) => warn!("Failed to register job {}: {e}", job.url),
            }
        }
        for job in &plan.to_delete {
            match self.job_store.delete(job).await {
                Ok(()) => summary.deleted += 1,
                Err(e) => warn!("Failed to deregister job {}: {e}", job.job_url),
            }
        }

        // Re-read the registry so jobs created above are collected this
        // cycle. Keyed on (name, url), the same join key reconciliation
        // matches on.
        let tracked = self.job_store.find_all(&self.collector_id).await?;
        let registry: HashMap<(&str, &str), &TrackedJob> = tracked
            .iter()
            .map(|job| ((job.job_name.as_str(), job.job_url.as_str()), job))
            .collect();

        let collections = interesting.iter().map(|job| {
            let tracked_job = registry
                .get(&(job.name.as_str(), job.url.as_str()))
                .copied();
            self.collect_job(job, tracked_job)
        });

        for outcome in futures::future::join_all(collections).await {
            match outcome {
                Ok(true) => summary.collected += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!("Job collection failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Cycle complete: {} records saved, {} created, {} deleted, {} failed",
            summary.collected, summary.created, summary.deleted, summary.failed
        );

        Ok(summary)
    }

    fn matches_patterns(&self, job: &BuildJob) -> bool {
        job.artifact_paths
            .iter()
            .any(|path| self.patterns.iter().any(|pattern| pattern.is_match(path)))
    }

    /// Collects and persists one quality record for a single job. Returns
    /// `Ok(false)` when the job has no registry entry yet and is left for
    /// the next cycle.
    async fn collect_job(&self, job: &BuildJob, tracked: Option<&TrackedJob>) -> Result<bool> {
        let Some(tracked) = tracked else {
            debug!("Job {} not tracked yet, skipping this cycle", job.url);
            return Ok(false);
        };

        let artifacts = self.client.fetch_latest_artifacts(job, &self.patterns).await?;
        debug!("Fetched {} report artifacts for {}", artifacts.len(), job.url);

        let reports = artifacts
            .iter()
            .map(|raw| self.converter.convert(raw))
            .collect::<Result<Vec<_>>>()?;

        let metrics = aggregate(&reports);
        let record = build_quality_record(tracked, &metrics, Utc::now());
        self.quality_store.save(&record).await?;

        Ok(true)
    }
}
