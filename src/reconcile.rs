use std::collections::HashSet;

use crate::model::{BuildJob, TrackedJob};

/// Instructions for bringing the tracked-job registry in line with the jobs
/// currently discovered on the build servers. Produced by [`reconcile`];
/// persisting the changes is the caller's job.
#[derive(Debug, Default, PartialEq)]
pub struct ReconcilePlan<'a> {
    /// Discovered jobs with no matching registry entry.
    pub to_create: Vec<&'a BuildJob>,
    /// Registry entries whose job no longer exists on any server.
    pub to_delete: Vec<&'a TrackedJob>,
}

/// Computes the diff between the discovered job set and the tracked
/// registry.
///
/// A discovered job is new iff no tracked job matches on both name and url.
/// A tracked job is stale iff its url is absent from the discovered url set.
/// Pure set comparison, reproducible for identical inputs.
pub fn reconcile<'a>(
    discovered: &'a [BuildJob],
    tracked: &'a [TrackedJob],
) -> ReconcilePlan<'a> {
    let tracked_keys: HashSet<(&str, &str)> = tracked
        .iter()
        .map(|job| (job.job_name.as_str(), job.job_url.as_str()))
        .collect();

    let discovered_urls: HashSet<&str> = discovered.iter().map(|job| job.url.as_str()).collect();

    let to_create = discovered
        .iter()
        .filter(|job| !tracked_keys.contains(&(job.name.as_str(), job.url.as_str())))
        .collect();

    let to_delete = tracked
        .iter()
        .filter(|job| !discovered_urls.contains(job.job_url.as_str()))
        .collect();

    ReconcilePlan {
        to_create,
        to_delete,
    }
}
