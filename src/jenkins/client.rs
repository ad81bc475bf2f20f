use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::collector::BuildClient;
use crate::error::{QualipollError, Result};
use crate::model::BuildJob;

/// Fields requested from the Jenkins JSON API when listing jobs.
const JOBS_TREE: &str = "jobs[name,url,lastSuccessfulBuild[artifacts[relativePath]]]";

#[derive(Deserialize)]
struct JobsResponse {
    #[serde(default)]
    jobs: Vec<JobNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobNode {
    name: String,
    url: String,
    last_successful_build: Option<BuildNode>,
}

#[derive(Deserialize)]
struct BuildNode {
    #[serde(default)]
    artifacts: Vec<ArtifactNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactNode {
    relative_path: String,
}

/// HTTP client for the Jenkins JSON API.
///
/// Lists jobs (with the artifact paths of their last successful build)
/// across multiple Jenkins instances and downloads report artifacts.
pub struct JenkinsClient {
    client: Client,
}

impl JenkinsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("qualipoll/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| QualipollError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn list_server_jobs(&self, server: &str) -> Result<Vec<BuildJob>> {
        let url = Url::parse(server)
            .map_err(|e| QualipollError::Config(format!("Invalid server URL {server}: {e}")))?
            .join("api/json")
            .map_err(|e| QualipollError::Config(format!("Invalid server URL {server}: {e}")))?;

        let response: JobsResponse = self
            .client
            .get(url)
            .query(&[("tree", JOBS_TREE)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .jobs
            .into_iter()
            .map(|node| BuildJob {
                name: node.name,
                url: node.url,
                artifact_paths: node
                    .last_successful_build
                    .map(|build| {
                        build
                            .artifacts
                            .into_iter()
                            .map(|a| a.relative_path)
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn artifact_url(job: &BuildJob, path: &str) -> Result<Url> {
        Url::parse(&job.url)
            .and_then(|u| u.join("lastSuccessfulBuild/artifact/"))
            .and_then(|u| u.join(path))
            .map_err(|e| QualipollError::Api(format!("Invalid artifact URL for {}: {e}", job.url)))
    }
}

#[async_trait]
impl BuildClient for JenkinsClient {
    /// Lists jobs across all servers. Servers that fail to answer are
    /// logged and skipped; when no server answers at all the result is
    /// `None`, the unavailable sentinel.
    async fn list_jobs(&self, servers: &[String]) -> Result<Option<Vec<BuildJob>>> {
        let mut jobs = Vec::new();
        let mut any_available = false;

        for server in servers {
            match self.list_server_jobs(server).await {
                Ok(server_jobs) => {
                    debug!("Server {server} listed {} jobs", server_jobs.len());
                    any_available = true;
                    jobs.extend(server_jobs);
                }
                Err(e) => warn!("Failed to list jobs from {server}: {e}"),
            }
        }

        Ok(any_available.then_some(jobs))
    }

    async fn fetch_latest_artifacts(
        &self,
        job: &BuildJob,
        patterns: &[Regex],
    ) -> Result<Vec<String>> {
        let mut reports = Vec::new();

        for path in &job.artifact_paths {
            if !patterns.iter().any(|pattern| pattern.is_match(path)) {
                continue;
            }

            let url = Self::artifact_url(job, path)?;
            debug!("Downloading artifact {url}");
            let body = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            reports.push(body);
        }

        Ok(reports)
    }
}
