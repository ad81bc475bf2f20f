use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file structure for qualipoll.
///
/// Loaded from a TOML file; every section has usable defaults except the
/// build-server list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Collector identity and polling behaviour
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Storage location
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectorConfig {
    /// Name of this collector instance, used as the registry owner key
    #[serde(default = "default_collector_name")]
    pub name: String,

    /// Jenkins base URLs to poll
    #[serde(default)]
    pub servers: Vec<String>,

    /// Artifact filename patterns marking a job as being of interest
    #[serde(default = "default_artifact_patterns")]
    pub artifact_patterns: Vec<String>,

    /// Seconds between collection cycles
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory for the job registry and quality records.
    /// Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,
}

fn default_collector_name() -> String {
    "jenkins-codequality".to_owned()
}

fn default_artifact_patterns() -> Vec<String> {
    vec![r".*\.xml".to_owned()]
}

fn default_poll_interval_secs() -> u64 {
    300
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            name: default_collector_name(),
            servers: Vec::new(),
            artifact_patterns: default_artifact_patterns(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from the given TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.collector.servers.is_empty() {
            anyhow::bail!("No build servers configured in {}", path.display());
        }

        Ok(config)
    }

    /// Compiles the configured artifact patterns.
    pub fn compiled_patterns(&self) -> Result<Vec<Regex>> {
        self.collector
            .artifact_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid artifact pattern: {pattern}"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            name = "quality"
            servers = ["http://jenkins:8080/"]
            artifact-patterns = [".*\\.xml", ".*\\.junit"]
            poll-interval-secs = 60

            [storage]
            data-dir = "/var/lib/qualipoll"
            "#,
        )
        .unwrap();

        assert_eq!(config.collector.name, "quality");
        assert_eq!(config.collector.servers, vec!["http://jenkins:8080/"]);
        assert_eq!(config.collector.poll_interval_secs, 60);
        assert_eq!(config.compiled_patterns().unwrap().len(), 2);
        assert_eq!(
            config.storage.data_dir,
            Some(PathBuf::from("/var/lib/qualipoll"))
        );
    }

    #[test]
    fn test_defaults_apply() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            servers = ["http://jenkins:8080/"]
            "#,
        )
        .unwrap();

        assert_eq!(config.collector.name, "jenkins-codequality");
        assert_eq!(config.collector.artifact_patterns, vec![r".*\.xml"]);
        assert_eq!(config.collector.poll_interval_secs, 300);
        assert!(config.storage.data_dir.is_none());

        let patterns = config.compiled_patterns().unwrap();
        assert!(patterns[0].is_match("target/surefire/report.xml"));
        assert!(!patterns[0].is_match("site.tar.gz"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config: Config = toml::from_str(
            r#"
            [collector]
            servers = ["http://jenkins:8080/"]
            artifact-patterns = ["(["]
            "#,
        )
        .unwrap();

        assert!(config.compiled_patterns().is_err());
    }
}
