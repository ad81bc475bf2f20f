use regex::Regex;

use crate::collector::ReportConverter;
use crate::error::{QualipollError, Result};
use crate::model::{MetricRecord, MetricStatus};

/// Converts a JUnit XML report into quality metrics.
///
/// Reads the `tests`, `failures` and `errors` counters from the report's
/// root element and emits four metrics: `tests`, `test_failures` (warning
/// when non-zero), `test_errors` (alert when non-zero) and
/// `test_success_density` (tests minus failures minus errors).
pub struct JunitConverter {
    attribute: Regex,
}

impl JunitConverter {
    pub fn new() -> Self {
        Self {
            // Counter attributes on the root testsuite/testsuites element.
            attribute: Regex::new(r#"\b(tests|failures|errors)\s*=\s*"(\d+)""#)
                .expect("hardcoded pattern compiles"),
        }
    }
}

impl Default for JunitConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportConverter for JunitConverter {
    fn convert(&self, raw: &str) -> Result<Vec<MetricRecord>> {
        let open = raw
            .find("<testsuite")
            .ok_or_else(|| QualipollError::Report("no testsuite element found".to_owned()))?;
        let close = raw[open..]
            .find('>')
            .ok_or_else(|| QualipollError::Report("unterminated testsuite element".to_owned()))?;
        let root = &raw[open..open + close];

        let mut tests = 0i64;
        let mut failures = 0i64;
        let mut errors = 0i64;

        for capture in self.attribute.captures_iter(root) {
            let value: i64 = capture[2]
                .parse()
                .map_err(|_| QualipollError::Report(format!("bad counter: {}", &capture[0])))?;
            match &capture[1] {
                "tests" => tests = value,
                "failures" => failures = value,
                _ => errors = value,
            }
        }

        let warn_if_positive = |v: i64| {
            if v > 0 {
                MetricStatus::Warning
            } else {
                MetricStatus::Ok
            }
        };
        let alert_if_positive = |v: i64| {
            if v > 0 {
                MetricStatus::Alert
            } else {
                MetricStatus::Ok
            }
        };

        Ok(vec![
            MetricRecord::new("tests", tests, MetricStatus::Ok),
            MetricRecord::new("test_failures", failures, warn_if_positive(failures)),
            MetricRecord::new("test_errors", errors, alert_if_positive(errors)),
            MetricRecord::new(
                "test_success_density",
                tests - failures - errors,
                MetricStatus::Ok,
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(metrics: &'a [MetricRecord], name: &str) -> &'a MetricRecord {
        metrics.iter().find(|m| m.name == name).unwrap()
    }

    #[test]
    fn test_converts_junit_counters_to_metrics() {
        let converter = JunitConverter::new();
        let report = r#"<?xml version="1.0"?>
            <testsuite name="suite" tests="14" failures="1" errors="2" skipped="0">
                <testcase name="a"/>
            </testsuite>"#;

        let metrics = converter.convert(report).unwrap();

        assert_eq!(metrics.len(), 4);

        let tests = get(&metrics, "tests");
        assert_eq!((tests.value, tests.formatted_value.as_str()), (14, "14"));
        assert_eq!(tests.status, MetricStatus::Ok);

        let failures = get(&metrics, "test_failures");
        assert_eq!((failures.value, failures.formatted_value.as_str()), (1, "1"));
        assert_eq!(failures.status, MetricStatus::Warning);

        let errors = get(&metrics, "test_errors");
        assert_eq!((errors.value, errors.formatted_value.as_str()), (2, "2"));
        assert_eq!(errors.status, MetricStatus::Alert);

        let density = get(&metrics, "test_success_density");
        assert_eq!((density.value, density.formatted_value.as_str()), (11, "11"));
        assert_eq!(density.status, MetricStatus::Ok);
    }

    #[test]
    fn test_clean_run_is_all_ok() {
        let converter = JunitConverter::new();
        let metrics = converter
            .convert(r#"<testsuite tests="5" failures="0" errors="0"/>"#)
            .unwrap();

        assert!(metrics.iter().all(|m| m.status == MetricStatus::Ok));
        assert_eq!(get(&metrics, "test_success_density").value, 5);
    }

    #[test]
    fn test_testsuites_wrapper_is_accepted() {
        let converter = JunitConverter::new();
        let metrics = converter
            .convert(r#"<testsuites tests="7" failures="2" errors="0"></testsuites>"#)
            .unwrap();

        assert_eq!(get(&metrics, "tests").value, 7);
        assert_eq!(get(&metrics, "test_failures").status, MetricStatus::Warning);
    }

    #[test]
    fn test_non_junit_artifact_is_rejected() {
        let converter = JunitConverter::new();
        assert!(converter.convert("<html><body>coverage</body></html>").is_err());
    }
}
