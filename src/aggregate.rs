use indexmap::IndexMap;

use crate::model::MetricRecord;

/// Merges the metric sets of multiple report artifacts for one job into a
/// single name-to-metric mapping.
///
/// Reports are processed in the order they were fetched. The first record
/// seen for a name is inserted verbatim; every later record with the same
/// name is folded into it:
///
/// - `value` becomes the sum of both values
/// - `formatted_value` is re-rendered as the decimal form of the sum
/// - `status` escalates to the worse of the two severities
/// - `status_message` is the comma concatenation of both messages, with
///   empty or absent operands skipped (earlier message first)
///
/// The merge is order-independent for everything except message
/// concatenation order. Inputs are not mutated; empty input yields an empty
/// mapping.
pub fn aggregate(reports: &[Vec<MetricRecord>]) -> IndexMap<String, MetricRecord> {
    let mut merged: IndexMap<String, MetricRecord> = IndexMap::new();

    for report in reports {
        for metric in report {
            match merged.get(&metric.name) {
                None => {
                    merged.insert(metric.name.clone(), metric.clone());
                }
                Some(current) => {
                    let combined = merge_pair(current, metric);
                    merged.insert(metric.name.clone(), combined);
                }
            }
        }
    }

    merged
}

fn merge_pair(current: &MetricRecord, incoming: &MetricRecord) -> MetricRecord {
    let value = current.value + incoming.value;
    MetricRecord {
        name: current.name.clone(),
        value,
        formatted_value: value.to_string(),
        status: current.status.escalate(incoming.status),
        status_message: concat_messages(
            current.status_message.as_deref(),
            incoming.status_message.as_deref(),
        ),
    }
}

/// Joins two optional status messages with a comma, earlier message first.
/// Empty strings count as absent; both absent yields `None`.
fn concat_messages(first: Option<&str>, second: Option<&str>) -> Option<String> {
    let first = first.filter(|m| !m.is_empty());
    let second = second.filter(|m| !m.is_empty());

    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a},{b}")),
        (Some(a), None) => Some(a.to_owned()),
        (None, Some(b)) => Some(b.to_owned()),
        (None, None) => None,
    }
}
