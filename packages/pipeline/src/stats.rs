//! Summary statistics over the filtered record set.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use disaster_map_disaster_models::{DisasterRecord, DisasterSeverity, DisasterType};
use serde::Serialize;

use crate::normalize::parse_timestamp;

/// Counts shown by the statistics surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    /// Records in the filtered set.
    pub total: usize,
    /// Records with a valid position.
    pub mappable: usize,
    /// Count per category. Every category is present, possibly with 0.
    pub by_type: BTreeMap<DisasterType, usize>,
    /// Count per validated severity. Every level is present.
    pub by_severity: BTreeMap<DisasterSeverity, usize>,
    /// Records without a valid severity.
    pub unrated: usize,
    /// Latest parseable timestamp in the set.
    pub most_recent: Option<DateTime<Utc>>,
}

/// Computes summary statistics for `records`.
#[must_use]
pub fn summarize(records: &[DisasterRecord]) -> SummaryStatistics {
    let mut stats = SummaryStatistics {
        total: records.len(),
        by_type: DisasterType::all().iter().map(|t| (*t, 0)).collect(),
        by_severity: DisasterSeverity::all().iter().map(|s| (*s, 0)).collect(),
        ..SummaryStatistics::default()
    };

    for record in records {
        if record.is_mappable() {
            stats.mappable += 1;
        }
        *stats.by_type.entry(record.disaster_type).or_default() += 1;
        match record.severity_level() {
            Some(severity) => *stats.by_severity.entry(severity).or_default() += 1,
            None => stats.unrated += 1,
        }
        if let Some(t) = record.timestamp.as_deref().and_then(parse_timestamp) {
            stats.most_recent = Some(stats.most_recent.map_or(t, |m| m.max(t)));
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::normalize::normalize_batch;

    #[test]
    fn counts_types_severities_and_mappable() {
        let records = normalize_batch(&[
            json!({"type": "flood", "severity": 5, "lat": 1, "lng": 1, "timestamp": "2024-06-01T00:00:00Z"}),
            json!({"type": "flood", "severity": 2, "lat": 1, "lng": 1, "timestamp": "2024-06-03T00:00:00Z"}),
            json!({"type": "storm", "severity": "high", "lat": "bad", "lng": 1, "timestamp": "nope"}),
        ]);
        let stats = summarize(&records);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.mappable, 2);
        assert_eq!(stats.by_type[&DisasterType::Flood], 2);
        assert_eq!(stats.by_type[&DisasterType::Storm], 1);
        assert_eq!(stats.by_type[&DisasterType::Earthquake], 0);
        assert_eq!(stats.by_severity[&DisasterSeverity::Critical], 1);
        assert_eq!(stats.by_severity[&DisasterSeverity::Low], 1);
        assert_eq!(stats.unrated, 1);
        assert_eq!(
            stats.most_recent.unwrap().to_rfc3339(),
            "2024-06-03T00:00:00+00:00"
        );
    }

    #[test]
    fn empty_set_has_zeroed_buckets() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.by_type.len(), DisasterType::all().len());
        assert!(stats.by_type.values().all(|c| *c == 0));
        assert!(stats.most_recent.is_none());
    }
}
