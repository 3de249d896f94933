//! Type/severity/recency filtering of normalized records.
//!
//! The output is always an order-preserving subsequence of the input. The
//! canonical filtered set is never re-sorted here; the table view sorts its
//! own copy.

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use disaster_map_disaster_models::{DisasterRecord, FilterCriteria, TypeFilter};

use crate::normalize::record_timestamp;

/// Start of the day `days` days before `now`, in `now`'s time zone.
///
/// A local midnight that falls in a DST gap is read as UTC midnight. An
/// out-of-range subtraction yields the earliest representable instant.
#[must_use]
pub fn cutoff_date<Tz: TimeZone>(now: &DateTime<Tz>, days: u32) -> DateTime<Utc> {
    let Some(date) = now.date_naive().checked_sub_days(Days::new(u64::from(days))) else {
        return DateTime::<Utc>::MIN_UTC;
    };
    let midnight = date.and_time(NaiveTime::MIN);

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Applies `criteria` to `records`, relative to `now`.
#[must_use]
pub fn filter_records<Tz: TimeZone>(
    records: &[DisasterRecord],
    criteria: &FilterCriteria,
    now: &DateTime<Tz>,
) -> Vec<DisasterRecord> {
    let cutoff = criteria
        .recency_active()
        .then(|| cutoff_date(now, criteria.max_age_days));

    if let Some(cutoff) = cutoff {
        log::debug!(
            "Recency cutoff for {} day(s): {cutoff}",
            criteria.max_age_days
        );
    }

    let filtered: Vec<DisasterRecord> = records
        .iter()
        .filter(|record| matches(record, criteria, cutoff))
        .cloned()
        .collect();

    log::debug!(
        "Filter {criteria:?} kept {}/{} records",
        filtered.len(),
        records.len()
    );

    filtered
}

/// Evaluates type, then severity, then recency, stopping at the first
/// failing predicate.
///
/// `cutoff` is `Some` iff the recency filter is active.
#[must_use]
pub fn matches(
    record: &DisasterRecord,
    criteria: &FilterCriteria,
    cutoff: Option<DateTime<Utc>>,
) -> bool {
    type_matches(record, criteria.type_filter)
        && severity_matches(record, criteria)
        && recency_matches(record, cutoff)
}

fn type_matches(record: &DisasterRecord, filter: TypeFilter) -> bool {
    match filter {
        TypeFilter::All => true,
        TypeFilter::Only(t) => record.disaster_type == t,
    }
}

/// Records without a valid severity fail any active floor.
fn severity_matches(record: &DisasterRecord, criteria: &FilterCriteria) -> bool {
    !criteria.severity_active()
        || record
            .severity
            .is_some_and(|s| s >= f64::from(criteria.min_severity))
}

fn recency_matches(record: &DisasterRecord, cutoff: Option<DateTime<Utc>>) -> bool {
    let Some(cutoff) = cutoff else {
        return true;
    };
    record_timestamp(record).is_some_and(|t| t >= cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use disaster_map_disaster_models::{DisasterType, RecordId};
    use serde_json::json;

    use crate::normalize::normalize_batch;

    fn now() -> DateTime<Utc> {
        "2024-06-15T12:00:00Z".parse().unwrap()
    }

    fn ago(hours: i64) -> String {
        (now() - Duration::hours(hours)).to_rfc3339()
    }

    fn ids(records: &[DisasterRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.0.as_str()).collect()
    }

    fn sample() -> Vec<DisasterRecord> {
        normalize_batch(&[
            json!({"id": 1, "type": "flood", "severity": 5, "timestamp": ago(2), "lat": 10, "lng": 20}),
            json!({"id": 2, "type": "flood", "severity": 2, "timestamp": ago(240), "lat": 5, "lng": 5}),
            json!({"id": 3, "type": "storm", "severity": "high", "lat": "bad", "lng": 20, "timestamp": "not-a-date"}),
            json!({"id": 4, "type": "earthquake", "severity": 3, "timestamp": ago(30), "lat": 1, "lng": 1}),
            json!({"id": 5, "type": "volcano", "severity": 4, "timestamp": ago(1), "lat": 2, "lng": 2}),
        ])
    }

    #[test]
    fn scenario_flood_severity_and_age() {
        let criteria = FilterCriteria {
            type_filter: TypeFilter::Only(DisasterType::Flood),
            min_severity: 3,
            max_age_days: 7,
        };
        let filtered = filter_records(&sample(), &criteria, &now());
        assert_eq!(ids(&filtered), ["1"]);
    }

    #[test]
    fn unfiltered_keeps_everything_including_bad_records() {
        let filtered = filter_records(&sample(), &FilterCriteria::unfiltered(), &now());
        assert_eq!(ids(&filtered), ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn unparseable_timestamp_excluded_only_when_recency_active() {
        let records = sample();
        let with_recency = FilterCriteria {
            max_age_days: 3650,
            ..FilterCriteria::unfiltered()
        };
        let filtered = filter_records(&records, &with_recency, &now());
        assert!(!ids(&filtered).contains(&"3"));

        let filtered = filter_records(&records, &FilterCriteria::unfiltered(), &now());
        assert!(ids(&filtered).contains(&"3"));
    }

    #[test]
    fn missing_severity_fails_active_floor_only() {
        let records = sample();
        let floor_two = FilterCriteria {
            min_severity: 2,
            ..FilterCriteria::unfiltered()
        };
        assert!(!ids(&filter_records(&records, &floor_two, &now())).contains(&"3"));

        let floor_one = FilterCriteria::unfiltered();
        assert!(ids(&filter_records(&records, &floor_one, &now())).contains(&"3"));
    }

    #[test]
    fn fractional_severity_compares_against_floor() {
        let records = normalize_batch(&[json!({"id": 7, "type": "flood", "severity": 2.5})]);
        let floor = |min_severity| FilterCriteria {
            min_severity,
            ..FilterCriteria::unfiltered()
        };
        assert_eq!(ids(&filter_records(&records, &floor(2), &now())), ["7"]);
        assert!(filter_records(&records, &floor(3), &now()).is_empty());
    }

    #[test]
    fn unknown_types_match_other_filter() {
        let criteria = FilterCriteria {
            type_filter: TypeFilter::Only(DisasterType::Other),
            ..FilterCriteria::unfiltered()
        };
        assert_eq!(ids(&filter_records(&sample(), &criteria, &now())), ["5"]);
    }

    #[test]
    fn output_is_ordered_subsequence_and_idempotent() {
        let records = sample();
        let criteria_set = [
            FilterCriteria::default(),
            FilterCriteria::unfiltered(),
            FilterCriteria {
                type_filter: TypeFilter::Only(DisasterType::Flood),
                min_severity: 1,
                max_age_days: 0,
            },
            FilterCriteria {
                type_filter: TypeFilter::All,
                min_severity: 4,
                max_age_days: 1,
            },
        ];

        for criteria in &criteria_set {
            let once = filter_records(&records, criteria, &now());
            let mut input = records.iter().map(|r| &r.id);
            for kept in &once {
                assert!(
                    input.any(|id| id == &kept.id),
                    "{criteria:?}: {} out of order or invented",
                    kept.id
                );
            }

            let twice = filter_records(&once, criteria, &now());
            assert_eq!(once, twice, "{criteria:?} not idempotent");
        }
    }

    #[test]
    fn short_circuit_matches_independent_predicates() {
        let records = sample();
        for min_severity in 1..=5 {
            for max_age_days in [0, 1, 7, 30] {
                for type_filter in [TypeFilter::All, TypeFilter::Only(DisasterType::Flood)] {
                    let criteria = FilterCriteria {
                        type_filter,
                        min_severity,
                        max_age_days,
                    };
                    let cutoff = criteria
                        .recency_active()
                        .then(|| cutoff_date(&now(), max_age_days));
                    for record in &records {
                        let independent = [
                            type_matches(record, type_filter),
                            severity_matches(record, &criteria),
                            recency_matches(record, cutoff),
                        ]
                        .iter()
                        .all(|m| *m);
                        assert_eq!(matches(record, &criteria, cutoff), independent);
                    }
                }
            }
        }
    }

    #[test]
    fn cutoff_is_start_of_day() {
        let cutoff = cutoff_date(&now(), 7);
        assert_eq!(cutoff.to_rfc3339(), "2024-06-08T00:00:00+00:00");

        let tz = FixedOffset::east_opt(5 * 3600).unwrap();
        let local_now = now().with_timezone(&tz);
        // 17:00 local on the 15th, so midnight of the 14th local is 19:00Z on the 13th.
        assert_eq!(
            cutoff_date(&local_now, 1).to_rfc3339(),
            "2024-06-13T19:00:00+00:00"
        );
    }

    #[test]
    fn boundary_timestamp_is_inclusive() {
        let records = normalize_batch(&[
            json!({"id": "edge", "timestamp": "2024-06-08T00:00:00Z"}),
            json!({"id": "before", "timestamp": "2024-06-07T23:59:59Z"}),
        ]);
        let criteria = FilterCriteria {
            max_age_days: 7,
            ..FilterCriteria::unfiltered()
        };
        let filtered = filter_records(&records, &criteria, &now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, RecordId::from("edge"));
    }
}
