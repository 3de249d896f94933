//! Normalization of raw `/api/disasters` entries.
//!
//! The backend is not trusted to send well-typed fields. Each entry is
//! coerced field by field; a bad field only strips the guarantee that
//! depends on it (a bad `lat` makes the record unmappable, a bad
//! `severity` makes it fail severity floors) and never drops the record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use disaster_map_disaster_models::{DisasterRecord, DisasterType, LatLng, RecordId, RecordIssue};
use serde_json::Value;

/// Title used when a record has none.
const UNTITLED: &str = "Untitled event";

/// Normalizes a whole fetch batch.
///
/// Entries that are not JSON objects are skipped with a warning; every
/// other entry yields exactly one record, in input order.
#[must_use]
pub fn normalize_batch(entries: &[Value]) -> Vec<DisasterRecord> {
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        match normalize_record(index, entry) {
            Ok((record, issues)) => {
                for issue in &issues {
                    log::debug!("Record {}: {issue}", record.id);
                }
                records.push(record);
            }
            Err(issue) => {
                log::warn!("Skipping entry {index}: {issue}");
            }
        }
    }

    records
}

/// Normalizes one raw entry.
///
/// `index` is the entry's position in the batch, used to synthesize an id
/// when the entry has none.
///
/// # Errors
///
/// Returns [`RecordIssue::NotAnObject`] if the entry is not a JSON object.
/// Field-level problems are returned alongside the record instead.
pub fn normalize_record(
    index: usize,
    entry: &Value,
) -> Result<(DisasterRecord, Vec<RecordIssue>), RecordIssue> {
    let fields = entry.as_object().ok_or(RecordIssue::NotAnObject)?;
    let mut issues = Vec::new();

    let id = fields
        .get("id")
        .and_then(text)
        .map_or_else(|| RecordId(format!("entry-{index}")), RecordId);

    let disaster_type = match fields.get("type").and_then(text) {
        Some(tag) => {
            let parsed = DisasterType::from_tag(&tag);
            if parsed == DisasterType::Other && !tag.trim().eq_ignore_ascii_case("other") {
                issues.push(RecordIssue::UnknownType(tag));
            }
            parsed
        }
        None => {
            issues.push(RecordIssue::UnknownType(String::new()));
            DisasterType::Other
        }
    };

    let severity = fields.get("severity").and_then(parse_severity);
    if severity.is_none() {
        issues.push(RecordIssue::InvalidSeverity);
    }

    let position = match (
        fields.get("lat").and_then(coerce_number),
        fields.get("lng").and_then(coerce_number),
    ) {
        (Some(lat), Some(lng)) => LatLng::new(lat, lng),
        _ => None,
    };
    if position.is_none() {
        issues.push(RecordIssue::InvalidCoordinates);
    }

    let record = DisasterRecord {
        id,
        disaster_type,
        severity,
        timestamp: fields.get("timestamp").and_then(Value::as_str).map(String::from),
        position,
        title: fields
            .get("title")
            .and_then(text)
            .unwrap_or_else(|| UNTITLED.to_string()),
        description: fields.get("description").and_then(text),
        location: fields.get("location").and_then(text),
        source: fields.get("source").and_then(text),
        status: fields.get("status").and_then(text),
    };

    Ok((record, issues))
}

/// Coerces a JSON value to a finite number.
///
/// Accepts numbers and numeric strings (surrounding whitespace ignored).
/// Everything else, including empty strings, `NaN` and infinities, yields
/// `None`.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Accepts JSON numbers in 1-5 as-is (`3`, `2.5`), but not strings.
#[must_use]
pub fn parse_severity(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .filter(|n| n.is_finite() && (1.0..=5.0).contains(n))
}

/// Parses an ISO 8601 timestamp.
///
/// Accepts RFC 3339 with offset, offsets without a colon, naive date-times
/// (taken as UTC), and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parses a record's timestamp, logging a warning on failure.
#[must_use]
pub fn record_timestamp(record: &DisasterRecord) -> Option<DateTime<Utc>> {
    let parsed = record.timestamp.as_deref().and_then(parse_timestamp);
    if parsed.is_none() {
        log::warn!(
            "Record {}: {} ({:?})",
            record.id,
            RecordIssue::InvalidTimestamp,
            record.timestamp
        );
    }
    parsed
}

/// Formats a record's timestamp for display, or `"Unknown time"`.
#[must_use]
pub fn display_time(record: &DisasterRecord) -> String {
    record
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .map_or_else(
            || "Unknown time".to_string(),
            |t| t.format("%Y-%m-%d %H:%M UTC").to_string(),
        )
}

/// Renders scalar JSON values as text; `null`, arrays and objects are
/// treated as absent.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
