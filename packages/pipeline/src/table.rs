//! Tabular view projection.

use std::cmp::Reverse;

use disaster_map_disaster_models::{DisasterRecord, RecordId};
use serde::Serialize;

use crate::html::{escape_html, escape_or};
use crate::normalize::{display_time, parse_timestamp};

/// Placeholder shown when no record matches the filters.
pub const EMPTY_TABLE_MESSAGE: &str = "No disasters match your current filters";

/// Number of columns in the rendered table.
pub const COLUMN_COUNT: usize = 6;

/// One table row. All text cells are already HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    /// Record id (unescaped, for lookups).
    pub id: RecordId,
    /// Row CSS classes: the type tag and `severity-<n>`.
    pub class_name: String,
    /// Escaped title.
    pub title: String,
    /// Type tag.
    pub disaster_type: String,
    /// Display severity (1-5).
    pub severity: u8,
    /// Formatted time, or `"Unknown time"`.
    pub time: String,
    /// Escaped location, or `"Unknown"`.
    pub location: String,
}

impl TableRow {
    /// Renders the row as a `<tr>` with detail and alert buttons.
    #[must_use]
    pub fn to_html(&self) -> String {
        let id = escape_html(&self.id.0);
        format!(
            "<tr class=\"{class}\">\
             <td>{title}</td><td>{kind}</td><td>{severity}</td><td>{time}</td><td>{location}</td>\
             <td><button class=\"btn btn-info view-details\" data-id=\"{id}\">Details</button>\
             <button class=\"btn btn-warning subscribe\" data-id=\"{id}\">Alert Me</button></td>\
             </tr>",
            class = self.class_name,
            title = self.title,
            kind = self.disaster_type,
            severity = self.severity,
            time = self.time,
            location = self.location,
        )
    }
}

/// Builds rows for `records`, most recent first.
///
/// Records with unparseable timestamps sort last; ties keep their filtered
/// order. The input slice is not reordered.
#[must_use]
pub fn table_rows(records: &[DisasterRecord]) -> Vec<TableRow> {
    let mut keyed: Vec<_> = records
        .iter()
        .map(|r| (r.timestamp.as_deref().and_then(parse_timestamp), r))
        .collect();
    // `None < Some(_)`, so reversing puts the newest first and unparseable last.
    keyed.sort_by_key(|(t, _)| Reverse(*t));

    keyed.into_iter().map(|(_, r)| table_row(r)).collect()
}

/// Renders rows as `<tr>` markup, or the placeholder row when empty.
#[must_use]
pub fn table_html(rows: &[TableRow]) -> String {
    if rows.is_empty() {
        return format!("<tr><td colspan=\"{COLUMN_COUNT}\">{EMPTY_TABLE_MESSAGE}</td></tr>");
    }
    rows.iter().map(TableRow::to_html).collect()
}

fn table_row(record: &DisasterRecord) -> TableRow {
    let severity = record.display_severity().value();
    TableRow {
        id: record.id.clone(),
        class_name: format!("{} severity-{severity}", record.disaster_type),
        title: escape_html(&record.title),
        disaster_type: record.disaster_type.to_string(),
        severity,
        time: display_time(record),
        location: escape_or(record.location.as_deref(), "Unknown"),
    }
}
