//! Projection of filtered records into map marker descriptors.
//!
//! Descriptors carry everything the map collaborator needs to draw a
//! marker: position, icon appearance, popup HTML and tooltip. Appearance is
//! a pure function of `(type, severity)` so re-projecting the same record
//! always yields an identical descriptor.

use disaster_map_disaster_models::{
    DisasterRecord, DisasterSeverity, DisasterType, LatLng, RecordId, RecordIssue,
};
use serde::Serialize;

use crate::color::severity_color;
use crate::html::{escape_html, escape_or};
use crate::normalize::display_time;

/// Dot diameter for a severity 1 marker, in pixels.
const BASE_DIAMETER_PX: u32 = 10;

/// Extra diameter per severity level.
const DIAMETER_STEP_PX: u32 = 2;

/// White ring drawn around the dot.
const BORDER_PX: u32 = 2;

/// Icon appearance of a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerIcon {
    /// CSS classes applied to the icon container.
    pub class_name: String,
    /// Fill color as `#rrggbb`.
    pub color: String,
    /// Inner HTML of the icon.
    pub html: String,
    /// Icon size `[width, height]` in pixels.
    pub size: [u32; 2],
    /// Anchor point `[x, y]` relative to the icon's top-left corner.
    pub anchor: [u32; 2],
}

/// A renderable projection of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDescriptor {
    /// Id of the record this marker was projected from.
    pub record_id: RecordId,
    /// Category, for clustering by type.
    pub disaster_type: DisasterType,
    /// Rendered severity (defaults to level 1).
    pub severity: DisasterSeverity,
    /// Marker position.
    pub position: LatLng,
    /// Icon appearance.
    pub icon: MarkerIcon,
    /// Popup body, with all record text escaped.
    pub popup_html: String,
    /// Plain-text hover tooltip. Set as an attribute, never as markup.
    pub title: String,
}

/// Builds the icon for a `(type, severity)` pair.
#[must_use]
pub fn marker_icon(disaster_type: DisasterType, severity: DisasterSeverity) -> MarkerIcon {
    let color = severity_color(disaster_type.base_color(), f64::from(severity.value()));
    let diameter = BASE_DIAMETER_PX + DIAMETER_STEP_PX * u32::from(severity.value());
    let outer = diameter + 2 * BORDER_PX;

    MarkerIcon {
        class_name: format!(
            "disaster-marker {disaster_type}-marker severity-{}",
            severity.value()
        ),
        html: format!(
            "<div style=\"background-color: {color}; width: {diameter}px; \
             height: {diameter}px; border-radius: 50%; border: {BORDER_PX}px solid white;\"></div>"
        ),
        color,
        size: [outer, outer],
        anchor: [outer / 2, outer / 2],
    }
}

/// Projects one record.
///
/// # Errors
///
/// Returns [`RecordIssue::InvalidCoordinates`] if the record has no valid
/// position.
pub fn project_marker(record: &DisasterRecord) -> Result<MarkerDescriptor, RecordIssue> {
    let position = record.position.ok_or(RecordIssue::InvalidCoordinates)?;
    let severity = record.display_severity();

    Ok(MarkerDescriptor {
        record_id: record.id.clone(),
        disaster_type: record.disaster_type,
        severity,
        position,
        icon: marker_icon(record.disaster_type, severity),
        popup_html: popup_html(record),
        title: record.title.clone(),
    })
}

/// Projects every mappable record, skipping (and logging) the rest.
#[must_use]
pub fn project_markers(records: &[DisasterRecord]) -> Vec<MarkerDescriptor> {
    let markers: Vec<MarkerDescriptor> = records
        .iter()
        .filter_map(|record| match project_marker(record) {
            Ok(marker) => Some(marker),
            Err(issue) => {
                log::warn!("Not mapping record {}: {issue}", record.id);
                None
            }
        })
        .collect();

    if markers.len() < records.len() {
        log::info!(
            "Projected {} marker(s), {} record(s) not mappable",
            markers.len(),
            records.len() - markers.len()
        );
    }

    markers
}

/// Popup body shown when a marker is clicked.
#[must_use]
pub fn popup_html(record: &DisasterRecord) -> String {
    let mut html = String::from("<div class=\"disaster-popup\">");
    html.push_str(&format!("<h3>{}</h3>", escape_html(&record.title)));
    html.push_str(&format!(
        "<p><strong>Type:</strong> {}</p>",
        record.disaster_type
    ));
    html.push_str(&format!(
        "<p><strong>Severity:</strong> {} out of 5</p>",
        record.display_severity().value()
    ));
    html.push_str(&format!(
        "<p><strong>Time:</strong> {}</p>",
        display_time(record)
    ));
    if let Some(location) = &record.location {
        html.push_str(&format!(
            "<p><strong>Location:</strong> {}</p>",
            escape_html(location)
        ));
    }
    if let Some(description) = &record.description {
        html.push_str(&format!("<p>{}</p>", escape_html(description)));
    }
    html.push_str(&format!(
        "<p><strong>Source:</strong> {}</p>",
        escape_or(record.source.as_deref(), "Unknown")
    ));
    html.push_str("</div>");
    html
}

/// Full detail panel for a record, including coordinates and status.
#[must_use]
pub fn details_html(record: &DisasterRecord) -> String {
    let coordinates = record.position.map_or_else(
        || "Unavailable".to_string(),
        |p| format!("{:.5}, {:.5}", p.lat, p.lng),
    );

    format!(
        "<div class=\"disaster-details\">\
         <h2>{title}</h2>\
         <p><strong>Type:</strong> {kind}</p>\
         <p><strong>Severity:</strong> {severity} out of 5</p>\
         <p><strong>Time:</strong> {time}</p>\
         <p><strong>Location:</strong> {location}</p>\
         <p><strong>Coordinates:</strong> {coordinates}</p>\
         <p><strong>Description:</strong> {description}</p>\
         <p><strong>Source:</strong> {source}</p>\
         <p><strong>Status:</strong> {status}</p>\
         </div>",
        title = escape_html(&record.title),
        kind = record.disaster_type,
        severity = record.display_severity().value(),
        time = display_time(record),
        location = escape_or(record.location.as_deref(), "Unknown"),
        description = escape_or(record.description.as_deref(), ""),
        source = escape_or(record.source.as_deref(), "Unknown"),
        status = escape_html(record.status_or_default()),
    )
}
