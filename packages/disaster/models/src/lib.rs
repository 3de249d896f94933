#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Disaster category taxonomy, severity levels, and normalized record types.
//!
//! Every record delivered by `/api/disasters` is normalized into a
//! [`DisasterRecord`] before any filtering or rendering happens. Field
//! values that fail validation are kept as `None` rather than rejected so
//! that each view can decide which guarantees it needs.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for a disaster, from 1 (minimal) to 5 (critical).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DisasterSeverity {
    /// Level 1: Minor, localized event
    Minimal = 1,
    /// Level 2: Limited damage
    Low = 2,
    /// Level 3: Significant regional impact
    Moderate = 3,
    /// Level 4: Major damage, evacuations likely
    High = 4,
    /// Level 5: Catastrophic
    Critical = 5,
}

impl DisasterSeverity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Returns all variants of this enum, lowest first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Minimal,
            Self::Low,
            Self::Moderate,
            Self::High,
            Self::Critical,
        ]
    }
}

/// Error returned when attempting to create a [`DisasterSeverity`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Disaster categories known to the map.
///
/// Tags outside this set are folded into [`DisasterType::Other`] by
/// [`DisasterType::from_tag`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisasterType {
    /// Seismic events
    Earthquake,
    /// River, coastal, and flash floods
    Flood,
    /// Forest and bush fires
    Wildfire,
    /// Cyclones, hurricanes, severe storms
    Storm,
    /// Landslides and mudflows
    Landslide,
    /// Anything not covered above
    Other,
}

impl DisasterType {
    /// Parses a category tag, treating unknown or empty tags as
    /// [`DisasterType::Other`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        tag.trim().parse().unwrap_or(Self::Other)
    }

    /// Base marker color for this category as `#rrggbb`.
    #[must_use]
    pub const fn base_color(self) -> &'static str {
        match self {
            Self::Earthquake => "#d32f2f",
            Self::Flood => "#1976d2",
            Self::Wildfire => "#f57c00",
            Self::Storm => "#7b1fa2",
            Self::Landslide => "#795548",
            Self::Other => "#757575",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Earthquake,
            Self::Flood,
            Self::Wildfire,
            Self::Storm,
            Self::Landslide,
            Self::Other,
        ]
    }
}

/// A WGS84 position. Both components are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Builds a position, returning `None` if either component is NaN or
    /// infinite.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }
}

/// Opaque record identifier. Numeric ids are kept in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A disaster record after normalization.
///
/// `severity` and `position` are `None` when the raw value did not pass
/// validation. `timestamp` is kept as delivered and parsed only where a
/// view needs a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterRecord {
    /// Identifier, unique within one fetch batch.
    pub id: RecordId,
    /// Normalized category.
    pub disaster_type: DisasterType,
    /// Severity as delivered, if it was a number in 1-5. Fractional
    /// values are kept so severity floors compare against the raw value.
    pub severity: Option<f64>,
    /// Raw timestamp string (ISO 8601 expected).
    pub timestamp: Option<String>,
    /// Map position if both coordinates coerced to finite numbers.
    pub position: Option<LatLng>,
    /// Headline.
    pub title: String,
    /// Longer free-text description.
    pub description: Option<String>,
    /// Human-readable place name.
    pub location: Option<String>,
    /// Reporting source (agency, feed, or user).
    pub source: Option<String>,
    /// Lifecycle status.
    pub status: Option<String>,
}

impl DisasterRecord {
    /// The whole level a valid severity falls in (`2.5` is level 2).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn severity_level(&self) -> Option<DisasterSeverity> {
        self.severity
            .filter(|s| (1.0..=5.0).contains(s))
            .and_then(|s| DisasterSeverity::from_value(s.floor() as u8).ok())
    }

    /// Severity used for rendering. Missing or invalid severities render
    /// as level 1 but are never promoted for filtering.
    #[must_use]
    pub fn display_severity(&self) -> DisasterSeverity {
        self.severity_level().unwrap_or(DisasterSeverity::Minimal)
    }

    /// Whether this record can be placed on the map.
    #[must_use]
    pub const fn is_mappable(&self) -> bool {
        self.position.is_some()
    }

    /// Status text, defaulting to `"Active"`.
    #[must_use]
    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or("Active")
    }
}

/// Type constraint of a [`FilterCriteria`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeFilter {
    /// No type constraint.
    #[default]
    All,
    /// Only records of the given category.
    Only(DisasterType),
}

impl TypeFilter {
    /// Parses a control value: `"all"` (any case) or a category tag.
    ///
    /// Returns `None` for values that are neither.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        value.parse().ok().map(Self::Only)
    }
}

/// Default age window applied when no age control is present.
pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;

/// The active type/severity/recency constraints.
///
/// `Default` yields the fallback used when controls are absent: all
/// types, no severity floor, a 7-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Category constraint.
    pub type_filter: TypeFilter,
    /// Minimum severity; values `<= 1` disable the floor.
    pub min_severity: u8,
    /// Age window in days; `0` disables the recency filter.
    pub max_age_days: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            type_filter: TypeFilter::All,
            min_severity: 1,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
        }
    }
}

impl FilterCriteria {
    /// Criteria that keep every record.
    #[must_use]
    pub const fn unfiltered() -> Self {
        Self {
            type_filter: TypeFilter::All,
            min_severity: 1,
            max_age_days: 0,
        }
    }

    /// Whether the severity floor excludes anything.
    #[must_use]
    pub const fn severity_active(&self) -> bool {
        self.min_severity > 1
    }

    /// Whether the recency window is active.
    #[must_use]
    pub const fn recency_active(&self) -> bool {
        self.max_age_days > 0
    }
}

/// A per-record problem found during normalization or projection.
///
/// These are logged and never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    /// The array entry was not a JSON object.
    NotAnObject,
    /// `lat`/`lng` did not coerce to finite numbers.
    InvalidCoordinates,
    /// `severity` was missing or not a number in 1-5.
    InvalidSeverity,
    /// `timestamp` was missing or not ISO 8601.
    InvalidTimestamp,
    /// `type` was missing or outside the known set.
    UnknownType(String),
}

impl std::fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("entry is not an object"),
            Self::InvalidCoordinates => f.write_str("coordinates are not finite numbers"),
            Self::InvalidSeverity => f.write_str("severity is not a number in 1-5"),
            Self::InvalidTimestamp => f.write_str("timestamp is not ISO 8601"),
            Self::UnknownType(tag) => write!(f, "unknown type {tag:?}, treating as other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_value_roundtrip() {
        for v in 1..=5u8 {
            let severity = DisasterSeverity::from_value(v).unwrap();
            assert_eq!(severity.value(), v);
        }
        assert!(DisasterSeverity::from_value(0).is_err());
        assert!(DisasterSeverity::from_value(6).is_err());
    }

    #[test]
    fn unknown_tags_fold_into_other() {
        assert_eq!(DisasterType::from_tag("volcano"), DisasterType::Other);
        assert_eq!(DisasterType::from_tag(""), DisasterType::Other);
        assert_eq!(DisasterType::from_tag("Flood"), DisasterType::Flood);
        assert_eq!(DisasterType::from_tag(" wildfire "), DisasterType::Wildfire);
    }

    #[test]
    fn type_tags_match_serde_names() {
        for t in DisasterType::all() {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json.as_str(), Some(t.as_ref()));
        }
    }

    #[test]
    fn type_filter_parses_all_and_categories() {
        assert_eq!(TypeFilter::parse("ALL"), Some(TypeFilter::All));
        assert_eq!(
            TypeFilter::parse("storm"),
            Some(TypeFilter::Only(DisasterType::Storm))
        );
        assert_eq!(TypeFilter::parse("tsunami"), None);
    }

    #[test]
    fn lat_lng_rejects_non_finite() {
        assert!(LatLng::new(f64::NAN, 1.0).is_none());
        assert!(LatLng::new(1.0, f64::INFINITY).is_none());
        assert!(LatLng::new(10.0, 20.0).is_some());
    }

    #[test]
    fn default_criteria_is_seven_day_window() {
        let criteria = FilterCriteria::default();
        assert_eq!(criteria.type_filter, TypeFilter::All);
        assert!(!criteria.severity_active());
        assert!(criteria.recency_active());
        assert!(!FilterCriteria::unfiltered().recency_active());
    }
}
