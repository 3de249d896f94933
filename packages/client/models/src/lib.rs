#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Request and response types for the disaster map backend API.
//!
//! Reports and subscriptions are sent form-encoded, so each request type
//! knows how to flatten itself into `(name, value)` pairs. Basic client
//! side checks run before anything is sent; the backend still has the
//! final say through [`ApiAck`].

use chrono::{DateTime, SecondsFormat, Utc};
use disaster_map_disaster_models::{DisasterSeverity, DisasterType, RecordId};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Acknowledgement returned by `/api/report` and `/api/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    /// Whether the backend accepted the request.
    pub success: bool,
    /// Optional human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// A client-side check that failed before a request was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Form field that failed.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn invalid(field: &'static str, message: &str) -> ValidationError {
    ValidationError {
        field,
        message: message.to_string(),
    }
}

/// A user-submitted disaster report for `POST /api/report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSubmission {
    /// Headline.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Category.
    pub disaster_type: DisasterType,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Reporter's severity estimate.
    pub severity: Option<DisasterSeverity>,
    /// Place name.
    pub location: Option<String>,
}

impl ReportSubmission {
    /// Checks required fields and coordinate ranges.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(invalid("title", "title is required"));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid("latitude", "latitude must be between -90 and 90"));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(
                "longitude",
                "longitude must be between -180 and 180",
            ));
        }
        Ok(())
    }

    /// Flattens the report into form fields, stamping `submitted_at` as
    /// the `timestamp` field.
    #[must_use]
    pub fn form_fields(&self, submitted_at: DateTime<Utc>) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("title", self.title.trim().to_string()),
            ("disaster_type", self.disaster_type.to_string()),
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
        ];
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        if let Some(severity) = self.severity {
            fields.push(("severity", severity.value().to_string()));
        }
        if let Some(location) = &self.location {
            fields.push(("location", location.clone()));
        }
        fields.push((
            "timestamp",
            submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
        fields
    }
}

/// Delivery channel for alerts.
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
pub enum AlertMethod {
    /// Email to the subscriber's address.
    Email,
    /// SMS to the subscriber's phone.
    Sms,
    /// Browser notification.
    Web,
}

/// Alert subscription for `POST /api/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Record to follow.
    pub disaster_id: RecordId,
    /// Contact email.
    pub email: Option<String>,
    /// Contact phone for SMS.
    pub phone: Option<String>,
    /// Requested channels.
    pub alert_methods: Vec<AlertMethod>,
}

impl SubscriptionRequest {
    /// Checks that at least one channel is requested and that every
    /// requested channel has its contact detail.
    ///
    /// # Errors
    ///
    /// Returns the first failing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.disaster_id.0.trim().is_empty() {
            return Err(invalid("disaster_id", "a disaster must be selected"));
        }
        if self.alert_methods.is_empty() {
            return Err(invalid("alert_methods", "choose at least one alert method"));
        }
        let has = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        if self.alert_methods.contains(&AlertMethod::Email) && !has(&self.email) {
            return Err(invalid("email", "email alerts need an email address"));
        }
        if self.alert_methods.contains(&AlertMethod::Sms) && !has(&self.phone) {
            return Err(invalid("phone", "SMS alerts need a phone number"));
        }
        if !has(&self.email) && !has(&self.phone) {
            return Err(invalid("email", "an email address or phone number is required"));
        }
        Ok(())
    }

    /// Flattens the request into form fields. `alert_methods` repeats once
    /// per channel.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("disaster_id", self.disaster_id.0.clone()),
            ("email", self.email.clone().unwrap_or_default()),
            ("phone", self.phone.clone().unwrap_or_default()),
        ];
        fields.extend(
            self.alert_methods
                .iter()
                .map(|m| ("alert_methods", m.to_string())),
        );
        fields
    }
}
