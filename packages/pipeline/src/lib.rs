#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure stages of the disaster map refresh pipeline.
//!
//! Raw JSON records flow through these stages in order:
//!
//! 1. [`normalize`]: coerce raw entries into [`DisasterRecord`]s,
//!    defaulting the category and flagging bad severities/coordinates.
//! 2. [`filter`]: apply the active [`FilterCriteria`], preserving order.
//! 3. [`markers`]: project mappable records into marker descriptors,
//!    colored by [`color::severity_color`].
//!
//! [`table`] and [`stats`] derive the two non-map views from the same
//! filtered set. None of these stages perform I/O; per-record problems are
//! logged and the record is dropped from the affected view only.
//!
//! [`DisasterRecord`]: disaster_map_disaster_models::DisasterRecord
//! [`FilterCriteria`]: disaster_map_disaster_models::FilterCriteria

pub mod color;
pub mod filter;
pub mod html;
pub mod markers;
pub mod normalize;
pub mod stats;
pub mod table;
