#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Keeps the map, table, and statistics surfaces in step with the backend.
//!
//! A [`ViewSynchronizer`] owns the record caches and a registry of optional
//! presentation surfaces. Each refresh reads filter criteria from the
//! controls, fetches the full record list, runs it through the pipeline,
//! and fans the results out to whichever surfaces are present. The
//! [`refresh`] module drives it on a fixed period; user actions call the
//! same entry point.

pub mod config;
pub mod controls;
pub mod map;
pub mod notice;
pub mod refresh;
pub mod surfaces;
pub mod synchronizer;

#[cfg(test)]
mod testing;

pub use config::{MapConfig, MapTheme, SyncConfig};
pub use notice::{Notice, NoticeLevel};
pub use surfaces::SurfaceRegistry;
pub use synchronizer::{RefreshSummary, RefreshTrigger, ViewSynchronizer};

use disaster_map_client::ClientError;

/// Errors from a synchronizer cycle.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Fetching the record list failed. Caches were reset to empty.
    #[error("Failed to fetch disasters: {0}")]
    Fetch(#[from] ClientError),

    /// The map surface failed to initialize.
    #[error("Map unavailable: {message}")]
    MapUnavailable {
        /// Failure reported by the map surface.
        message: String,
    },

    /// The map surface is still initializing.
    #[error("Map is not ready")]
    MapNotReady,

    /// No record with the requested id is cached.
    #[error("No disaster with id {id}")]
    UnknownRecord {
        /// Requested id.
        id: String,
    },

    /// The record exists but has no usable coordinates.
    #[error("Disaster {id} has no valid position")]
    NotMappable {
        /// Requested id.
        id: String,
    },
}
