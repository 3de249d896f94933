//! Presentation surfaces the synchronizer pushes to.
//!
//! Every surface is optional. The [`SurfaceRegistry`] is filled once at
//! startup and the synchronizer skips whatever is missing, so a page (or
//! console) without a table still gets map updates and vice versa.

use std::sync::Arc;

use async_trait::async_trait;
use disaster_map_disaster_models::LatLng;
use disaster_map_pipeline::markers::MarkerDescriptor;
use disaster_map_pipeline::stats::SummaryStatistics;
use disaster_map_pipeline::table::TableRow;

use crate::config::{MapConfig, TileSource};
use crate::notice::Notice;

/// Map initialization failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MapInitError {
    /// What went wrong.
    pub message: String,
}

/// Map rendering collaborator.
#[async_trait]
pub trait MapSurface: Send + Sync {
    /// Creates the map with the configured view, zoom limits, and pan
    /// bounds.
    ///
    /// # Errors
    ///
    /// * If the map cannot be created (missing container, renderer failure)
    async fn initialize(&self, config: &MapConfig) -> Result<(), MapInitError>;

    /// Removes every marker.
    fn clear_markers(&self);

    /// Adds markers to the cluster layer.
    fn add_markers(&self, markers: &[MarkerDescriptor]);

    /// Replaces the base tile layer.
    fn set_tile_source(&self, tiles: &TileSource);

    /// Recomputes layout after the container changed size.
    fn invalidate_size(&self);

    /// Centers the view.
    fn set_view(&self, center: LatLng, zoom: u8);
}

/// Table rows.
pub trait TableSurface: Send + Sync {
    /// Replaces all rows. An empty slice means "show the placeholder".
    fn render_rows(&self, rows: &[TableRow]);
}

/// Summary statistics panel.
pub trait StatsSurface: Send + Sync {
    /// Replaces the displayed statistics.
    fn render_stats(&self, stats: &SummaryStatistics);
}

/// Filter inputs.
///
/// Each getter returns `None` when that control does not exist, and the raw
/// control value otherwise, even if it is not parseable.
pub trait FilterControls: Send + Sync {
    /// Value of the type selector.
    fn type_value(&self) -> Option<String>;

    /// Value of the minimum severity selector.
    fn severity_value(&self) -> Option<String>;

    /// Value of the age window selector, in days.
    fn age_value(&self) -> Option<String>;

    /// Restores every control to its default.
    fn reset(&self);
}

/// Busy indicator shown while a fetch is in flight.
pub trait LoadingIndicator: Send + Sync {
    /// Shows or hides the indicator.
    fn set_loading(&self, loading: bool);
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    /// Shows a notice.
    fn notify(&self, notice: &Notice);

    /// Removes any error notice that is still displayed.
    fn clear(&self);
}

/// The surfaces present in this front end.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    map: Option<Arc<dyn MapSurface>>,
    table: Option<Arc<dyn TableSurface>>,
    stats: Option<Arc<dyn StatsSurface>>,
    controls: Option<Arc<dyn FilterControls>>,
    loading: Option<Arc<dyn LoadingIndicator>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl SurfaceRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the map.
    #[must_use]
    pub fn with_map(mut self, map: Arc<dyn MapSurface>) -> Self {
        self.map = Some(map);
        self
    }

    /// Registers the table.
    #[must_use]
    pub fn with_table(mut self, table: Arc<dyn TableSurface>) -> Self {
        self.table = Some(table);
        self
    }

    /// Registers the statistics panel.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<dyn StatsSurface>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Registers the filter controls.
    #[must_use]
    pub fn with_controls(mut self, controls: Arc<dyn FilterControls>) -> Self {
        self.controls = Some(controls);
        self
    }

    /// Registers the loading indicator.
    #[must_use]
    pub fn with_loading(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Registers the notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn map(&self) -> Option<&dyn MapSurface> {
        self.map.as_deref()
    }

    #[must_use]
    pub fn table(&self) -> Option<&dyn TableSurface> {
        self.table.as_deref()
    }

    #[must_use]
    pub fn stats(&self) -> Option<&dyn StatsSurface> {
        self.stats.as_deref()
    }

    #[must_use]
    pub fn controls(&self) -> Option<&dyn FilterControls> {
        self.controls.as_deref()
    }

    #[must_use]
    pub fn loading(&self) -> Option<&dyn LoadingIndicator> {
        self.loading.as_deref()
    }

    #[must_use]
    pub fn notifier(&self) -> Option<&dyn Notifier> {
        self.notifier.as_deref()
    }

    /// Names of the registered surfaces, for startup logging.
    #[must_use]
    pub fn present(&self) -> Vec<&'static str> {
        [
            ("map", self.map.is_some()),
            ("table", self.table.is_some()),
            ("stats", self.stats.is_some()),
            ("controls", self.controls.is_some()),
            ("loading", self.loading.is_some()),
            ("notifier", self.notifier.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

impl std::fmt::Debug for SurfaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceRegistry")
            .field("present", &self.present())
            .finish()
    }
}
