//! The view synchronizer.
//!
//! One refresh cycle: read criteria, fetch, normalize, filter, project, and
//! push to each present surface. Caches are replaced wholesale under a
//! short-lived lock that is never held across an `.await`. Surface pushes
//! happen under the same lock so concurrent cycles apply whole, in
//! completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use disaster_map_client::DisasterSource;
use disaster_map_disaster_models::{DisasterRecord, LatLng, RecordId};
use disaster_map_pipeline::filter::filter_records;
use disaster_map_pipeline::markers::{details_html, project_markers};
use disaster_map_pipeline::normalize::normalize_batch;
use disaster_map_pipeline::stats::summarize;
use disaster_map_pipeline::table::table_rows;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::SyncError;
use crate::config::{MapConfig, MapTheme, SyncConfig};
use crate::controls::read_criteria;
use crate::map::{InitOutcome, MapLifecycle, MapState};
use crate::notice::Notice;
use crate::surfaces::SurfaceRegistry;

/// What caused a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshTrigger {
    /// The background timer.
    Periodic,
    /// The user applied the filters.
    Apply,
    /// The user reset the filters.
    Reset,
    /// A filter control changed.
    FilterChange,
}

/// Counts from a refresh that reached the surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    /// Sequence number of the cycle.
    pub cycle: u64,
    /// Records in the fetched batch.
    pub fetched: usize,
    /// Records that passed the filters.
    pub filtered: usize,
    /// Markers pushed to the map.
    pub mapped: usize,
}

#[derive(Debug, Default)]
struct SyncState {
    records: Vec<DisasterRecord>,
    filtered: Vec<DisasterRecord>,
    theme: MapTheme,
}

/// Owns the record caches and drives the surfaces.
pub struct ViewSynchronizer {
    source: Arc<dyn DisasterSource>,
    surfaces: SurfaceRegistry,
    map_config: MapConfig,
    config: SyncConfig,
    map: MapLifecycle,
    state: Mutex<SyncState>,
    cycles: AtomicU64,
}

impl std::fmt::Debug for ViewSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSynchronizer")
            .field("surfaces", &self.surfaces)
            .field("config", &self.config)
            .field("map_state", &self.map.state())
            .finish_non_exhaustive()
    }
}

impl ViewSynchronizer {
    #[must_use]
    pub fn new(
        source: Arc<dyn DisasterSource>,
        surfaces: SurfaceRegistry,
        map_config: MapConfig,
        config: SyncConfig,
    ) -> Self {
        log::debug!("Surfaces present: {:?}", surfaces.present());
        Self {
            source,
            surfaces,
            map_config,
            config,
            map: MapLifecycle::default(),
            state: Mutex::new(SyncState::default()),
            cycles: AtomicU64::new(0),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[must_use]
    pub const fn map_config(&self) -> &MapConfig {
        &self.map_config
    }

    #[must_use]
    pub const fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    #[must_use]
    pub fn map_state(&self) -> MapState {
        self.map.state()
    }

    /// Snapshot of the last fetched batch.
    #[must_use]
    pub fn records(&self) -> Vec<DisasterRecord> {
        self.lock_state().records.clone()
    }

    /// Snapshot of the records currently displayed.
    #[must_use]
    pub fn filtered_records(&self) -> Vec<DisasterRecord> {
        self.lock_state().filtered.clone()
    }

    #[must_use]
    pub fn theme(&self) -> MapTheme {
        self.lock_state().theme
    }

    fn notify(&self, notice: &Notice) {
        if let Some(notifier) = self.surfaces.notifier() {
            notifier.notify(notice);
        } else {
            log::warn!("No notifier registered, dropping notice: {notice}");
        }
    }

    fn set_loading(&self, loading: bool) {
        if let Some(indicator) = self.surfaces.loading() {
            indicator.set_loading(loading);
        }
    }

    /// Makes one attempt to bring the map up, installing the tiles for the
    /// current theme. Does nothing when there is no map surface, the map
    /// is ready, or an attempt is already in flight.
    ///
    /// The first failure after a non-failed state shows a blocking notice;
    /// repeated failures are only logged.
    ///
    /// # Errors
    ///
    /// * [`SyncError::MapUnavailable`] if this attempt failed
    pub async fn initialize_map(&self) -> Result<(), SyncError> {
        let Some(surface) = self.surfaces.map() else {
            return Ok(());
        };
        let tiles = self.map_config.tile_source(self.theme()).clone();

        match self.map.initialize(surface, &self.map_config, &tiles).await {
            InitOutcome::AlreadyReady | InitOutcome::InProgress => Ok(()),
            InitOutcome::Initialized => {
                let state = self.lock_state();
                if !state.filtered.is_empty() {
                    let markers = project_markers(&state.filtered);
                    log::debug!("Installing {} cached marker(s)", markers.len());
                    surface.clear_markers();
                    surface.add_markers(&markers);
                }
                drop(state);
                Ok(())
            }
            InitOutcome::Failed {
                error,
                first_failure,
            } => {
                if first_failure {
                    self.notify(&Notice::map_unavailable());
                }
                Err(SyncError::MapUnavailable {
                    message: error.message,
                })
            }
        }
    }

    /// Waits for a map that is still coming up: once for an untouched
    /// map, and for as long as an attempt is in flight.
    async fn wait_for_map(&self, cycle: u64) {
        if self.surfaces.map().is_none() {
            return;
        }
        let mut waited = false;
        loop {
            let state = self.map.state();
            let pending = state == MapState::Initializing
                || (state == MapState::Uninitialized && !waited);
            if !pending {
                return;
            }
            log::debug!(
                "Refresh #{cycle}: map not ready, retrying in {:?}",
                self.config.map_retry_delay
            );
            tokio::time::sleep(self.config.map_retry_delay).await;
            waited = true;
        }
    }

    /// Runs one refresh cycle.
    ///
    /// While a map initialization is in flight the cycle is re-queued
    /// every retry delay until the attempt settles. A map that was never
    /// started gets one retry delay. A map that is not ready after that is
    /// skipped while the other surfaces are still updated; a later
    /// successful [`Self::initialize_map`] installs the cached markers.
    ///
    /// # Errors
    ///
    /// * [`SyncError::Fetch`] if the record list could not be fetched. The
    ///   caches are reset to empty, one notice is shown, and no surface is
    ///   touched.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> Result<RefreshSummary, SyncError> {
        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!("Refresh #{cycle} ({trigger})");

        self.wait_for_map(cycle).await;

        let criteria = read_criteria(self.surfaces.controls(), self.config.default_max_age_days);

        self.set_loading(true);
        let fetched = self.source.fetch_disasters().await;
        self.set_loading(false);

        let entries = match fetched {
            Ok(entries) => entries,
            Err(error) => {
                log::error!("Refresh #{cycle} failed: {error}");
                {
                    let mut state = self.lock_state();
                    state.records.clear();
                    state.filtered.clear();
                }
                self.notify(&Notice::fetch_failed(&error));
                return Err(SyncError::Fetch(error));
            }
        };

        let records = normalize_batch(&entries);
        let filtered = filter_records(&records, &criteria, &Local::now());
        let markers = self
            .surfaces
            .map()
            .map(|_| project_markers(&filtered))
            .unwrap_or_default();
        let rows = self.surfaces.table().map(|_| table_rows(&filtered));
        let stats = self.surfaces.stats().map(|_| summarize(&filtered));

        let mut summary = RefreshSummary {
            cycle,
            fetched: records.len(),
            filtered: filtered.len(),
            mapped: 0,
        };

        {
            let mut state = self.lock_state();
            state.records = records;
            state.filtered = filtered;

            if let Some(map) = self.surfaces.map() {
                if self.map.state() == MapState::Ready {
                    map.clear_markers();
                    map.add_markers(&markers);
                    summary.mapped = markers.len();
                } else {
                    log::debug!("Skipping map update: map is {}", self.map.state());
                }
            }
            if let (Some(table), Some(rows)) = (self.surfaces.table(), rows.as_deref()) {
                table.render_rows(rows);
            }
            if let (Some(panel), Some(stats)) = (self.surfaces.stats(), stats.as_ref()) {
                panel.render_stats(stats);
            }
            drop(state);
        }

        if let Some(notifier) = self.surfaces.notifier() {
            notifier.clear();
        }

        log::info!(
            "Refresh #{cycle} applied: {} fetched, {} shown, {} mapped",
            summary.fetched,
            summary.filtered,
            summary.mapped
        );
        Ok(summary)
    }

    /// Refresh for the "apply filters" action.
    ///
    /// # Errors
    ///
    /// * See [`Self::refresh`]
    pub async fn apply(&self) -> Result<RefreshSummary, SyncError> {
        self.refresh(RefreshTrigger::Apply).await
    }

    /// Restores the filter controls to their defaults and refreshes.
    ///
    /// # Errors
    ///
    /// * See [`Self::refresh`]
    pub async fn reset(&self) -> Result<RefreshSummary, SyncError> {
        if let Some(controls) = self.surfaces.controls() {
            controls.reset();
        }
        self.refresh(RefreshTrigger::Reset).await
    }

    /// Refresh for a changed filter control.
    ///
    /// # Errors
    ///
    /// * See [`Self::refresh`]
    pub async fn filter_changed(&self) -> Result<RefreshSummary, SyncError> {
        self.refresh(RefreshTrigger::FilterChange).await
    }

    /// Runs a refresh as an independent task.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        trigger: RefreshTrigger,
    ) -> tokio::task::JoinHandle<Result<RefreshSummary, SyncError>> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.refresh(trigger).await })
    }

    /// Switches the base tiles. The theme is remembered and applied when
    /// the map becomes ready if it is not ready yet.
    pub fn set_theme(&self, theme: MapTheme) {
        self.lock_state().theme = theme;
        log::debug!("Theme set to {theme}");

        if let Some(map) = self.surfaces.map()
            && self.map.state() == MapState::Ready
        {
            map.set_tile_source(self.map_config.tile_source(theme));
        }
    }

    /// Asks the map to recompute its layout.
    pub fn invalidate_map_size(&self) {
        if let Some(map) = self.surfaces.map()
            && self.map.state() == MapState::Ready
        {
            map.invalidate_size();
        }
    }

    fn displayed(&self, id: &RecordId) -> Result<DisasterRecord, SyncError> {
        self.lock_state()
            .filtered
            .iter()
            .find(|r| r.id == *id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownRecord { id: id.to_string() })
    }

    /// Detail panel HTML for a displayed record.
    ///
    /// # Errors
    ///
    /// * [`SyncError::UnknownRecord`] if the record is not displayed
    pub fn record_details(&self, id: &RecordId) -> Result<String, SyncError> {
        self.displayed(id).map(|record| details_html(&record))
    }

    /// Centers the map on a displayed record at the focus zoom.
    ///
    /// # Errors
    ///
    /// * [`SyncError::UnknownRecord`] if the record is not displayed
    /// * [`SyncError::NotMappable`] if it has no valid position
    /// * [`SyncError::MapNotReady`] if there is no ready map
    pub fn focus_record(&self, id: &RecordId) -> Result<LatLng, SyncError> {
        let record = self.displayed(id)?;
        let position = record.position.ok_or_else(|| SyncError::NotMappable {
            id: id.to_string(),
        })?;

        let Some(map) = self.surfaces.map() else {
            return Err(SyncError::MapNotReady);
        };
        if self.map.state() != MapState::Ready {
            return Err(SyncError::MapNotReady);
        }

        map.set_view(position, self.map_config.focus_zoom);
        Ok(position)
    }
}
