//! Terminal implementations of the presentation surfaces.
//!
//! All output goes through [`MultiProgress::suspend`] so it never tears
//! the loading spinner, and log lines are bridged the same way by
//! [`init_logger`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use disaster_map_disaster_models::LatLng;
use disaster_map_pipeline::markers::MarkerDescriptor;
use disaster_map_pipeline::stats::SummaryStatistics;
use disaster_map_pipeline::table::{EMPTY_TABLE_MESSAGE, TableRow};
use disaster_map_sync::config::TileSource;
use disaster_map_sync::surfaces::{
    FilterControls, LoadingIndicator, MapInitError, MapSurface, Notifier, StatsSurface,
    TableSurface,
};
use disaster_map_sync::{MapConfig, Notice, NoticeLevel};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Initializes `pretty_env_logger` from `RUST_LOG`, wrapped so log lines
/// are suspended while the spinner redraws.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

/// Marker list printed as text.
pub struct ConsoleMap {
    multi: MultiProgress,
    markers: AtomicUsize,
}

impl ConsoleMap {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            markers: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MapSurface for ConsoleMap {
    async fn initialize(&self, config: &MapConfig) -> Result<(), MapInitError> {
        log::debug!(
            "Console map: center {:.2},{:.2} zoom {} ({}..={})",
            config.initial_center.lat,
            config.initial_center.lng,
            config.initial_zoom,
            config.min_zoom,
            config.max_zoom
        );
        Ok(())
    }

    fn clear_markers(&self) {
        self.markers.store(0, Ordering::Relaxed);
    }

    fn add_markers(&self, markers: &[MarkerDescriptor]) {
        let total = self.markers.fetch_add(markers.len(), Ordering::Relaxed) + markers.len();
        self.multi.suspend(|| {
            println!("Map: {total} marker(s)");
            for marker in markers {
                println!(
                    "  {} {:>9.4} {:>10.4}  sev {}  {}",
                    marker.icon.color,
                    marker.position.lat,
                    marker.position.lng,
                    marker.severity.value(),
                    marker.title
                );
            }
        });
    }

    fn set_tile_source(&self, tiles: &TileSource) {
        log::debug!("Console map tiles: {}", tiles.url_template);
    }

    fn invalidate_size(&self) {}

    fn set_view(&self, center: LatLng, zoom: u8) {
        self.multi.suspend(|| {
            println!(
                "Map centered on {:.4},{:.4} (zoom {zoom})",
                center.lat, center.lng
            );
        });
    }
}

/// Table rows printed as aligned text.
pub struct ConsoleTable {
    multi: MultiProgress,
}

impl ConsoleTable {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl TableSurface for ConsoleTable {
    fn render_rows(&self, rows: &[TableRow]) {
        self.multi.suspend(|| {
            if rows.is_empty() {
                println!("{EMPTY_TABLE_MESSAGE}");
                return;
            }
            println!(
                "{:<12} {:<10} {:<3} {:<20} {:<24} TITLE",
                "ID", "TYPE", "SEV", "TIME", "LOCATION"
            );
            println!("{}", "-".repeat(100));
            for row in rows {
                println!(
                    "{:<12} {:<10} {:<3} {:<20} {:<24} {}",
                    truncate(&row.id.0, 12),
                    row.disaster_type,
                    row.severity,
                    row.time,
                    truncate(&row.location, 24),
                    row.title
                );
            }
            println!("\n{} disaster(s)", rows.len());
        });
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Summary statistics printed as one block.
pub struct ConsoleStats {
    multi: MultiProgress,
}

impl ConsoleStats {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl StatsSurface for ConsoleStats {
    fn render_stats(&self, stats: &SummaryStatistics) {
        let by_type = stats
            .by_type
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, count)| format!("{kind}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        let by_severity = stats
            .by_severity
            .iter()
            .map(|(level, count)| format!("{}: {count}", level.value()))
            .collect::<Vec<_>>()
            .join(", ");

        self.multi.suspend(|| {
            println!(
                "Total: {}  On map: {}  Unrated: {}",
                stats.total, stats.mappable, stats.unrated
            );
            if !by_type.is_empty() {
                println!("By type: {by_type}");
            }
            println!("By severity: {by_severity}");
            if let Some(latest) = stats.most_recent {
                println!("Most recent: {}", latest.format("%Y-%m-%d %H:%M UTC"));
            }
        });
    }
}

/// Spinner shown while a fetch is in flight.
pub struct ConsoleLoading {
    multi: MultiProgress,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ConsoleLoading {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            spinner: Mutex::new(None),
        }
    }
}

impl LoadingIndicator for ConsoleLoading {
    fn set_loading(&self, loading: bool) {
        let mut spinner = self
            .spinner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if loading {
            if spinner.is_none() {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.set_message("Loading disasters...");
                *spinner = Some(bar);
            }
        } else if let Some(bar) = spinner.take() {
            bar.finish_and_clear();
        }
    }
}

/// Notices printed to stderr.
pub struct ConsoleNotifier {
    multi: MultiProgress,
    showing_error: AtomicBool,
}

impl ConsoleNotifier {
    #[must_use]
    pub const fn new(multi: MultiProgress) -> Self {
        Self {
            multi,
            showing_error: AtomicBool::new(false),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        if matches!(notice.level, NoticeLevel::Error | NoticeLevel::Blocking) {
            self.showing_error.store(true, Ordering::Relaxed);
        }
        self.multi.suspend(|| eprintln!("{notice}"));
    }

    fn clear(&self) {
        if self.showing_error.swap(false, Ordering::Relaxed) {
            self.multi.suspend(|| eprintln!("Disaster data is loading again."));
        }
    }
}

/// Filter values taken from command-line flags. A flag that was not given
/// counts as a missing control.
pub struct FlagControls {
    values: Mutex<[Option<String>; 3]>,
}

impl FlagControls {
    #[must_use]
    pub const fn new(
        disaster_type: Option<String>,
        min_severity: Option<String>,
        max_age_days: Option<String>,
    ) -> Self {
        Self {
            values: Mutex::new([disaster_type, min_severity, max_age_days]),
        }
    }

    fn get(&self, index: usize) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)[index]
            .clone()
    }
}

impl FilterControls for FlagControls {
    fn type_value(&self) -> Option<String> {
        self.get(0)
    }

    fn severity_value(&self) -> Option<String> {
        self.get(1)
    }

    fn age_value(&self) -> Option<String> {
        self.get(2)
    }

    fn reset(&self) {
        *self
            .values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = [
            Some("all".to_string()),
            Some("1".to_string()),
            Some("7".to_string()),
        ];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_cells() {
        assert_eq!(truncate("Houston", 12), "Houston");
        assert_eq!(truncate("Greater Houston Metro Area", 12), "Greater H...");
    }

    #[test]
    fn flag_controls_reset_to_defaults() {
        let controls = FlagControls::new(Some("flood".to_string()), None, Some("30".to_string()));
        assert_eq!(controls.type_value().as_deref(), Some("flood"));
        assert_eq!(controls.severity_value(), None);

        controls.reset();
        assert_eq!(controls.type_value().as_deref(), Some("all"));
        assert_eq!(controls.severity_value().as_deref(), Some("1"));
        assert_eq!(controls.age_value().as_deref(), Some("7"));
    }
}
