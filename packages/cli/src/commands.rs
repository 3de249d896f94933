//! Subcommand implementations shared by flag mode and interactive mode.

use std::sync::Arc;

use disaster_map_client::DisasterClient;
use disaster_map_client::models::{ReportSubmission, SubscriptionRequest};
use disaster_map_disaster_models::RecordId;
use disaster_map_pipeline::table::{table_html, table_rows};
use disaster_map_sync::refresh::RefreshLoop;
use disaster_map_sync::surfaces::Notifier;
use disaster_map_sync::{
    MapTheme, Notice, RefreshTrigger, SurfaceRegistry, SyncError, ViewSynchronizer,
};
use indicatif::MultiProgress;

use crate::console::{
    ConsoleLoading, ConsoleMap, ConsoleNotifier, ConsoleStats, ConsoleTable, FlagControls,
};
use crate::settings::Settings;

/// Which console surfaces a command registers besides statistics.
#[derive(Debug, Clone, Copy)]
struct Views {
    map: bool,
    table: bool,
}

impl Views {
    const ALL: Self = Self {
        map: true,
        table: true,
    };

    /// The text table and the HTML rows are alternatives.
    const fn listing(html: bool) -> Self {
        Self {
            map: false,
            table: !html,
        }
    }
}

/// Filter flag values, passed through as raw control values.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub disaster_type: Option<String>,
    pub min_severity: Option<String>,
    pub max_age_days: Option<String>,
}

fn synchronizer(
    settings: &Settings,
    multi: &MultiProgress,
    filters: FilterArgs,
    views: Views,
) -> Arc<ViewSynchronizer> {
    let mut surfaces = SurfaceRegistry::new()
        .with_stats(Arc::new(ConsoleStats::new(multi.clone())))
        .with_loading(Arc::new(ConsoleLoading::new(multi.clone())))
        .with_notifier(Arc::new(ConsoleNotifier::new(multi.clone())))
        .with_controls(Arc::new(FlagControls::new(
            filters.disaster_type,
            filters.min_severity,
            filters.max_age_days,
        )));
    if views.map {
        surfaces = surfaces.with_map(Arc::new(ConsoleMap::new(multi.clone())));
    }
    if views.table {
        surfaces = surfaces.with_table(Arc::new(ConsoleTable::new(multi.clone())));
    }

    Arc::new(ViewSynchronizer::new(
        Arc::new(DisasterClient::new(&settings.api_url)),
        surfaces,
        settings.map.clone(),
        settings.sync,
    ))
}

/// Keeps the console views refreshed until Ctrl-C.
///
/// # Errors
///
/// * If waiting for Ctrl-C fails
pub async fn watch(
    settings: &Settings,
    multi: &MultiProgress,
    filters: FilterArgs,
    theme: MapTheme,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = synchronizer(settings, multi, filters, Views::ALL);
    sync.set_theme(theme);
    log::info!("Watching {} (Ctrl-C to stop)", settings.api_url);

    let refresh = RefreshLoop::spawn(&sync);
    tokio::signal::ctrl_c().await?;

    log::info!("Stopping");
    refresh.stop();
    Ok(())
}

/// Runs one refresh without the map and prints the table and statistics.
/// With `html`, the table is printed as markup instead of text.
///
/// # Errors
///
/// * If the fetch fails
pub async fn list(
    settings: &Settings,
    multi: &MultiProgress,
    filters: FilterArgs,
    html: bool,
) -> Result<(), SyncError> {
    let sync = synchronizer(settings, multi, filters, Views::listing(html));
    let summary = sync.refresh(RefreshTrigger::Apply).await?;
    log::debug!("Listed {} of {} record(s)", summary.filtered, summary.fetched);

    if html {
        println!("{}", table_html(&table_rows(&sync.filtered_records())));
    }
    Ok(())
}

/// Fetches the current records and prints one record's detail panel.
///
/// # Errors
///
/// * If the fetch fails or no displayed record has that id
pub async fn details(
    settings: &Settings,
    multi: &MultiProgress,
    filters: FilterArgs,
    id: &str,
) -> Result<(), SyncError> {
    let sync = synchronizer(settings, multi, filters, Views::ALL);
    sync.initialize_map().await?;
    sync.refresh(RefreshTrigger::Apply).await?;

    let id = RecordId::from(id);
    println!("{}", sync.record_details(&id)?);
    match sync.focus_record(&id) {
        Ok(_) => {}
        Err(SyncError::NotMappable { .. }) => println!("This disaster has no map position."),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Submits a report and prints the outcome. Returns whether it succeeded.
pub async fn report(
    settings: &Settings,
    multi: &MultiProgress,
    report: &ReportSubmission,
) -> bool {
    let client = DisasterClient::new(&settings.api_url);
    let result = client.submit_report(report).await.map(|ack| ack.message);
    announce(
        multi,
        &Notice::from_submission(&result, "Report submitted successfully!"),
    );
    result.is_ok()
}

/// Subscribes to alerts and prints the outcome. Returns whether it
/// succeeded.
pub async fn subscribe(
    settings: &Settings,
    multi: &MultiProgress,
    request: &SubscriptionRequest,
) -> bool {
    let client = DisasterClient::new(&settings.api_url);
    let result = client.subscribe(request).await.map(|ack| ack.message);
    announce(
        multi,
        &Notice::from_submission(&result, "Successfully subscribed to alerts!"),
    );
    result.is_ok()
}

fn announce(multi: &MultiProgress, notice: &Notice) {
    ConsoleNotifier::new(multi.clone()).notify(notice);
}

#[cfg(test)]
mod tests {
    use disaster_map_sync::{MapConfig, SyncConfig};

    use super::*;

    fn settings() -> Settings {
        Settings {
            api_url: "http://127.0.0.1:9".to_string(),
            sync: SyncConfig::default(),
            map: MapConfig::embedded(),
        }
    }

    #[test]
    fn html_listing_skips_the_text_table() {
        let multi = MultiProgress::new();

        let sync = synchronizer(&settings(), &multi, FilterArgs::default(), Views::listing(true));
        let present = sync.surfaces().present();
        assert!(!present.contains(&"table"));
        assert!(!present.contains(&"map"));
        assert!(present.contains(&"stats"));

        let sync = synchronizer(&settings(), &multi, FilterArgs::default(), Views::listing(false));
        assert!(sync.surfaces().present().contains(&"table"));
    }
}
