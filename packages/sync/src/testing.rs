//! In-memory surfaces and sources shared by the tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use disaster_map_client::{ClientError, DisasterSource};
use disaster_map_disaster_models::LatLng;
use disaster_map_pipeline::markers::MarkerDescriptor;
use disaster_map_pipeline::stats::SummaryStatistics;
use disaster_map_pipeline::table::TableRow;
use serde_json::{Value, json};

use crate::config::{MapConfig, TileSource};
use crate::notice::Notice;
use crate::surfaces::{
    FilterControls, LoadingIndicator, MapInitError, MapSurface, Notifier, StatsSurface,
    TableSurface,
};

pub fn hours_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}

pub fn flood(id: &str, severity: u8, hours: i64) -> Value {
    json!({
        "id": id,
        "type": "flood",
        "severity": severity,
        "lat": 29.7,
        "lng": -95.3,
        "timestamp": hours_ago(hours),
        "title": format!("Flood {id}"),
    })
}

pub fn server_error() -> ClientError {
    ClientError::Status {
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        url: "http://localhost/api/disasters".to_string(),
    }
}

/// Replays queued responses; repeats the last one when the queue runs dry.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Vec<Value>, ClientError>>>,
    pub calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Vec<Value>, ClientError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DisasterSource for ScriptedSource {
    async fn fetch_disasters(&self) -> Result<Vec<Value>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().unwrap();
        let next = if responses.len() > 1 {
            responses.pop_front()
        } else {
            responses.front().map(|r| match r {
                Ok(entries) => Ok(entries.clone()),
                Err(_) => Err(server_error()),
            })
        };
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapCall {
    Clear,
    Add(Vec<String>),
    Tiles(String),
    Invalidate,
    View(LatLng, u8),
}

#[derive(Default)]
pub struct RecordingMap {
    pub calls: Mutex<Vec<MapCall>>,
    pub fail_init: AtomicBool,
    pub init_delay_ms: AtomicU64,
}

impl RecordingMap {
    pub fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: MapCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MapSurface for RecordingMap {
    async fn initialize(&self, _config: &MapConfig) -> Result<(), MapInitError> {
        let delay = self.init_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(MapInitError {
                message: "no container".to_string(),
            });
        }
        Ok(())
    }

    fn clear_markers(&self) {
        self.push(MapCall::Clear);
    }

    fn add_markers(&self, markers: &[MarkerDescriptor]) {
        self.push(MapCall::Add(
            markers.iter().map(|m| m.record_id.0.clone()).collect(),
        ));
    }

    fn set_tile_source(&self, tiles: &TileSource) {
        self.push(MapCall::Tiles(tiles.url_template.clone()));
    }

    fn invalidate_size(&self) {
        self.push(MapCall::Invalidate);
    }

    fn set_view(&self, center: LatLng, zoom: u8) {
        self.push(MapCall::View(center, zoom));
    }
}

#[derive(Default)]
pub struct RecordingTable {
    pub renders: Mutex<Vec<Vec<String>>>,
}

impl TableSurface for RecordingTable {
    fn render_rows(&self, rows: &[TableRow]) {
        self.renders
            .lock()
            .unwrap()
            .push(rows.iter().map(|r| r.id.0.clone()).collect());
    }
}

#[derive(Default)]
pub struct RecordingStats {
    pub renders: Mutex<Vec<SummaryStatistics>>,
}

impl StatsSurface for RecordingStats {
    fn render_stats(&self, stats: &SummaryStatistics) {
        self.renders.lock().unwrap().push(stats.clone());
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
    pub clears: AtomicUsize,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingLoading {
    pub states: Mutex<Vec<bool>>,
}

impl LoadingIndicator for RecordingLoading {
    fn set_loading(&self, loading: bool) {
        self.states.lock().unwrap().push(loading);
    }
}

pub struct StaticControls {
    pub kind: Mutex<Option<String>>,
    pub severity: Mutex<Option<String>>,
    pub age: Mutex<Option<String>>,
}

impl StaticControls {
    pub fn new(kind: &str, severity: &str, age: &str) -> Self {
        Self {
            kind: Mutex::new(Some(kind.to_string())),
            severity: Mutex::new(Some(severity.to_string())),
            age: Mutex::new(Some(age.to_string())),
        }
    }
}

impl FilterControls for StaticControls {
    fn type_value(&self) -> Option<String> {
        self.kind.lock().unwrap().clone()
    }

    fn severity_value(&self) -> Option<String> {
        self.severity.lock().unwrap().clone()
    }

    fn age_value(&self) -> Option<String> {
        self.age.lock().unwrap().clone()
    }

    fn reset(&self) {
        *self.kind.lock().unwrap() = Some("all".to_string());
        *self.severity.lock().unwrap() = Some("1".to_string());
        *self.age.lock().unwrap() = Some("7".to_string());
    }
}
