//! Map surface lifecycle.
//!
//! `Uninitialized -> Initializing -> Ready`, or `Error` when an attempt
//! fails. A failed map is re-attempted only when the caller invokes
//! [`MapLifecycle::initialize`] again; there is no internal retry loop.

use std::sync::Mutex;

use serde::Serialize;
use strum_macros::{AsRefStr, Display};

use crate::config::{MapConfig, TileSource};
use crate::surfaces::{MapInitError, MapSurface};

/// Where the map is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum MapState {
    /// Not attempted yet.
    #[default]
    Uninitialized,
    /// An attempt is in flight.
    Initializing,
    /// Markers can be pushed.
    Ready,
    /// The last attempt failed.
    Error,
}

/// What a call to [`MapLifecycle::initialize`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The map was already ready.
    AlreadyReady,
    /// Another attempt is in flight.
    InProgress,
    /// This attempt made the map ready.
    Initialized,
    /// This attempt failed. `first_failure` is false if the previous
    /// attempt had failed too.
    Failed {
        /// Failure message.
        error: MapInitError,
        /// Whether this failure follows a non-failed state.
        first_failure: bool,
    },
}

#[derive(Debug, Default)]
pub(crate) struct MapLifecycle {
    state: Mutex<MapState>,
}

/// Puts an abandoned attempt back to its previous state so the next
/// caller can start over.
struct AttemptGuard<'a> {
    lifecycle: &'a MapLifecycle,
    previous: MapState,
    settled: bool,
}

impl AttemptGuard<'_> {
    fn settle(mut self, state: MapState) {
        self.lifecycle.set(state);
        self.settled = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            log::warn!("Map initialization abandoned, returning to {}", self.previous);
            self.lifecycle.set(self.previous);
        }
    }
}

impl MapLifecycle {
    pub fn state(&self) -> MapState {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn set(&self, state: MapState) {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = state;
    }

    /// Runs one initialization attempt unless the map is ready or an
    /// attempt is already running. `tiles` is installed on success.
    pub async fn initialize(
        &self,
        surface: &dyn MapSurface,
        config: &MapConfig,
        tiles: &TileSource,
    ) -> InitOutcome {
        let previous = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            match *state {
                MapState::Ready => return InitOutcome::AlreadyReady,
                MapState::Initializing => return InitOutcome::InProgress,
                previous @ (MapState::Uninitialized | MapState::Error) => {
                    *state = MapState::Initializing;
                    previous
                }
            }
        };

        let attempt = AttemptGuard {
            lifecycle: self,
            previous,
            settled: false,
        };

        log::debug!("Initializing map (previous state: {previous})");
        match surface.initialize(config).await {
            Ok(()) => {
                surface.set_tile_source(tiles);
                attempt.settle(MapState::Ready);
                log::info!("Map ready");
                InitOutcome::Initialized
            }
            Err(error) => {
                attempt.settle(MapState::Error);
                log::error!("Map initialization failed: {error}");
                InitOutcome::Failed {
                    error,
                    first_failure: previous != MapState::Error,
                }
            }
        }
    }
}
