//! The reconciled view model and its single write path.

use std::sync::Arc;

use shared::domain::{AccidentRecord, RouteResult, StatsSnapshot};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::{
    error::ApiError,
    sequencer::{Generation, RequestSequencer},
};

pub const UPLOAD_SUBMITTING_STATUS: &str = "submitting";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub stats: Option<StatsSnapshot>,
    pub route: Option<RouteResult>,
    pub nearby_accidents: Vec<AccidentRecord>,
    pub loading: bool,
    pub upload_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    RouteStarted {
        generation: Generation,
    },
    RouteResolved {
        generation: Generation,
        result: Result<RouteResult, ApiError>,
    },
    NearbyResolved {
        generation: Generation,
        result: Result<Vec<AccidentRecord>, ApiError>,
    },
    RouteSettled {
        generation: Generation,
    },
    UploadStarted,
    UploadResolved(Result<String, ApiError>),
    UploadSettled,
    StatsResolved(Result<StatsSnapshot, ApiError>),
}

impl ViewEvent {
    /// Generation a route-scoped event belongs to; `None` for events that are
    /// never suppressed.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            ViewEvent::RouteStarted { generation }
            | ViewEvent::RouteResolved { generation, .. }
            | ViewEvent::NearbyResolved { generation, .. }
            | ViewEvent::RouteSettled { generation } => Some(*generation),
            ViewEvent::UploadStarted
            | ViewEvent::UploadResolved(_)
            | ViewEvent::UploadSettled
            | ViewEvent::StatsResolved(_) => None,
        }
    }
}

pub fn upload_failure_status(err: &ApiError) -> String {
    format!("Error uploading file: {err}")
}

/// Applies one event to the view. Route-scoped events whose generation is not
/// `latest` are dropped unchanged.
pub fn reduce(mut state: ViewState, latest: Generation, event: ViewEvent) -> ViewState {
    if let Some(generation) = event.generation() {
        if generation != latest {
            return state;
        }
    }

    match event {
        ViewEvent::RouteStarted { .. } => state.loading = true,
        ViewEvent::RouteResolved { result, .. } => state.route = result.ok(),
        ViewEvent::NearbyResolved { result, .. } => {
            if let Ok(records) = result {
                state.nearby_accidents = records;
            }
        }
        ViewEvent::RouteSettled { .. } => state.loading = false,
        ViewEvent::UploadStarted => {
            state.loading = true;
            state.upload_status = Some(UPLOAD_SUBMITTING_STATUS.to_string());
        }
        ViewEvent::UploadResolved(result) => {
            state.upload_status = Some(match result {
                Ok(message) => message,
                Err(err) => upload_failure_status(&err),
            });
        }
        ViewEvent::UploadSettled => state.loading = false,
        ViewEvent::StatsResolved(result) => {
            if let Ok(snapshot) = result {
                state.stats = Some(snapshot);
            }
        }
    }
    state
}

/// Owner of the one `ViewState`. Writes are serialized behind the lock and
/// judged against the sequencer while it is held; readers take clones.
pub struct ViewStore {
    state: Mutex<ViewState>,
    sequencer: Arc<RequestSequencer>,
    published: watch::Sender<ViewState>,
}

impl ViewStore {
    pub fn new(sequencer: Arc<RequestSequencer>) -> Self {
        let (published, _) = watch::channel(ViewState::default());
        Self {
            state: Mutex::new(ViewState::default()),
            sequencer,
            published,
        }
    }

    pub fn sequencer(&self) -> &Arc<RequestSequencer> {
        &self.sequencer
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.lock().await.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.published.subscribe()
    }

    /// Issues a new generation and marks the view busy under one lock.
    pub(crate) async fn begin_route(&self) -> Generation {
        let mut guard = self.state.lock().await;
        let generation = self.sequencer.new_generation();
        self.apply_locked(&mut guard, ViewEvent::RouteStarted { generation });
        generation
    }

    /// Returns whether the event was applied (false when it was stale).
    pub(crate) async fn dispatch(&self, event: ViewEvent) -> bool {
        let mut guard = self.state.lock().await;
        self.apply_locked(&mut guard, event)
    }

    fn apply_locked(&self, state: &mut ViewState, event: ViewEvent) -> bool {
        let latest = self.sequencer.latest();
        if let Some(generation) = event.generation() {
            if generation != latest {
                debug!(
                    generation = generation.0,
                    latest = latest.0,
                    "view: dropping superseded route event"
                );
                return false;
            }
        }

        *state = reduce(std::mem::take(state), latest, event);
        self.published.send_replace(state.clone());
        true
    }
}

#[cfg(test)]
#[path = "tests/view_state_tests.rs"]
mod tests;
