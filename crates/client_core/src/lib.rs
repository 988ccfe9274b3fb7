use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

pub mod api;
pub mod error;
mod route_coordinator;
pub mod sequencer;
mod stats_refresher;
mod upload_pipeline;
pub mod view_state;

pub use api::{ApiClient, CsvUpload, HttpApiClient, DEFAULT_REQUEST_TIMEOUT};
pub use error::{ApiError, InvalidInput, PartialFailure, RouteStep};
pub use route_coordinator::{RouteCoordinator, RouteOutcome, RouteTicket};
pub use sequencer::{Generation, RequestSequencer};
pub use stats_refresher::StatsRefresher;
pub use upload_pipeline::{UploadOutcome, UploadPipeline};
pub use view_state::{ViewEvent, ViewState, ViewStore};

/// One client session: the three writers wired to a single shared view.
pub struct SafeRoutesSession {
    store: Arc<ViewStore>,
    routes: RouteCoordinator,
    uploads: UploadPipeline,
    stats: StatsRefresher,
}

impl SafeRoutesSession {
    pub fn new(api: Arc<dyn ApiClient>) -> Arc<Self> {
        let store = Arc::new(ViewStore::new(Arc::new(RequestSequencer::new())));
        let stats = StatsRefresher::new(Arc::clone(&api), Arc::clone(&store));
        Arc::new(Self {
            routes: RouteCoordinator::new(Arc::clone(&api), Arc::clone(&store)),
            uploads: UploadPipeline::new(api, Arc::clone(&store), stats.clone()),
            stats,
            store,
        })
    }

    /// Initial load: the statistics summary is fetched once at startup. A
    /// failure leaves the view without stats and is only logged.
    pub async fn start(&self) {
        if self.stats.refresh().await.is_ok() {
            info!("session: initial stats loaded");
        }
    }

    pub fn routes(&self) -> &RouteCoordinator {
        &self.routes
    }

    pub fn uploads(&self) -> &UploadPipeline {
        &self.uploads
    }

    pub fn stats(&self) -> &StatsRefresher {
        &self.stats
    }

    pub async fn snapshot(&self) -> ViewState {
        self.store.snapshot().await
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.store.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
