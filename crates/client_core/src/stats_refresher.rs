use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    api::ApiClient,
    error::ApiError,
    view_state::{ViewEvent, ViewStore},
};

/// Fetches the statistics summary and replaces the snapshot wholesale. A
/// failed fetch keeps whatever snapshot was shown before.
#[derive(Clone)]
pub struct StatsRefresher {
    api: Arc<dyn ApiClient>,
    store: Arc<ViewStore>,
}

impl StatsRefresher {
    pub fn new(api: Arc<dyn ApiClient>, store: Arc<ViewStore>) -> Self {
        Self { api, store }
    }

    pub async fn refresh(&self) -> Result<(), ApiError> {
        let result = self.api.get_stats().await;
        let outcome = match &result {
            Ok(snapshot) => {
                debug!(total = snapshot.total_accidents, "stats: snapshot refreshed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "stats: refresh failed; keeping previous snapshot");
                Err(err.clone())
            }
        };
        self.store.dispatch(ViewEvent::StatsResolved(result)).await;
        outcome
    }
}

#[cfg(test)]
#[path = "tests/stats_refresher_tests.rs"]
mod tests;
