use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    api::{ApiClient, CsvUpload},
    error::{ApiError, InvalidInput},
    stats_refresher::StatsRefresher,
    view_state::{ViewEvent, ViewStore},
};

#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Server message on success.
    pub status: Result<String, ApiError>,
    pub stats_refreshed: bool,
}

/// Drives one CSV file through ingestion. Uploads are not generation-gated:
/// concurrent submissions each write `upload_status` when they finish and the
/// last one to finish wins.
pub struct UploadPipeline {
    api: Arc<dyn ApiClient>,
    store: Arc<ViewStore>,
    stats: StatsRefresher,
}

impl UploadPipeline {
    pub fn new(api: Arc<dyn ApiClient>, store: Arc<ViewStore>, stats: StatsRefresher) -> Self {
        Self { api, store, stats }
    }

    pub async fn submit(&self, file: Option<CsvUpload>) -> Result<UploadOutcome, InvalidInput> {
        let file = file.ok_or(InvalidInput::NoFileSelected)?;
        if !file.filename.to_ascii_lowercase().ends_with(".csv") {
            return Err(InvalidInput::NotCsv(file.filename));
        }

        self.store.dispatch(ViewEvent::UploadStarted).await;
        let filename = file.filename.clone();
        info!(%filename, size = file.bytes.len(), "upload: submitting csv");

        let status = self.api.upload_csv(file).await;
        match &status {
            Ok(message) => info!(%filename, %message, "upload: accepted"),
            Err(err) => warn!(%filename, error = %err, "upload: failed"),
        }
        self.store
            .dispatch(ViewEvent::UploadResolved(status.clone()))
            .await;
        self.store.dispatch(ViewEvent::UploadSettled).await;

        let stats_refreshed = match status {
            Ok(_) => self.stats.refresh().await.is_ok(),
            Err(_) => false,
        };

        Ok(UploadOutcome {
            status,
            stats_refreshed,
        })
    }
}

#[cfg(test)]
#[path = "tests/upload_pipeline_tests.rs"]
mod tests;
