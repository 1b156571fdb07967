use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::AppError;
use crate::extraction::{ExtractionClient, ExtractionRequest, drafts_from_response};
use crate::models::StagingSummary;
use crate::store::Tracker;

/// Runs one extraction and stages its result for review.
pub struct ImportService {
    tracker: Arc<Mutex<Tracker>>,
    extractor: Arc<dyn ExtractionClient>,
}

#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub document_title: Option<String>,
    pub summary: StagingSummary,
}

impl ImportService {
    pub fn new(tracker: Arc<Mutex<Tracker>>, extractor: Arc<dyn ExtractionClient>) -> Self {
        Self { tracker, extractor }
    }

    /// The tracker lock is not held while the service is working. Starting
    /// the request supersedes any older one still in flight; on any failure
    /// the current drafts are left as they were.
    pub async fn import(&self, request: ExtractionRequest) -> Result<ImportReport, AppError> {
        let ticket = self.tracker.lock().await.staging.begin_extraction();
        info!("Starting extraction (repair={})", request.repair);

        let response = match self.extractor.extract(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Extraction failed, staging left unchanged: {}", e);
                return Err(e);
            }
        };
        let batch = drafts_from_response(response, request.course_hint.as_deref())?;
        let staged = batch.drafts.len();

        let mut tracker = self.tracker.lock().await;
        tracker
            .staging
            .accept_extraction(ticket, batch.drafts, batch.year_hint)?;
        let summary = tracker.staging.summary();

        info!(
            "Staged {} drafts ({} dated, {} undated)",
            staged, summary.dated, summary.undated
        );
        Ok(ImportReport {
            document_title: batch.document_title,
            summary,
        })
    }
}
