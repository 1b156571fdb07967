use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::db::repository;
use crate::error::AppError;
use crate::extraction::ExtractionClient;
use crate::store::Tracker;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tracker: Arc<Mutex<Tracker>>,
    pub extractor: Arc<dyn ExtractionClient>,
}

impl AppState {
    /// Build state from whatever is already persisted in `db`.
    pub async fn load(db: SqlitePool, extractor: Arc<dyn ExtractionClient>) -> Result<Self, AppError> {
        let persisted = repository::load_state(&db).await?;
        tracing::info!(
            "loaded {} assignments and {} course folders",
            persisted.assignments.len(),
            persisted.course_folders.len()
        );
        Ok(Self {
            db,
            tracker: Arc::new(Mutex::new(Tracker::from_state(persisted))),
            extractor,
        })
    }
}
