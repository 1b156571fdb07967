use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursetrack::api::router;
use coursetrack::config::AppConfig;
use coursetrack::db;
use coursetrack::extraction::{ExtractionClient, HttpExtractionClient, NoopExtractionClient};
use coursetrack::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "coursetrack=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let extractor: Arc<dyn ExtractionClient> = match config.extraction.clone() {
        Some(extraction) => {
            info!("using extraction service at {}", extraction.base_url);
            Arc::new(HttpExtractionClient::new(extraction)?)
        }
        None => {
            tracing::warn!("EXTRACTION_URL is not set; document import is disabled");
            Arc::new(NoopExtractionClient)
        }
    };

    let state = AppState::load(pool, extractor).await?;

    let app = router(state);

    info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
