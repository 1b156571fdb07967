use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://coursetrack.db?mode=rwc";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub extraction: Option<ExtractionConfig>,
}

#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::BadRequest(format!("BIND_ADDR is invalid: {}", e)))?;

        let extraction = match env::var("EXTRACTION_URL") {
            Ok(url) if !url.trim().is_empty() => Some(ExtractionConfig {
                base_url: url.trim().trim_end_matches('/').to_string(),
                timeout: extraction_timeout()?,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr,
            extraction,
        })
    }
}

fn extraction_timeout() -> Result<Duration, AppError> {
    match env::var("EXTRACTION_TIMEOUT_SECS") {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::BadRequest("EXTRACTION_TIMEOUT_SECS must be a whole number".to_string())),
        Err(_) => Ok(Duration::from_secs(DEFAULT_EXTRACTION_TIMEOUT_SECS)),
    }
}
