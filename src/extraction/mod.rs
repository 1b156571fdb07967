pub mod dto;

use async_trait::async_trait;
use reqwest::{Client, Url, multipart};

use crate::config::ExtractionConfig;
use crate::error::AppError;

pub use dto::{ExtractedBatch, ExtractionRequest, ExtractionResponse, ExtractionSource, drafts_from_response};

#[async_trait]
pub trait ExtractionClient: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, AppError>;
}

pub struct HttpExtractionClient {
    client: Client,
    config: ExtractionConfig,
}

impl HttpExtractionClient {
    pub fn new(config: ExtractionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str, request: &ExtractionRequest) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}/assignments/{}", self.config.base_url, path))
            .map_err(|e| AppError::BadRequest(format!("EXTRACTION_URL is invalid: {}", e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("use_llm_repair", if request.repair { "true" } else { "false" });
            if let Some(course) = request.course_hint.as_deref().filter(|c| !c.trim().is_empty()) {
                query.append_pair("course", course.trim());
            }
        }
        Ok(url)
    }

    async fn read_response(&self, response: reqwest::Response) -> Result<ExtractionResponse, AppError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("failed to read extraction response body: {}", e);
            AppError::Extraction(format!("failed to read extraction response: {}", e))
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ExtractionResponse>(&body)
                .ok()
                .and_then(|r| r.detail.or(r.message))
                .unwrap_or_else(|| body.clone());
            tracing::warn!("extraction service returned {}: {}", status, message);
            return Err(AppError::Extraction(format!("extraction service error {}: {}", status, message)));
        }

        serde_json::from_str::<ExtractionResponse>(&body).map_err(|e| {
            tracing::error!("Failed to parse extraction response: {}", e);
            AppError::Extraction(format!("Failed to parse extraction response: {}", e))
        })
    }
}

#[async_trait]
impl ExtractionClient for HttpExtractionClient {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResponse, AppError> {
        let send = match &request.source {
            ExtractionSource::Text(text) => {
                let url = self.endpoint("text_upload", request)?;
                self.client
                    .post(url)
                    .json(&dto::TextExtractionBody { text })
                    .send()
                    .await
            }
            ExtractionSource::Document { file_name, mime_type, bytes } => {
                let path = if mime_type.starts_with("image/") {
                    "image_upload"
                } else {
                    "pdf_upload"
                };
                let url = self.endpoint(path, request)?;
                let part = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str(mime_type)
                    .map_err(|e| AppError::BadRequest(format!("Invalid mime type {}: {}", mime_type, e)))?;
                let form = multipart::Form::new().part("file", part);
                self.client.post(url).multipart(form).send().await
            }
        };

        let response = send.map_err(|e| {
            tracing::warn!("extraction request failed: {}", e);
            AppError::Extraction(format!("extraction service unreachable: {}", e))
        })?;

        let parsed = self.read_response(response).await?;
        tracing::info!(
            "extraction returned status={:?} items={}",
            parsed.status,
            parsed.items.len()
        );
        Ok(parsed)
    }
}

/// Stand-in used when no extraction service is configured.
pub struct NoopExtractionClient;

#[async_trait]
impl ExtractionClient for NoopExtractionClient {
    async fn extract(&self, _request: &ExtractionRequest) -> Result<ExtractionResponse, AppError> {
        Err(AppError::Extraction(
            "extraction service is not configured".to_string(),
        ))
    }
}
