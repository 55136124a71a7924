//! Document engine seam
//!
//! Checking and rewriting `.docx` files happens in an external engine. The
//! server only forwards the stored document and the resolved configuration.

use std::time::Duration;

use async_trait::async_trait;
use docfmt_types::{CheckItem, CheckReport, ErrorBody, FormatConfig, DOCX_MIME};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::StoredFile;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No document engine is configured")]
    Unavailable,

    /// The engine refused the document or configuration
    #[error("{0}")]
    Rejected(String),

    #[error("Document engine failed: {0}")]
    Failed(String),

    #[error("Document engine request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait DocumentEngine: Send + Sync {
    /// Evaluate the document against the configuration
    async fn check(
        &self,
        document: &StoredFile,
        config: &FormatConfig,
    ) -> Result<CheckReport, EngineError>;

    /// Rewrite the document, returning the new `.docx` bytes
    async fn format(
        &self,
        document: &StoredFile,
        config: &FormatConfig,
    ) -> Result<Vec<u8>, EngineError>;

    fn is_available(&self) -> bool {
        true
    }
}

/// Used when no engine URL was given; every call answers [`EngineError::Unavailable`]
pub struct UnconfiguredEngine;

#[async_trait]
impl DocumentEngine for UnconfiguredEngine {
    async fn check(&self, _: &StoredFile, _: &FormatConfig) -> Result<CheckReport, EngineError> {
        Err(EngineError::Unavailable)
    }

    async fn format(&self, _: &StoredFile, _: &FormatConfig) -> Result<Vec<u8>, EngineError> {
        Err(EngineError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Engine reached over HTTP at `{base_url}/check` and `{base_url}/format`
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

/// Only the items are trusted; totals are recomputed
#[derive(Deserialize)]
struct EngineReport {
    items: Vec<CheckItem>,
}

impl HttpEngine {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn send(
        &self,
        endpoint: &str,
        document: &StoredFile,
        config: &FormatConfig,
    ) -> Result<Response, EngineError> {
        let config_json =
            serde_json::to_string(config).map_err(|e| EngineError::Failed(e.to_string()))?;
        let part = Part::bytes(document.contents.clone())
            .file_name(document.name.clone())
            .mime_str(DOCX_MIME)?;
        let form = Form::new()
            .part("file", part)
            .text("format_config", config_json);

        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Forwarding {} to {}", document.id, url);
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error);

        if status.is_client_error() {
            Err(EngineError::Rejected(
                message.unwrap_or_else(|| "Document rejected by engine".to_string()),
            ))
        } else {
            warn!("Engine {} returned {}: {:?}", endpoint, status, message);
            Err(EngineError::Failed(format!("engine returned HTTP {}", status.as_u16())))
        }
    }
}

#[async_trait]
impl DocumentEngine for HttpEngine {
    async fn check(
        &self,
        document: &StoredFile,
        config: &FormatConfig,
    ) -> Result<CheckReport, EngineError> {
        let response = self.send("check", document, config).await?;
        let report: EngineReport = response
            .json()
            .await
            .map_err(|e| EngineError::Failed(format!("invalid report: {}", e)))?;
        Ok(CheckReport::from_items(report.items))
    }

    async fn format(
        &self,
        document: &StoredFile,
        config: &FormatConfig,
    ) -> Result<Vec<u8>, EngineError> {
        let response = self.send("format", document, config).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
