//! The seam between the flows and the formatting service

use async_trait::async_trait;
use docfmt_types::{CheckReport, FormatConfig, FormatResult, TemplateCatalog, UploadResult};

use crate::error::ClientError;
use crate::upload::LocalFile;

/// Every `/api` call the flows make.
///
/// Any non-2xx response is an error; implementations put the body's
/// `error` field into [`ClientError::Backend`] when there is one.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload(&self, file: &LocalFile) -> Result<UploadResult, ClientError>;

    async fn templates(&self) -> Result<TemplateCatalog, ClientError>;

    async fn check(
        &self,
        file_id: &str,
        config: &FormatConfig,
    ) -> Result<CheckReport, ClientError>;

    async fn format(
        &self,
        file_id: &str,
        config: &FormatConfig,
    ) -> Result<FormatResult, ClientError>;

    /// Address a browser would navigate to for the formatted document
    fn download_url(&self, formatted_file_id: &str) -> String;

    async fn download(&self, formatted_file_id: &str) -> Result<Vec<u8>, ClientError>;

    async fn export_config(&self, config: &FormatConfig) -> Result<String, ClientError>;

    /// Send raw file text; returns the canonical configuration
    async fn import_config(&self, config_json: &str) -> Result<FormatConfig, ClientError>;
}
