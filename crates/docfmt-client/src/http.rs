//! [`Backend`] over HTTP with reqwest

use async_trait::async_trait;
use docfmt_types::{
    CheckReport, DocumentRequest, ErrorBody, ExportConfigRequest, ExportConfigResponse,
    FormatConfig, FormatResult, ImportConfigRequest, ImportConfigResponse, TemplateCatalog,
    UploadResult, DOCX_MIME,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::upload::LocalFile;

/// Talks to a backend at `base_url`; every path sits under `/api`
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn post_json<T, R>(&self, path: &str, body: &T) -> Result<R, ClientError>
    where
        T: serde::Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.client.post(self.api(path)).json(body).send().await?;
        read_json(response).await
    }
}

/// Turn a non-2xx response into [`ClientError::Backend`]
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Bodies that are not JSON or lack `error` leave the message empty
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .filter(|error| !error.is_empty());

    debug!("backend answered {}: {:?}", status, message);
    Err(ClientError::Backend {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, ClientError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<R>().await?)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, file: &LocalFile) -> Result<UploadResult, ClientError> {
        let part = Part::bytes(file.contents().to_vec())
            .file_name(file.name().to_string())
            .mime_str(DOCX_MIME)?;
        let form = Form::new().part("file", part);

        debug!("POST /upload ({} bytes)", file.size());
        let response = self
            .client
            .post(self.api("/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn templates(&self) -> Result<TemplateCatalog, ClientError> {
        let response = self.client.get(self.api("/templates")).send().await?;
        read_json(response).await
    }

    async fn check(
        &self,
        file_id: &str,
        config: &FormatConfig,
    ) -> Result<CheckReport, ClientError> {
        let body = DocumentRequest {
            file_id: file_id.to_string(),
            format_config: Some(config.clone()),
        };
        self.post_json("/check", &body).await
    }

    async fn format(
        &self,
        file_id: &str,
        config: &FormatConfig,
    ) -> Result<FormatResult, ClientError> {
        let body = DocumentRequest {
            file_id: file_id.to_string(),
            format_config: Some(config.clone()),
        };
        self.post_json("/format", &body).await
    }

    fn download_url(&self, formatted_file_id: &str) -> String {
        self.api(&format!("/download/{}", formatted_file_id))
    }

    async fn download(&self, formatted_file_id: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .client
            .get(self.download_url(formatted_file_id))
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn export_config(&self, config: &FormatConfig) -> Result<String, ClientError> {
        let body = ExportConfigRequest {
            config: Some(config.clone()),
        };
        let exported: ExportConfigResponse = self.post_json("/export-config", &body).await?;
        Ok(exported.config_json)
    }

    async fn import_config(&self, config_json: &str) -> Result<FormatConfig, ClientError> {
        let body = ImportConfigRequest {
            config_json: config_json.to_string(),
        };
        let imported: ImportConfigResponse = self.post_json("/import-config", &body).await?;
        Ok(imported.config)
    }
}
