//! API handlers for the docfmt server
//!
//! Provides REST endpoints for:
//! - Document upload and download
//! - Format checking and one-click formatting (through the document engine)
//! - Preset templates and configuration export/import

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, multipart::MultipartRejection, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use docfmt_types::{
    has_docx_extension, CheckReport, DocumentRequest, ExportConfigRequest, ExportConfigResponse,
    FormatConfig, FormatResult, ImportConfigRequest, ImportConfigResponse, TemplateCatalog,
    UploadResult, DOCX_MIME, MAX_UPLOAD_BYTES,
};
use format_config::{default_config, export_config, import_config, resolve_config, template_catalog};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::store::{formatted_name, sanitize_filename, StoredFile};
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub engine: &'static str,
    pub stored_files: usize,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "docfmt-server",
        version: env!("CARGO_PKG_VERSION"),
        engine: if state.engine.is_available() {
            "available"
        } else {
            "unconfigured"
        },
        stored_files: state.store.len().await,
    })
}

/// Handler: POST /api/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResult>, ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        if original.is_empty() {
            return Err(ServerError::InvalidRequest("No file selected".to_string()));
        }
        if !has_docx_extension(&original) {
            return Err(ServerError::InvalidRequest(
                "Only .docx files are supported".to_string(),
            ));
        }

        // Bodies past the router limit fail here as well
        let too_large = || ServerError::InvalidRequest("File exceeds the 20 MB limit".to_string());
        let contents = field.bytes().await.map_err(|_| too_large())?;
        if contents.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(too_large());
        }

        state.store.purge_expired().await;
        let stored = state
            .store
            .insert(sanitize_filename(&original), contents.to_vec())
            .await;
        info!("Uploaded {} ({} bytes)", stored.name, stored.size());

        return Ok(Json(UploadResult {
            file_id: stored.id.clone(),
            filename: Some(stored.name.clone()),
            size: Some(stored.size()),
        }));
    }

    Err(ServerError::InvalidRequest("No file provided".to_string()))
}

/// Handler: GET /api/templates
pub async fn handle_templates() -> Json<TemplateCatalog> {
    Json(template_catalog())
}

/// Look up the stored document and resolve its configuration
async fn prepare(
    state: &AppState,
    request: &DocumentRequest,
) -> Result<(Arc<StoredFile>, FormatConfig), ServerError> {
    if request.file_id.is_empty() {
        return Err(ServerError::InvalidRequest("Missing file_id".to_string()));
    }

    let document = state
        .store
        .get(&request.file_id)
        .await
        .ok_or(ServerError::FileNotFound)?;
    let config =
        resolve_config(request.format_config.as_ref()).map_err(ServerError::InvalidConfig)?;
    Ok((document, config))
}

/// Handler: POST /api/check
pub async fn handle_check(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<CheckReport>, ServerError> {
    let Json(request) = payload?;
    let (document, config) = prepare(&state, &request).await?;

    let report = state.engine.check(&document, &config).await?;
    let report = CheckReport::from_items(report.items);
    info!(
        "Checked {}: {}/{} passed",
        document.name, report.passed_items, report.total_items
    );
    Ok(Json(report))
}

/// Handler: POST /api/format
pub async fn handle_format(
    State(state): State<AppState>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<FormatResult>, ServerError> {
    let Json(request) = payload?;
    let (document, config) = prepare(&state, &request).await?;

    let contents = state.engine.format(&document, &config).await?;
    let formatted = state
        .store
        .insert(formatted_name(&document.name), contents)
        .await;
    info!("Formatted {} into {}", document.name, formatted.name);

    Ok(Json(FormatResult {
        formatted_file_id: formatted.id.clone(),
        filename: formatted.name.clone(),
        message: Some("Formatting complete".to_string()),
    }))
}

/// `Content-Disposition` with an ASCII fallback and the UTF-8 name
fn attachment_header(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

/// Handler: GET /api/download/:id
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let file = state.store.get(&id).await.ok_or(ServerError::FileNotFound)?;
    debug!("Downloading {} ({} bytes)", file.name, file.size());

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(&file.name)),
        ],
        file.contents.clone(),
    ))
}

/// Handler: POST /api/export-config
pub async fn handle_export_config(
    payload: Result<Json<ExportConfigRequest>, JsonRejection>,
) -> Result<Json<ExportConfigResponse>, ServerError> {
    let Json(request) = payload?;
    let config = request.config.unwrap_or_else(default_config);
    let config_json = export_config(&config).map_err(ServerError::Config)?;
    Ok(Json(ExportConfigResponse { config_json }))
}

/// Handler: POST /api/import-config
pub async fn handle_import_config(
    payload: Result<Json<ImportConfigRequest>, JsonRejection>,
) -> Result<Json<ImportConfigResponse>, ServerError> {
    let Json(request) = payload?;
    let config = import_config(&request.config_json).map_err(ServerError::Config)?;
    Ok(Json(ImportConfigResponse {
        config,
        message: Some("Configuration imported".to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_header_ascii() {
        assert_eq!(
            attachment_header("paper_formatted.docx"),
            "attachment; filename=\"paper_formatted.docx\"; filename*=UTF-8''paper%5Fformatted%2Edocx"
        );
    }

    #[test]
    fn test_attachment_header_unicode() {
        let value = attachment_header("论文_formatted.docx");
        assert!(value.starts_with("attachment; filename=\"___formatted.docx\""));
        assert!(value.contains("filename*=UTF-8''%E8%AE%BA%E6%96%87"));
    }
}
