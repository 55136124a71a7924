//! Request and response bodies of the `/api` endpoints

use serde::{Deserialize, Serialize};

use crate::config::FormatConfig;

/// Response of `POST /api/upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub file_id: String,
    /// Sanitised name the server stored the file under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A named configuration bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: FormatConfig,
}

/// Response of `GET /api/templates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateCatalog {
    pub templates: Vec<Template>,
    /// Name of the template selected by default
    pub default: String,
}

impl TemplateCatalog {
    pub fn find(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    pub fn default_template(&self) -> Option<&Template> {
        self.find(&self.default)
    }
}

/// Body of `POST /api/check` and `POST /api/format`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub file_id: String,
    #[serde(default)]
    pub format_config: Option<FormatConfig>,
}

/// Response of `POST /api/format`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatResult {
    pub formatted_file_id: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/export-config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfigRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FormatConfig>,
}

/// Response of `POST /api/export-config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfigResponse {
    pub config_json: String,
}

/// Body of `POST /api/import-config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfigRequest {
    pub config_json: String,
}

/// Response of `POST /api/import-config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfigResponse {
    pub config: FormatConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body of any non-2xx response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_result_accepts_bare_file_id() {
        let result: UploadResult = serde_json::from_value(json!({ "file_id": "abc" })).unwrap();
        assert_eq!(result.file_id, "abc");
        assert!(result.filename.is_none());
    }

    #[test]
    fn test_catalog_default_lookup() {
        let catalog: TemplateCatalog = serde_json::from_value(json!({
            "templates": [
                { "name": "GB Standard", "config": {} },
                { "name": "Liberal Arts", "description": "d", "config": { "body": {} } }
            ],
            "default": "Liberal Arts"
        }))
        .unwrap();

        let default = catalog.default_template().unwrap();
        assert_eq!(default.name, "Liberal Arts");
        assert!(catalog.find("Missing").is_none());
    }

    #[test]
    fn test_document_request_wire_shape() {
        let req = DocumentRequest {
            file_id: "abc".to_string(),
            format_config: Some(FormatConfig::new()),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "file_id": "abc", "format_config": {} })
        );
    }

    #[test]
    fn test_error_body_tolerates_unknown_shape() {
        let body: ErrorBody = serde_json::from_value(json!({ "detail": "x" })).unwrap();
        assert!(body.error.is_none());
        let body: ErrorBody =
            serde_json::from_value(json!({ "error": "bad file", "success": false })).unwrap();
        assert_eq!(body.error.as_deref(), Some("bad file"));
    }
}
