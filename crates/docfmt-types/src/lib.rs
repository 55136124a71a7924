pub mod api;
pub mod config;
pub mod report;
pub mod upload;

pub use api::{
    DocumentRequest, ErrorBody, ExportConfigRequest, ExportConfigResponse, FormatResult,
    ImportConfigRequest, ImportConfigResponse, Template, TemplateCatalog, UploadResult,
};
pub use config::{FormatConfig, Margin};
pub use report::{CheckItem, CheckReport};
pub use upload::{has_docx_extension, DOCX_MIME, MAX_UPLOAD_BYTES};
