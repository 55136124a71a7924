//! Request/response flows driven by user actions
//!
//! Each flow notifies the user of its outcome, updates the session on
//! success and returns the result so a front end can render it. Failures
//! are never retried and never fatal.

use docfmt_types::{CheckReport, FormatConfig, FormatResult};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::ClientError;
use crate::notify::Notifier;
use crate::session::Session;
use crate::upload::{validate_upload, LocalFile};

/// Default name offered when saving an exported configuration
pub const EXPORT_FILE_NAME: &str = "format-config.json";

/// Shown after "`action` failed:" when the error response had no message
const NO_DETAILS: &str = "server returned no details";

/// A formatted document fetched from the backend
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub filename: String,
    pub contents: Vec<u8>,
}

pub struct Flows<B, N> {
    backend: B,
    notifier: N,
}

impl<B: Backend, N: Notifier> Flows<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        Self { backend, notifier }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Report a failure as "`action` failed: message"
    fn fail<T>(&self, action: &str, err: ClientError) -> Result<T, ClientError> {
        self.notifier
            .error(&format!("{} failed: {}", action, err.user_message(NO_DETAILS)));
        Err(err)
    }

    /// Report a precondition that stopped a flow before any request
    fn refuse<T>(&self, err: ClientError) -> Result<T, ClientError> {
        self.notifier.error(&err.to_string());
        Err(err)
    }

    /// Fetch the template list and activate the default template.
    ///
    /// Failures are logged only; the session keeps its current configuration.
    pub async fn load_templates(&self, session: &mut Session) -> Result<(), ClientError> {
        let catalog = match self.backend.templates().await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!("failed to load templates: {}", err);
                return Err(err);
            }
        };

        debug!("loaded {} templates", catalog.templates.len());
        session.templates = catalog.templates;
        session.default_template = Some(catalog.default.clone());
        if !session.select_template(&catalog.default) {
            warn!("default template {:?} is not in the list", catalog.default);
        }
        Ok(())
    }

    pub fn select_template(&self, session: &mut Session, name: &str) -> Result<(), ClientError> {
        if session.select_template(name) {
            debug!("selected template {}", name);
            Ok(())
        } else {
            self.refuse(ClientError::UnknownTemplate(name.to_string()))
        }
    }

    /// Validate locally, then upload and remember the returned identifier
    pub async fn upload(
        &self,
        session: &mut Session,
        file: LocalFile,
    ) -> Result<String, ClientError> {
        if let Err(err) = validate_upload(file.name(), file.size()) {
            return self.refuse(err);
        }

        self.notifier.info("Uploading file...");
        session.clear_file();

        match self.backend.upload(&file).await {
            Ok(uploaded) => {
                debug!("uploaded {} as {}", file.name(), uploaded.file_id);
                session.file = Some(file);
                session.file_id = Some(uploaded.file_id.clone());
                self.notifier.success("File uploaded");
                Ok(uploaded.file_id)
            }
            Err(err) => {
                session.clear_file();
                self.fail("Upload", err)
            }
        }
    }

    pub fn remove_file(&self, session: &mut Session) {
        session.clear_file();
    }

    pub async fn check(&self, session: &mut Session) -> Result<CheckReport, ClientError> {
        let Some(file_id) = session.file_id.clone() else {
            return self.refuse(ClientError::NoDocument);
        };

        let config = session.effective_config();
        match self.backend.check(&file_id, &config).await {
            Ok(report) => {
                session.report = Some(report.clone());
                self.notifier.success("Format check complete");
                Ok(report)
            }
            Err(err) => self.fail("Check", err),
        }
    }

    pub async fn format(&self, session: &mut Session) -> Result<FormatResult, ClientError> {
        let Some(file_id) = session.file_id.clone() else {
            return self.refuse(ClientError::NoDocument);
        };

        let config = session.effective_config();
        match self.backend.format(&file_id, &config).await {
            Ok(result) => {
                session.formatted = Some(result.clone());
                self.notifier.success("Formatting complete");
                Ok(result)
            }
            Err(err) => self.fail("Formatting", err),
        }
    }

    /// Where the formatted document can be fetched
    pub fn download_url(&self, session: &Session) -> Result<String, ClientError> {
        match &session.formatted {
            Some(result) => Ok(self.backend.download_url(&result.formatted_file_id)),
            None => self.refuse(ClientError::NothingToDownload),
        }
    }

    pub async fn download(&self, session: &Session) -> Result<DownloadedFile, ClientError> {
        let Some(result) = &session.formatted else {
            return self.refuse(ClientError::NothingToDownload);
        };

        self.notifier.info("Downloading...");
        match self.backend.download(&result.formatted_file_id).await {
            Ok(contents) => Ok(DownloadedFile {
                filename: result.filename.clone(),
                contents,
            }),
            Err(err) => self.fail("Download", err),
        }
    }

    /// Canonical JSON text of the effective configuration
    pub async fn export_config(&self, session: &Session) -> Result<String, ClientError> {
        let config = session.effective_config();
        match self.backend.export_config(&config).await {
            Ok(text) => {
                self.notifier.success("Configuration exported");
                Ok(text)
            }
            Err(err) => self.fail("Export", err),
        }
    }

    /// Send a configuration file and adopt the canonical result
    pub async fn import_config(
        &self,
        session: &mut Session,
        config_json: &str,
    ) -> Result<FormatConfig, ClientError> {
        match self.backend.import_config(config_json).await {
            Ok(config) => {
                session.config = config.clone();
                self.notifier.success("Configuration imported");
                Ok(config)
            }
            Err(err) => self.fail("Import", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLevel;
    use async_trait::async_trait;
    use docfmt_types::{CheckItem, Margin, Template, TemplateCatalog, UploadResult};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Records calls and answers from canned results
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<(String, Value)>>,
        upload_error: Option<String>,
        check_error: Option<Option<String>>,
        report: Option<CheckReport>,
    }

    impl FakeBackend {
        fn record(&self, call: &str, payload: Value) {
            self.calls.lock().unwrap().push((call.to_string(), payload));
        }

        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }

        fn call_names(&self) -> Vec<String> {
            self.calls().into_iter().map(|(name, _)| name).collect()
        }
    }

    fn backend_error(message: Option<String>) -> ClientError {
        ClientError::Backend {
            status: 400,
            message,
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn upload(&self, file: &LocalFile) -> Result<UploadResult, ClientError> {
            self.record("upload", json!(file.name()));
            match &self.upload_error {
                Some(message) => Err(backend_error(Some(message.clone()))),
                None => Ok(UploadResult {
                    file_id: "abc".to_string(),
                    filename: Some(file.name().to_string()),
                    size: Some(file.size()),
                }),
            }
        }

        async fn templates(&self) -> Result<TemplateCatalog, ClientError> {
            self.record("templates", Value::Null);
            Ok(TemplateCatalog {
                templates: vec![
                    Template {
                        name: "GB Standard".to_string(),
                        description: String::new(),
                        config: serde_json::from_value(json!({
                            "page_settings": { "top_margin": 2.5 },
                            "body": { "line_spacing": 1.5 }
                        }))
                        .unwrap(),
                    },
                    Template {
                        name: "Liberal Arts".to_string(),
                        description: String::new(),
                        config: serde_json::from_value(json!({
                            "body": { "line_spacing": 2.0 }
                        }))
                        .unwrap(),
                    },
                ],
                default: "GB Standard".to_string(),
            })
        }

        async fn check(
            &self,
            file_id: &str,
            config: &FormatConfig,
        ) -> Result<CheckReport, ClientError> {
            self.record("check", json!({ "file_id": file_id, "format_config": config }));
            if let Some(message) = &self.check_error {
                return Err(backend_error(message.clone()));
            }
            Ok(self
                .report
                .clone()
                .unwrap_or_else(|| CheckReport::from_items(Vec::new())))
        }

        async fn format(
            &self,
            file_id: &str,
            config: &FormatConfig,
        ) -> Result<FormatResult, ClientError> {
            self.record("format", json!({ "file_id": file_id, "format_config": config }));
            Ok(FormatResult {
                formatted_file_id: "fmt-1".to_string(),
                filename: "paper_formatted.docx".to_string(),
                message: None,
            })
        }

        fn download_url(&self, formatted_file_id: &str) -> String {
            format!("/api/download/{}", formatted_file_id)
        }

        async fn download(&self, formatted_file_id: &str) -> Result<Vec<u8>, ClientError> {
            self.record("download", json!(formatted_file_id));
            Ok(b"PK".to_vec())
        }

        async fn export_config(&self, config: &FormatConfig) -> Result<String, ClientError> {
            self.record("export", json!(config));
            serde_json::to_string_pretty(config)
                .map_err(|e| backend_error(Some(e.to_string())))
        }

        async fn import_config(&self, config_json: &str) -> Result<FormatConfig, ClientError> {
            self.record("import", json!(config_json));
            serde_json::from_str(config_json).map_err(|e| backend_error(Some(e.to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, level: NoticeLevel, message: &str) {
            self.notices.lock().unwrap().push((level, message.to_string()));
        }
    }

    impl RecordingNotifier {
        fn last(&self) -> Option<(NoticeLevel, String)> {
            self.notices.lock().unwrap().last().cloned()
        }

        fn count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }
    }

    fn flows(backend: FakeBackend) -> Flows<FakeBackend, RecordingNotifier> {
        Flows::new(backend, RecordingNotifier::default())
    }

    fn docx(size: usize) -> LocalFile {
        LocalFile::new("paper.docx", vec![0; size])
    }

    fn item(category: &str, passed: bool) -> CheckItem {
        CheckItem {
            category: category.to_string(),
            name: "Font size".to_string(),
            passed,
            current: "12pt".to_string(),
            expected: "12pt".to_string(),
            suggestion: None,
        }
    }

    async fn uploaded(flows: &Flows<FakeBackend, RecordingNotifier>) -> Session {
        let mut session = Session::new();
        flows.upload(&mut session, docx(16)).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_pdf_rejected_without_network() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();

        let err = flows
            .upload(&mut session, LocalFile::new("x.pdf", vec![1, 2, 3]))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::UnsupportedFileType { .. }));
        assert!(flows.backend().calls().is_empty());
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Error, "Only .docx files are supported".to_string()))
        );
        assert!(!session.has_document());
    }

    #[tokio::test]
    async fn test_oversized_file_rejected_without_network() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();

        let err = flows
            .upload(&mut session, docx(21 * 1024 * 1024))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::FileTooLarge { .. }));
        assert!(flows.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_then_check_and_format_carry_file_id() {
        let flows = flows(FakeBackend::default());
        let mut session = uploaded(&flows).await;
        assert_eq!(session.file_id.as_deref(), Some("abc"));
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Success, "File uploaded".to_string()))
        );

        flows.check(&mut session).await.unwrap();
        flows.format(&mut session).await.unwrap();

        let calls = flows.backend().calls();
        assert_eq!(calls[1].0, "check");
        assert_eq!(calls[1].1["file_id"], json!("abc"));
        assert_eq!(calls[2].0, "format");
        assert_eq!(calls[2].1["file_id"], json!("abc"));
        assert!(session.can_download());
    }

    #[tokio::test]
    async fn test_upload_failure_resets_session() {
        let flows = flows(FakeBackend {
            upload_error: Some("disk full".to_string()),
            ..FakeBackend::default()
        });
        let mut session = Session::new();
        session.file_id = Some("old".to_string());

        let err = flows.upload(&mut session, docx(8)).await.unwrap_err();
        assert!(!err.is_local());
        assert!(!session.has_document());
        assert!(session.file.is_none());
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Error, "Upload failed: disk full".to_string()))
        );
    }

    #[tokio::test]
    async fn test_check_without_upload_makes_no_call() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();

        let err = flows.check(&mut session).await.unwrap_err();
        assert!(matches!(err, ClientError::NoDocument));
        let err = flows.format(&mut session).await.unwrap_err();
        assert!(matches!(err, ClientError::NoDocument));

        assert!(flows.backend().calls().is_empty());
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Error, "Please upload a file first".to_string()))
        );
    }

    #[tokio::test]
    async fn test_check_error_message_reaches_user() {
        let flows = flows(FakeBackend {
            check_error: Some(Some("bad file".to_string())),
            ..FakeBackend::default()
        });
        let mut session = uploaded(&flows).await;

        assert!(flows.check(&mut session).await.is_err());
        let (level, message) = flows.notifier().last().unwrap();
        assert_eq!(level, NoticeLevel::Error);
        assert!(message.contains("bad file"));
        assert!(session.report.is_none());
    }

    #[tokio::test]
    async fn test_check_error_without_body_uses_generic_message() {
        let flows = flows(FakeBackend {
            check_error: Some(None),
            ..FakeBackend::default()
        });
        let mut session = uploaded(&flows).await;

        assert!(flows.check(&mut session).await.is_err());
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Error, "Check failed: server returned no details".to_string()))
        );
    }

    #[tokio::test]
    async fn test_check_stores_report() {
        let report = CheckReport::from_items(vec![
            item("Page Settings", true),
            item("Body", false),
            item("Page Settings", false),
        ]);
        let flows = flows(FakeBackend {
            report: Some(report.clone()),
            ..FakeBackend::default()
        });
        let mut session = uploaded(&flows).await;

        let returned = flows.check(&mut session).await.unwrap();
        assert_eq!(returned, report);
        assert_eq!(session.report, Some(report));
    }

    #[tokio::test]
    async fn test_margin_overrides_reach_backend() {
        let flows = flows(FakeBackend::default());
        let mut session = uploaded(&flows).await;
        flows.load_templates(&mut session).await.unwrap();
        session.margins.set(Margin::Left, Some(3.5));

        flows.check(&mut session).await.unwrap();
        let (_, payload) = flows.backend().calls().pop().unwrap();
        assert_eq!(payload["format_config"]["page_settings"]["left_margin"], json!(3.5));
        assert_eq!(payload["format_config"]["page_settings"]["top_margin"], json!(2.5));
        assert_eq!(session.config.margin(Margin::Left), None);
    }

    #[tokio::test]
    async fn test_load_templates_activates_default() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();

        flows.load_templates(&mut session).await.unwrap();
        assert_eq!(session.templates.len(), 2);
        assert_eq!(session.default_template.as_deref(), Some("GB Standard"));
        assert_eq!(session.config.margin(Margin::Top), Some(2.5));
        assert_eq!(flows.notifier().count(), 0);

        flows.select_template(&mut session, "Liberal Arts").unwrap();
        assert_eq!(session.config.section("body").unwrap()["line_spacing"], json!(2.0));

        let err = flows.select_template(&mut session, "Nope").unwrap_err();
        assert!(matches!(err, ClientError::UnknownTemplate(_)));
    }

    #[tokio::test]
    async fn test_download_requires_formatted_file() {
        let flows = flows(FakeBackend::default());
        let mut session = uploaded(&flows).await;

        assert!(matches!(
            flows.download_url(&session),
            Err(ClientError::NothingToDownload)
        ));
        assert!(flows.download(&session).await.is_err());
        assert_eq!(flows.backend().call_names(), vec!["upload"]);
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Error, "No file to download".to_string()))
        );

        flows.format(&mut session).await.unwrap();
        assert_eq!(flows.download_url(&session).unwrap(), "/api/download/fmt-1");
        let file = flows.download(&session).await.unwrap();
        assert_eq!(file.filename, "paper_formatted.docx");
        assert_eq!(file.contents, b"PK".to_vec());
    }

    #[tokio::test]
    async fn test_remove_file_clears_results() {
        let flows = flows(FakeBackend::default());
        let mut session = uploaded(&flows).await;
        flows.check(&mut session).await.unwrap();
        flows.format(&mut session).await.unwrap();

        flows.remove_file(&mut session);
        assert!(session.file.is_none());
        assert!(session.file_id.is_none());
        assert!(session.report.is_none());
        assert!(session.formatted.is_none());
    }

    #[tokio::test]
    async fn test_export_then_import_is_equivalent() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();
        flows.load_templates(&mut session).await.unwrap();
        session.margins.set(Margin::Right, Some(2.0));
        let effective = session.effective_config();

        let text = flows.export_config(&session).await.unwrap();
        let imported = flows.import_config(&mut session, &text).await.unwrap();

        assert_eq!(imported, effective);
        assert_eq!(session.config, effective);
        assert_eq!(
            flows.notifier().last(),
            Some((NoticeLevel::Success, "Configuration imported".to_string()))
        );
    }

    #[tokio::test]
    async fn test_import_failure_keeps_config() {
        let flows = flows(FakeBackend::default());
        let mut session = Session::new();
        flows.load_templates(&mut session).await.unwrap();
        let before = session.config.clone();

        assert!(flows.import_config(&mut session, "{ nope").await.is_err());
        assert_eq!(session.config, before);
        let (level, message) = flows.notifier().last().unwrap();
        assert_eq!(level, NoticeLevel::Error);
        assert!(message.starts_with("Import failed: "));
    }
}
