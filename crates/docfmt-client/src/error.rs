use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Only .docx files are supported")]
    UnsupportedFileType { name: String },

    #[error("File exceeds the 20 MB limit")]
    FileTooLarge { size: u64 },

    #[error("Please upload a file first")]
    NoDocument,

    #[error("No file to download")]
    NothingToDownload,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// Non-2xx response; `message` is the body's `error` field when present
    #[error("{}", describe_backend(.status, .message))]
    Backend { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_backend(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("server returned HTTP {}", status),
    }
}

impl ClientError {
    /// True for failures detected before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::UnsupportedFileType { .. }
                | ClientError::FileTooLarge { .. }
                | ClientError::NoDocument
                | ClientError::NothingToDownload
                | ClientError::UnknownTemplate(_)
        )
    }

    /// Message shown to the user, with `fallback` for bodiless backend errors
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Backend { message: None, .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_prefers_body() {
        let err = ClientError::Backend {
            status: 400,
            message: Some("bad file".to_string()),
        };
        assert_eq!(err.to_string(), "bad file");
        assert_eq!(err.user_message("check failed"), "bad file");
        assert!(!err.is_local());
    }

    #[test]
    fn test_backend_without_body_uses_fallback() {
        let err = ClientError::Backend {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "server returned HTTP 502");
        assert_eq!(err.user_message("check failed"), "check failed");
    }

    #[test]
    fn test_local_errors() {
        assert!(ClientError::NoDocument.is_local());
        assert!(ClientError::FileTooLarge { size: 1 }.is_local());
    }
}
