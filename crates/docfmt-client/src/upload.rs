use std::path::Path;

use docfmt_types::{has_docx_extension, MAX_UPLOAD_BYTES};

use crate::error::ClientError;

/// A document picked by the user, held in memory until uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    name: String,
    contents: Vec<u8>,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, contents: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            contents,
        }
    }

    /// Load a file from disk, keeping only its file name.
    ///
    /// The name and the on-disk size are validated before any contents are
    /// read, so a wrong or oversized file is rejected without loading it.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !has_docx_extension(&name) {
            return Err(ClientError::UnsupportedFileType { name });
        }

        let size = tokio::fs::metadata(path).await?.len();
        validate_upload(&name, size)?;

        let contents = tokio::fs::read(path).await?;
        Ok(Self::new(name, contents))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// Checks made before any upload request is sent
pub fn validate_upload(name: &str, size: u64) -> Result<(), ClientError> {
    if !has_docx_extension(name) {
        return Err(ClientError::UnsupportedFileType {
            name: name.to_string(),
        });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ClientError::FileTooLarge { size });
    }
    Ok(())
}
