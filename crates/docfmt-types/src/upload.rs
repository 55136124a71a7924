/// Largest accepted upload, 20 MiB
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// True if the text after the last `.` is `docx` (any case).
///
/// A bare `.docx` counts, matching what the backend accepts.
pub fn has_docx_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("docx"))
}
