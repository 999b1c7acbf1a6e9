//! Resume file intake: plain text is read as text, everything else is
//! carried to the analyzer as base64 with its MIME type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::models::resume::{FileData, ResumeSource};

pub const TEXT_PLAIN: &str = "text/plain";
const OCTET_STREAM: &str = "application/octet-stream";

/// Turns an uploaded file into a resume source.
///
/// The declared content type wins; a missing or generic one falls back to
/// the file extension.
pub fn read_resume_file(filename: &str, declared_mime: Option<&str>, bytes: &[u8]) -> ResumeSource {
    let mime_type = resolve_mime(filename, declared_mime);

    if mime_type == TEXT_PLAIN {
        ResumeSource::Text(String::from_utf8_lossy(bytes).into_owned())
    } else {
        ResumeSource::File(FileData {
            data: STANDARD.encode(bytes),
            mime_type,
            name: filename.to_string(),
        })
    }
}

fn resolve_mime(filename: &str, declared_mime: Option<&str>) -> String {
    // drop parameters such as "; charset=utf-8"
    let declared = declared_mime
        .and_then(|m| m.split(';').next())
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != OCTET_STREAM);

    declared.unwrap_or_else(|| mime_for_filename(filename).to_string())
}

fn mime_for_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => TEXT_PLAIN,
        "md" => "text/markdown",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => OCTET_STREAM,
    }
}
