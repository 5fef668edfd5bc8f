//! Upload candidate validation.
//!
//! A candidate is accepted when its declared MIME type is on the
//! allow-list **or** its file name carries a known video extension.
//! Either alone suffices: browsers and filesystems report MIME types
//! inconsistently across platforms, so the policy is deliberately
//! permissive. The service performs its own authoritative checks.

use crate::error::CoreError;

/// MIME types accepted for upload.
pub const ALLOWED_VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
];

/// File extensions accepted for upload (matched case-insensitively).
pub const ALLOWED_VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".mkv", ".webm"];

/// User-facing message for a rejected candidate.
pub const INVALID_VIDEO_MESSAGE: &str =
    "Please upload a valid video file (MP4, MOV, AVI, MKV, WEBM)";

/// A local file staged for submission.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// File name as presented to the service (multipart `file` part).
    pub file_name: String,
    /// Declared MIME type, if the caller knows one.
    pub mime_type: Option<String>,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl UploadCandidate {
    /// Create a candidate, inferring the MIME type from the file name
    /// when the caller does not provide one.
    pub fn new(
        file_name: impl Into<String>,
        mime_type: Option<String>,
        data: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type.or_else(|| {
            mime_for_file_name(&file_name).map(str::to_string)
        });
        Self {
            file_name,
            mime_type,
            data,
        }
    }
}

/// Returns `true` if the name/MIME pair passes the upload allow-lists.
pub fn is_supported_video(file_name: &str, mime_type: Option<&str>) -> bool {
    let mime_ok = mime_type.is_some_and(|m| {
        ALLOWED_VIDEO_MIME_TYPES
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(m))
    });

    let name = file_name.to_ascii_lowercase();
    let ext_ok = ALLOWED_VIDEO_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(ext));

    mime_ok || ext_ok
}

/// Validate a staged upload, rejecting unsupported file types with the
/// user-facing message.
pub fn validate_upload(candidate: &UploadCandidate) -> Result<(), CoreError> {
    if is_supported_video(&candidate.file_name, candidate.mime_type.as_deref()) {
        Ok(())
    } else {
        Err(CoreError::Validation(INVALID_VIDEO_MESSAGE.to_string()))
    }
}

/// Infer a MIME type from a file name's extension.
///
/// Returns `None` for extensions outside the upload allow-list.
pub fn mime_for_file_name(file_name: &str) -> Option<&'static str> {
    let name = file_name.to_ascii_lowercase();
    if name.ends_with(".mp4") {
        Some("video/mp4")
    } else if name.ends_with(".mov") {
        Some("video/quicktime")
    } else if name.ends_with(".avi") {
        Some("video/x-msvideo")
    } else if name.ends_with(".mkv") {
        Some("video/x-matroska")
    } else if name.ends_with(".webm") {
        Some("video/webm")
    } else {
        None
    }
}
