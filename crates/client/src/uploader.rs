//! Upload submission.
//!
//! [`UploadSubmitter`] stages one validated video file and submits it
//! to the service. Validation never touches the network; a staged file
//! is consumed by a successful submit and kept for manual retry on
//! failure. No retry happens inside the component.

use std::sync::Arc;

use mindshorts_core::upload::{validate_upload, UploadCandidate};
use mindshorts_core::CoreError;

use crate::api::ApiError;
use crate::service::JobService;

/// User-facing message when submit is called with nothing staged.
pub const NO_FILE_MESSAGE: &str = "Please select a file";

/// Stages and submits one video file at a time.
pub struct UploadSubmitter {
    service: Arc<dyn JobService>,
    staged: Option<UploadCandidate>,
}

/// Errors surfaced by the upload path.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Rejected locally before any network call; recoverable by
    /// choosing another file.
    #[error("{0}")]
    Validation(String),

    /// The service rejected the upload; the message is the service's
    /// `detail` field verbatim.
    #[error("{0}")]
    Submission(String),

    /// Transport failure with no structured detail from the service.
    #[error("Upload failed. Please try again.")]
    Network(#[source] ApiError),
}

impl UploadSubmitter {
    pub fn new(service: Arc<dyn JobService>) -> Self {
        Self {
            service,
            staged: None,
        }
    }

    /// The currently staged file, if any.
    pub fn staged_file(&self) -> Option<&UploadCandidate> {
        self.staged.as_ref()
    }

    /// Validate a candidate and stage it for submission.
    ///
    /// A rejected candidate clears any previously staged file, so a bad
    /// pick never silently submits an older one.
    pub fn select_file(&mut self, candidate: UploadCandidate) -> Result<(), UploadError> {
        match validate_upload(&candidate) {
            Ok(()) => {
                self.staged = Some(candidate);
                Ok(())
            }
            Err(CoreError::Validation(message)) => {
                self.staged = None;
                Err(UploadError::Validation(message))
            }
        }
    }

    /// Discard the staged file without submitting.
    pub fn clear(&mut self) {
        self.staged = None;
    }

    /// Submit the staged file, returning the new job's identifier.
    ///
    /// Success consumes the staged file; the caller must select a new
    /// one to submit again. Failure leaves it staged so the user can
    /// retry manually.
    pub async fn submit(&mut self) -> Result<String, UploadError> {
        let candidate = self
            .staged
            .as_ref()
            .ok_or_else(|| UploadError::Validation(NO_FILE_MESSAGE.to_string()))?;

        match self.service.submit_video(candidate).await {
            Ok(response) => {
                tracing::info!(
                    job_id = %response.job_id,
                    file_name = %candidate.file_name,
                    "Video submitted",
                );
                self.staged = None;
                Ok(response.job_id)
            }
            Err(ApiError::Api { status, detail }) => {
                tracing::warn!(status, detail = %detail, "Upload rejected by service");
                Err(UploadError::Submission(detail))
            }
            Err(err) => {
                tracing::warn!(error = %err, "Upload transport failure");
                Err(UploadError::Network(err))
            }
        }
    }
}
