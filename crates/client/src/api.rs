//! REST API client for the clip-extraction service.
//!
//! Wraps the service's HTTP endpoints (video submission, job retrieval,
//! job listing, clip download) using [`reqwest`].

use serde::Deserialize;

use mindshorts_core::job::{Clip, Job};
use mindshorts_core::upload::UploadCandidate;

/// Default service origin when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client-side timeout applied to every request.
///
/// The service contract mandates no timeout; this bounds worst-case
/// staleness when the network wedges.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// HTTP client for a single clip-extraction service.
pub struct ClipsApi {
    client: reqwest::Client,
    base_url: String,
}

/// Response returned by `POST /api/v1/jobs` after a video is accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned identifier for the new job.
    pub job_id: String,
}

/// Error body the service returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Service error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The service's `detail` field, or the raw body when the
        /// error response is not the documented JSON shape.
        detail: String,
    },
}

impl ClipsApi {
    /// Create a new API client for a service origin.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The configured service origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a video for clip extraction.
    ///
    /// Sends a `POST /api/v1/jobs` multipart request with the file in
    /// the `file` field. Returns the server-assigned `job_id`.
    pub async fn submit_video(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<SubmitResponse, ApiError> {
        let mut part = reqwest::multipart::Part::bytes(candidate.data.clone())
            .file_name(candidate.file_name.clone());
        if let Some(mime) = &candidate.mime_type {
            part = part.mime_str(mime)?;
        }
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/api/v1/jobs", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the current snapshot of a single job.
    ///
    /// Sends a `GET /api/v1/jobs/{job_id}` request.
    pub async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs/{}", self.base_url, job_id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the most recent jobs, newest first, bounded by `limit`.
    ///
    /// Sends a `GET /api/v1/jobs?limit=N` request.
    pub async fn list_jobs(&self, limit: usize) -> Result<Vec<Job>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v1/jobs", self.base_url))
            .query(&[("limit", limit)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Download a clip's binary contents.
    ///
    /// The clip's relative `download_url` is resolved against the
    /// configured origin before the request is made.
    pub async fn fetch_clip(&self, clip: &Clip) -> Result<Vec<u8>, ApiError> {
        let url = clip.resolve_download_url(&self.base_url);
        let response = self.client.get(url).timeout(REQUEST_TIMEOUT).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`] carrying
    /// the service's `detail` message on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Pull the `detail` field out of an error body, falling back to the
/// raw text when the body is not the documented JSON shape.
fn extract_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.detail,
        Err(_) => body.to_string(),
    }
}
