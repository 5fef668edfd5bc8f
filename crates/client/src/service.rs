//! Trait seam over the job service's HTTP contract.
//!
//! The submitter, poller, and controller talk to the service through
//! [`JobService`] rather than [`ClipsApi`](crate::api::ClipsApi)
//! directly, so tests can script the service in memory and the
//! components never care which transport is behind the seam.

use async_trait::async_trait;

use mindshorts_core::job::Job;
use mindshorts_core::upload::UploadCandidate;

use crate::api::{ApiError, ClipsApi, SubmitResponse};

/// The three operations the client components need from the service.
#[async_trait]
pub trait JobService: Send + Sync {
    /// Submit a video, producing the new job's identifier.
    async fn submit_video(&self, candidate: &UploadCandidate)
        -> Result<SubmitResponse, ApiError>;

    /// Fetch the current snapshot of one job.
    async fn fetch_job(&self, job_id: &str) -> Result<Job, ApiError>;

    /// Fetch the most recent jobs, newest first, bounded by `limit`.
    async fn list_jobs(&self, limit: usize) -> Result<Vec<Job>, ApiError>;
}

#[async_trait]
impl JobService for ClipsApi {
    async fn submit_video(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<SubmitResponse, ApiError> {
        ClipsApi::submit_video(self, candidate).await
    }

    async fn fetch_job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.get_job(job_id).await
    }

    async fn list_jobs(&self, limit: usize) -> Result<Vec<Job>, ApiError> {
        ClipsApi::list_jobs(self, limit).await
    }
}
