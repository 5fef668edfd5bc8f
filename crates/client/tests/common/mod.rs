//! Shared in-memory job service for integration scenarios.
//!
//! Scripts the HTTP contract: one submission outcome, per-job fetch
//! scripts, and a queue of list responses. Counters record how often
//! each operation was actually hit.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::AtomicUsize;
use std::sync::Mutex;

use async_trait::async_trait;

use mindshorts_client::api::{ApiError, SubmitResponse};
use mindshorts_client::service::JobService;
use mindshorts_core::job::{Clip, Job, JobStatus, Progress};
use mindshorts_core::upload::UploadCandidate;

pub struct ScriptedService {
    submit_result: Mutex<Option<Result<SubmitResponse, ApiError>>>,
    fetch_scripts: Mutex<HashMap<String, VecDeque<Job>>>,
    list_responses: Mutex<VecDeque<Result<Vec<Job>, ApiError>>>,
    pub submit_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            submit_result: Mutex::new(None),
            fetch_scripts: Mutex::new(HashMap::new()),
            list_responses: Mutex::new(VecDeque::new()),
            submit_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Script the next submission to succeed with `job_id`.
    pub fn accept_submission(&self, job_id: &str) {
        *self.submit_result.lock().unwrap() = Some(Ok(SubmitResponse {
            job_id: job_id.to_string(),
        }));
    }

    /// Script the successive snapshots `fetch_job` returns for one job.
    pub fn script_fetches(&self, job_id: &str, snapshots: Vec<Job>) {
        self.fetch_scripts
            .lock()
            .unwrap()
            .insert(job_id.to_string(), snapshots.into());
    }

    /// Queue one response for the next `list_jobs` call.
    pub fn push_list(&self, response: Result<Vec<Job>, ApiError>) {
        self.list_responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl JobService for ScriptedService {
    async fn submit_video(
        &self,
        _candidate: &UploadCandidate,
    ) -> Result<SubmitResponse, ApiError> {
        self.submit_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.submit_result
            .lock()
            .unwrap()
            .take()
            .expect("no submission scripted")
    }

    async fn fetch_job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.fetch_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let mut scripts = self.fetch_scripts.lock().unwrap();
        match scripts.get_mut(job_id).and_then(VecDeque::pop_front) {
            Some(job) => Ok(job),
            None => Err(ApiError::Api {
                status: 404,
                detail: format!("Job {job_id} not found"),
            }),
        }
    }

    async fn list_jobs(&self, _limit: usize) -> Result<Vec<Job>, ApiError> {
        self.list_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.list_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

/// Build a clipless job snapshot.
pub fn job(id: &str, status: JobStatus, progress: &str) -> Job {
    Job {
        job_id: id.to_string(),
        status,
        progress: Progress::Text(progress.to_string()),
        created_at: chrono::Utc::now(),
        completed_at: status.is_terminal().then(chrono::Utc::now),
        error: None,
        clips: vec![],
    }
}

/// Build a completed job carrying the given clips.
pub fn completed_job(id: &str, clips: Vec<Clip>) -> Job {
    Job {
        clips,
        ..job(id, JobStatus::Completed, "Done")
    }
}

/// Build a clip whose download URL follows the service's path scheme.
pub fn clip(job_id: &str, clip_id: &str, title: &str, viral_score: f64) -> Clip {
    Clip {
        clip_id: clip_id.to_string(),
        title: title.to_string(),
        duration: 28.5,
        viral_score,
        file_name: format!("{clip_id}.mp4"),
        download_url: format!("/api/v1/jobs/{job_id}/clips/{clip_id}/download"),
    }
}
