//! Job list control and composition.
//!
//! [`JobListController`] owns the job list (replaced wholesale, never
//! patched in place), tracks which job is selected, and wires newly
//! created or selected jobs into a [`JobPoller`]. List refreshes fail
//! soft: an error keeps the previous list and raises a flag instead of
//! propagating.

use std::sync::Arc;

use mindshorts_core::job::Job;

use crate::poller::JobPoller;
use crate::service::JobService;

/// How many jobs a refresh asks for (service returns newest first).
pub const DEFAULT_JOB_LIST_LIMIT: usize = 20;

/// How long to wait after a successful submission before re-fetching
/// the list, so the service has registered the new job server-side.
/// A deliberate race mitigation, not a guarantee.
pub const CREATED_LIST_REFRESH_DELAY: std::time::Duration =
    std::time::Duration::from_millis(500);

/// Lists recent jobs and tracks the user's selection.
pub struct JobListController {
    service: Arc<dyn JobService>,
    jobs: Vec<Job>,
    selected_job_id: Option<String>,
    load_failed: bool,
    limit: usize,
}

impl JobListController {
    pub fn new(service: Arc<dyn JobService>) -> Self {
        Self {
            service,
            jobs: Vec::new(),
            selected_job_id: None,
            load_failed: false,
            limit: DEFAULT_JOB_LIST_LIMIT,
        }
    }

    /// Override the refresh limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The currently held job list, newest first.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// `true` when the most recent refresh failed and the held list is
    /// stale.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn selected_job_id(&self) -> Option<&str> {
        self.selected_job_id.as_deref()
    }

    /// Snapshot of the selected job, when it is present in the held
    /// list.
    pub fn selected_job(&self) -> Option<&Job> {
        let id = self.selected_job_id.as_deref()?;
        self.jobs.iter().find(|job| job.job_id == id)
    }

    /// Re-fetch the job list from the service.
    ///
    /// On success the list is replaced wholesale and, if nothing is
    /// selected yet, the newest job is auto-selected. On failure the
    /// previous list is kept and [`load_failed`](Self::load_failed)
    /// reports true.
    pub async fn refresh(&mut self) {
        match self.service.list_jobs(self.limit).await {
            Ok(jobs) => {
                self.jobs = jobs;
                self.load_failed = false;
                if self.selected_job_id.is_none() {
                    self.selected_job_id = self.jobs.first().map(|job| job.job_id.clone());
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Job list refresh failed; keeping previous list");
                self.load_failed = true;
            }
        }
    }

    /// Select the job whose detail is rendered. Does not fetch.
    pub fn select_job(&mut self, job_id: impl Into<String>) {
        self.selected_job_id = Some(job_id.into());
    }

    /// Success path of the upload submitter: select the new job
    /// immediately, then re-fetch the list after
    /// [`CREATED_LIST_REFRESH_DELAY`] so the list query does not miss a
    /// job the service is still registering.
    pub async fn on_job_created(&mut self, job_id: &str) {
        self.select_job(job_id);
        tokio::time::sleep(CREATED_LIST_REFRESH_DELAY).await;
        self.refresh().await;
    }

    /// Build a poller for the selected job.
    ///
    /// Uses the held snapshot when the list has one (a terminal
    /// snapshot then stops the poller immediately, saving a round
    /// trip); falls back to the bare id otherwise. Returns `None` when
    /// nothing is selected.
    pub fn start_poller(&self) -> Option<JobPoller> {
        let id = self.selected_job_id.as_ref()?;
        Some(match self.selected_job() {
            Some(job) => JobPoller::for_job(Arc::clone(&self.service), job.clone()),
            None => JobPoller::for_job_id(Arc::clone(&self.service), id.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use mindshorts_core::job::{JobStatus, Progress};
    use mindshorts_core::upload::UploadCandidate;

    use super::*;
    use crate::api::{ApiError, SubmitResponse};
    use crate::poller::PollerState;

    fn job(id: &str, status: JobStatus) -> Job {
        Job {
            job_id: id.to_string(),
            status,
            progress: Progress::Text("Queued".into()),
            created_at: chrono::Utc::now(),
            completed_at: None,
            error: None,
            clips: vec![],
        }
    }

    struct ScriptedLists {
        responses: Mutex<VecDeque<Result<Vec<Job>, ApiError>>>,
        list_calls: AtomicUsize,
        fetch_calls: AtomicUsize,
    }

    impl ScriptedLists {
        fn new(responses: Vec<Result<Vec<Job>, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                list_calls: AtomicUsize::new(0),
                fetch_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl JobService for ScriptedLists {
        async fn submit_video(
            &self,
            _candidate: &UploadCandidate,
        ) -> Result<SubmitResponse, ApiError> {
            unreachable!("controller never submits")
        }

        async fn fetch_job(&self, job_id: &str) -> Result<Job, ApiError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            Ok(job(job_id, JobStatus::Completed))
        }

        async fn list_jobs(&self, _limit: usize) -> Result<Vec<Job>, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(vec![]))
        }
    }

    #[tokio::test]
    async fn refresh_replaces_list_and_auto_selects_newest() {
        let service = ScriptedLists::new(vec![Ok(vec![
            job("newest", JobStatus::Processing),
            job("older", JobStatus::Completed),
        ])]);
        let mut controller = JobListController::new(service);

        controller.refresh().await;

        assert_eq!(controller.jobs().len(), 2);
        assert_eq!(controller.selected_job_id(), Some("newest"));
        assert!(!controller.load_failed());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_previous_list() {
        let service = ScriptedLists::new(vec![
            Ok(vec![job("j1", JobStatus::Processing)]),
            Err(ApiError::Api {
                status: 502,
                detail: "upstream down".into(),
            }),
            Ok(vec![job("j1", JobStatus::Completed)]),
        ]);
        let mut controller = JobListController::new(service);

        controller.refresh().await;
        assert_eq!(controller.jobs().len(), 1);

        controller.refresh().await;
        assert!(controller.load_failed(), "failure must be visible");
        assert_eq!(controller.jobs().len(), 1, "held list stays unchanged");
        assert_eq!(controller.jobs()[0].status, JobStatus::Processing);

        controller.refresh().await;
        assert!(!controller.load_failed(), "success clears the flag");
        assert_eq!(controller.jobs()[0].status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn select_job_does_not_fetch() {
        let service = ScriptedLists::new(vec![]);
        let mut controller = JobListController::new(service.clone());

        controller.select_job("abc123");

        assert_eq!(controller.selected_job_id(), Some("abc123"));
        assert_eq!(service.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn manual_selection_survives_refresh() {
        let service = ScriptedLists::new(vec![Ok(vec![
            job("newest", JobStatus::Pending),
            job("mine", JobStatus::Processing),
        ])]);
        let mut controller = JobListController::new(service);

        controller.select_job("mine");
        controller.refresh().await;

        assert_eq!(controller.selected_job_id(), Some("mine"));
        assert_eq!(controller.selected_job().unwrap().job_id, "mine");
    }

    #[tokio::test(start_paused = true)]
    async fn on_job_created_selects_immediately_and_refreshes_after_delay() {
        let service = ScriptedLists::new(vec![Ok(vec![job("abc123", JobStatus::Pending)])]);
        let mut controller = JobListController::new(service.clone());

        let started = tokio::time::Instant::now();
        controller.on_job_created("abc123").await;

        assert!(
            started.elapsed() >= CREATED_LIST_REFRESH_DELAY,
            "list refresh must wait out the registration delay"
        );
        assert_eq!(service.list_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.selected_job_id(), Some("abc123"));
        assert_eq!(controller.selected_job().unwrap().status, JobStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn start_poller_uses_held_snapshot_or_bare_id() {
        let service = ScriptedLists::new(vec![Ok(vec![job("listed", JobStatus::Processing)])]);
        let mut controller = JobListController::new(service.clone());

        assert!(controller.start_poller().is_none(), "nothing selected yet");

        controller.refresh().await;
        let poller = controller.start_poller().unwrap();
        assert_eq!(poller.job_id(), "listed");
        assert!(poller.latest().is_some(), "seeded from the held snapshot");
        drop(poller);

        controller.select_job("unlisted");
        let poller = controller.start_poller().unwrap();
        assert_eq!(poller.job_id(), "unlisted");
        assert!(poller.latest().is_none(), "bare id has no snapshot yet");
        assert_eq!(poller.state(), PollerState::Polling);
    }
}
