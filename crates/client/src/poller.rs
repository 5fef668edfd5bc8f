//! Fixed-cadence job polling.
//!
//! [`JobPoller`] owns one background task that fetches a job's state
//! every [`POLL_INTERVAL`] until the job reaches a terminal status,
//! publishing each snapshot through a [`tokio::sync::watch`] channel.
//! The task is tied to a [`CancellationToken`]: dropping or stopping
//! the poller cancels the pending timer synchronously, so no fetch can
//! fire after disposal. Fetches are strictly serialized by the loop
//! (sleep, fetch, apply), which rules out overlapping requests and
//! out-of-order snapshot application by construction.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use mindshorts_core::job::Job;

use crate::service::JobService;

/// Time between successive fetches of a tracked job.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(2);

/// Externally observable poller state.
///
/// A poller built from a terminal snapshot starts `Stopped` and never
/// polls; otherwise it starts `Polling` and becomes `Stopped` exactly
/// once, on terminal status or cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Polling,
    Stopped,
}

/// Tracks one job until it reaches a terminal status.
///
/// One poller per tracked job; tracking a different job means building
/// a new instance.
pub struct JobPoller {
    job_id: String,
    snapshot_rx: watch::Receiver<Option<Job>>,
    state_rx: watch::Receiver<PollerState>,
    cancel: CancellationToken,
    #[allow(dead_code)]
    task: Option<JoinHandle<()>>,
}

impl JobPoller {
    /// Start tracking from an initial snapshot.
    ///
    /// A snapshot that is already terminal produces a poller that is
    /// `Stopped` from birth and issues zero fetches -- there is nothing
    /// left to observe.
    pub fn for_job(service: Arc<dyn JobService>, job: Job) -> Self {
        let job_id = job.job_id.clone();
        let terminal = job.is_terminal();
        Self::start(service, job_id, Some(job), terminal)
    }

    /// Start tracking from a bare job identifier.
    ///
    /// The status is unknown, so polling begins immediately; the first
    /// fetched snapshot settles whether there is anything to track.
    pub fn for_job_id(service: Arc<dyn JobService>, job_id: impl Into<String>) -> Self {
        Self::start(service, job_id.into(), None, false)
    }

    fn start(
        service: Arc<dyn JobService>,
        job_id: String,
        seed: Option<Job>,
        terminal: bool,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(seed);
        let cancel = CancellationToken::new();

        if terminal {
            let (_state_tx, state_rx) = watch::channel(PollerState::Stopped);
            return Self {
                job_id,
                snapshot_rx,
                state_rx,
                cancel,
                task: None,
            };
        }

        let (state_tx, state_rx) = watch::channel(PollerState::Polling);
        let token = cancel.clone();
        let id = job_id.clone();
        let task = tokio::spawn(async move {
            poll_loop(service, id, snapshot_tx, state_tx, token).await;
        });

        Self {
            job_id,
            snapshot_rx,
            state_rx,
            cancel,
            task: Some(task),
        }
    }

    /// Identifier of the tracked job.
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Current poller state.
    pub fn state(&self) -> PollerState {
        *self.state_rx.borrow()
    }

    /// The most recently applied snapshot.
    ///
    /// `None` only for a poller built from a bare id that has not yet
    /// completed its first fetch.
    pub fn latest(&self) -> Option<Job> {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    ///
    /// The channel closes once the poller stops, which consumers can
    /// use as the end-of-stream signal.
    pub fn subscribe(&self) -> watch::Receiver<Option<Job>> {
        self.snapshot_rx.clone()
    }

    /// Wait until the poller reaches `Stopped` (terminal status seen or
    /// cancelled).
    pub async fn wait_until_stopped(&self) {
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx.wait_for(|s| *s == PollerState::Stopped).await;
    }

    /// Stop polling. Cancels the pending timer synchronously; the
    /// background task winds down without issuing another fetch.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        // A timer firing after disposal would poke a retired consumer.
        self.cancel.cancel();
    }
}

/// One tracked job's poll loop: sleep a cadence, fetch once, apply.
///
/// Fetch errors are logged and swallowed -- the service is the sole
/// source of truth and a single missed poll is immaterial. The loop
/// exits on the first terminal snapshot or on cancellation, publishing
/// `Stopped` either way.
async fn poll_loop(
    service: Arc<dyn JobService>,
    job_id: String,
    snapshot_tx: watch::Sender<Option<Job>>,
    state_tx: watch::Sender<PollerState>,
    cancel: CancellationToken,
) {
    loop {
        // `biased` puts cancellation ahead of the timer, so a poller
        // disposed during the sleep can never race into a fetch.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = service.fetch_job(&job_id) => match result {
                Ok(job) => {
                    let terminal = job.is_terminal();
                    snapshot_tx.send_replace(Some(job));
                    if terminal {
                        tracing::info!(job_id = %job_id, "Job reached terminal status; polling stopped");
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "Job poll failed; retrying next tick");
                }
            },
        }
    }

    state_tx.send_replace(PollerState::Stopped);
}
