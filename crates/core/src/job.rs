//! Job and clip snapshot types.
//!
//! The processing service owns every job; the client only ever holds an
//! immutable snapshot per fetch and replaces it wholesale with the next
//! one. Status is a closed enum -- a snapshot carrying a status outside
//! the known lattice is a decode error, not something to limp along with.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Lifecycle state of a processing job.
///
/// Transitions are monotonic: `pending -> processing -> {completed, failed}`.
/// Once terminal, a job's status never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// `true` for `completed` and `failed` -- no further transitions occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// The wire-format name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Work-completed indicator reported by the service.
///
/// The service emits either a human-readable phrase or a bare number;
/// the semantics stay opaque to the client, which only renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Progress {
    Value(f64),
    Text(String),
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Progress::Value(v) => write!(f, "{v}"),
            Progress::Text(t) => f.write_str(t),
        }
    }
}

/// One server-tracked unit of video-to-clips processing work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Opaque identifier assigned by the service at creation, never reused.
    pub job_id: String,

    pub status: JobStatus,

    pub progress: Progress,

    /// Set once at creation (UTC).
    pub created_at: Timestamp,

    /// Set exactly once, when the job reaches a terminal status.
    pub completed_at: Option<Timestamp>,

    /// Human-readable diagnostic, present only on failed jobs.
    pub error: Option<String>,

    /// Extracted clips; populated only for completed jobs. Absent on the
    /// wire and empty are the same state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clips: Vec<Clip>,
}

impl Job {
    /// `true` once the job has reached `completed` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// One extracted short video segment with a viral-worthiness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique within its job.
    pub clip_id: String,

    pub title: String,

    /// Length in seconds, non-negative.
    pub duration: f64,

    /// Expected range 0-10, but not contractually bounded -- render
    /// whatever the service reports.
    pub viral_score: f64,

    pub file_name: String,

    /// Path relative to the service origin. Resolve with
    /// [`Clip::resolve_download_url`] before use.
    pub download_url: String,
}

impl Clip {
    /// Resolve the relative `download_url` against the service origin.
    ///
    /// Normalizes the joining slash so `http://host/` + `/clips/a.mp4`
    /// and `http://host` + `clips/a.mp4` produce the same URL.
    pub fn resolve_download_url(&self, origin: &str) -> String {
        let origin = origin.trim_end_matches('/');
        let path = self.download_url.trim_start_matches('/');
        format!("{origin}/{path}")
    }
}
