//! Domain types for the MindShorts client.
//!
//! Pure data and validation -- no I/O. The HTTP layer and the polling
//! machinery live in `mindshorts-client`.

pub mod error;
pub mod job;
pub mod types;
pub mod upload;

pub use error::CoreError;
pub use job::{Clip, Job, JobStatus, Progress};
pub use upload::UploadCandidate;
