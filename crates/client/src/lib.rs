//! HTTP client library for the MindShorts clip-extraction service.
//!
//! Provides the typed REST wrapper, upload submission, fixed-cadence
//! job polling with clean cancellation, and the job-list controller
//! that composes them.

pub mod api;
pub mod controller;
pub mod poller;
pub mod service;
pub mod uploader;
