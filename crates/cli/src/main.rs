//! Terminal front end for the MindShorts clip-extraction service.
//!
//! Drives the client library end-to-end: submit a video, list recent
//! jobs, watch a job until it finishes, download a completed job's
//! clips.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mindshorts_client::api::{ClipsApi, DEFAULT_API_URL};
use mindshorts_client::controller::JobListController;
use mindshorts_client::poller::{JobPoller, PollerState};
use mindshorts_client::service::JobService;
use mindshorts_client::uploader::UploadSubmitter;
use mindshorts_core::job::{Job, JobStatus};
use mindshorts_core::upload::UploadCandidate;

const USAGE: &str = "usage: mindshorts <submit FILE | list | watch JOB_ID | download JOB_ID>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mindshorts_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("MINDSHORTS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    tracing::info!(%base_url, "Using clip service");
    let api = Arc::new(ClipsApi::new(base_url));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [cmd, path] if cmd == "submit" => submit(api, path).await,
        [cmd] if cmd == "list" => list(api).await,
        [cmd, job_id] if cmd == "watch" => watch(api, job_id).await,
        [cmd, job_id] if cmd == "download" => download(api, job_id).await,
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

/// Upload a video, then track the new job to completion.
async fn submit(api: Arc<ClipsApi>, path: &str) -> Result<()> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {path}"))?;
    let file_name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .context("file name is not valid UTF-8")?
        .to_string();

    let service: Arc<dyn JobService> = api.clone();
    let mut submitter = UploadSubmitter::new(Arc::clone(&service));
    submitter.select_file(UploadCandidate::new(file_name, None, data))?;
    let job_id = submitter.submit().await?;
    println!("Submitted as job {job_id}");

    let mut controller = JobListController::new(service);
    controller.on_job_created(&job_id).await;
    if controller.load_failed() {
        eprintln!("warning: job list refresh failed; tracking the job anyway");
    }

    let poller = controller
        .start_poller()
        .context("no job selected after submission")?;
    track(&api, poller).await
}

/// Print the most recent jobs, newest first.
async fn list(api: Arc<ClipsApi>) -> Result<()> {
    let service: Arc<dyn JobService> = api.clone();
    let mut controller = JobListController::new(service);
    controller.refresh().await;

    if controller.load_failed() {
        bail!("could not load jobs from {}", api.base_url());
    }
    if controller.jobs().is_empty() {
        println!("No jobs yet. Submit a video to get started.");
        return Ok(());
    }

    for job in controller.jobs() {
        println!(
            "{}  {:<10}  {}  {} clip(s)",
            job.job_id,
            job.status,
            job.created_at.format("%Y-%m-%d %H:%M"),
            job.clips.len()
        );
    }
    Ok(())
}

/// Track an existing job until it reaches a terminal status.
async fn watch(api: Arc<ClipsApi>, job_id: &str) -> Result<()> {
    let job = api.get_job(job_id).await?;
    let service: Arc<dyn JobService> = api.clone();
    let poller = JobPoller::for_job(service, job);
    track(&api, poller).await
}

/// Save every clip of a completed job to the working directory.
async fn download(api: Arc<ClipsApi>, job_id: &str) -> Result<()> {
    let job = api.get_job(job_id).await?;
    if job.status != JobStatus::Completed {
        bail!("job {} is {}, nothing to download", job.job_id, job.status);
    }
    if job.clips.is_empty() {
        println!("Job {} completed with no clips", job.job_id);
        return Ok(());
    }

    for clip in &job.clips {
        let bytes = api.fetch_clip(clip).await?;
        tokio::fs::write(&clip.file_name, &bytes)
            .await
            .with_context(|| format!("writing {}", clip.file_name))?;
        println!("Saved {} ({} bytes)", clip.file_name, bytes.len());
    }
    Ok(())
}

/// Print each snapshot as it arrives until the poller stops, then the
/// final outcome.
async fn track(api: &ClipsApi, poller: JobPoller) -> Result<()> {
    if let Some(job) = poller.latest() {
        print_status(&job);
    }

    let mut snapshots = poller.subscribe();
    while poller.state() == PollerState::Polling {
        if snapshots.changed().await.is_err() {
            break;
        }
        if let Some(job) = snapshots.borrow_and_update().clone() {
            print_status(&job);
        }
    }

    let Some(job) = poller.latest() else {
        bail!("job produced no snapshot before tracking stopped");
    };

    match job.status {
        JobStatus::Completed if job.clips.is_empty() => {
            println!("Job {} completed with no clips", job.job_id);
        }
        JobStatus::Completed => {
            println!("Job {} completed, {} clip(s):", job.job_id, job.clips.len());
            for clip in &job.clips {
                println!(
                    "  {:>5.1}s  score {:>4}  {}",
                    clip.duration, clip.viral_score, clip.title
                );
                println!("         {}", clip.resolve_download_url(api.base_url()));
            }
        }
        JobStatus::Failed => {
            println!(
                "Job {} failed: {}",
                job.job_id,
                job.error.as_deref().unwrap_or("no detail provided")
            );
        }
        JobStatus::Pending | JobStatus::Processing => {
            // Tracking was interrupted before a terminal status.
            println!("Job {} is still {}", job.job_id, job.status);
        }
    }
    Ok(())
}

fn print_status(job: &Job) {
    println!("  {:<12} {}", job.status, job.progress);
}
