//! Launches publish tools and tracks them as jobs.
//!
//! Each launched process gets one driver task. Two pump tasks frame its
//! stdout and stderr into lines and forward them over a channel; the driver
//! applies them to the job in arrival order, then waits for the exit status
//! and applies the final [`JobEvent::Exit`]. The driver is therefore the only
//! writer for its job.

use super::lines::pump_lines;
use super::types::{Job, JobEvent, JobKind, JobStatus, PublishParams};
use crate::catalog::Catalog;
use crate::config::PublisherConfig;
use clipdock_common::{Error, JobId, MediaId, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, mpsc};

/// Lightweight notification sent whenever a job changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    pub job_id: JobId,
    pub video_id: MediaId,
    pub status: JobStatus,
    pub progress: u8,
}

impl From<&Job> for JobUpdate {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            video_id: job.video_id.clone(),
            status: job.status,
            progress: job.progress,
        }
    }
}

pub struct JobSupervisor {
    catalog: Arc<Catalog>,
    publisher: PublisherConfig,
    jobs: RwLock<HashMap<JobId, Job>>,
    event_tx: broadcast::Sender<JobUpdate>,
}

impl JobSupervisor {
    pub fn new(catalog: Arc<Catalog>, publisher: PublisherConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(256);
        Arc::new(Self {
            catalog,
            publisher,
            jobs: RwLock::new(HashMap::new()),
            event_tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobUpdate> {
        self.event_tx.subscribe()
    }

    /// Start a job against a cataloged file and return its id immediately.
    ///
    /// Fails only when the record or its file is missing. Anything that goes
    /// wrong after that, including a failed spawn, ends up in the job's
    /// terminal state. Must be called from within a Tokio runtime.
    pub fn launch(
        self: &Arc<Self>,
        kind: JobKind,
        media_id: &MediaId,
        params: PublishParams,
    ) -> Result<JobId> {
        let record = self.catalog.find(media_id)?;
        if !self.catalog.file_exists(&record) {
            self.catalog.reconcile();
            return Err(Error::not_found("video file", &record.filename));
        }

        let path = self.catalog.path_for(&record);
        let path = std::fs::canonicalize(&path).unwrap_or(path);

        let job_id = JobId::generate();
        self.jobs
            .write()
            .insert(job_id.clone(), Job::new(job_id.clone(), kind, record.id.clone()));

        let title = non_empty(params.title).unwrap_or_else(|| record.title.clone());
        let privacy =
            non_empty(params.privacy).unwrap_or_else(|| self.publisher.default_privacy.clone());

        let mut cmd = self.command(&path, &title, &privacy, &record.id, &job_id);

        tracing::info!(
            "Launching job {} ({:?}) for video {}: {}",
            job_id,
            kind,
            record.id,
            self.publisher.program
        );

        match cmd.spawn() {
            Ok(child) => {
                if let Some(job) = self.jobs.write().get_mut(&job_id) {
                    job.pid = child.id();
                }
                self.notify(&job_id);
                tokio::spawn(Arc::clone(self).drive(job_id.clone(), child));
            }
            Err(e) => {
                let failure = Error::spawn_failed(&self.publisher.program, e);
                tracing::error!("Job {}: {}", job_id, failure);
                self.apply(&job_id, JobEvent::SpawnError(failure.to_string()));
            }
        }

        Ok(job_id)
    }

    /// Snapshot of one job.
    pub fn get_job(&self, id: &JobId) -> Result<Job> {
        self.jobs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("job", id))
    }

    /// Snapshots of all jobs, newest first.
    pub fn list_jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    /// Count jobs per status.
    pub fn counts(&self) -> HashMap<JobStatus, usize> {
        let mut counts = HashMap::new();
        for job in self.jobs.read().values() {
            *counts.entry(job.status).or_insert(0) += 1;
        }
        counts
    }

    fn command(
        &self,
        path: &Path,
        title: &str,
        privacy: &str,
        media_id: &MediaId,
        job_id: &JobId,
    ) -> Command {
        let mut cmd = Command::new(&self.publisher.program);
        if let Some(script) = self.publisher.script_path() {
            cmd.arg(script);
        }
        cmd.arg("--file")
            .arg(path)
            .arg("--title")
            .arg(title)
            .arg("--privacy")
            .arg(privacy)
            .arg("--videoId")
            .arg(media_id.as_str())
            .arg("--jobId")
            .arg(job_id.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    async fn drive(self: Arc<Self>, id: JobId, mut child: Child) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                pump_lines(stdout, |line| {
                    let _ = tx.send(JobEvent::StdoutLine(line));
                })
                .await;
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                pump_lines(stderr, |line| {
                    let _ = tx.send(JobEvent::StderrLine(line));
                })
                .await;
            });
        }

        // The channel closes once both pumps hit EOF.
        drop(tx);

        while let Some(event) = rx.recv().await {
            if let JobEvent::StderrLine(ref line) = event {
                tracing::debug!("job {} stderr: {}", id, line);
            }
            self.apply(&id, event);
        }

        let exit = match child.wait().await {
            Ok(status) => JobEvent::Exit {
                code: status.code(),
                signal: exit_signal(&status),
            },
            Err(e) => {
                tracing::error!("Failed to wait for job {}: {}", id, e);
                JobEvent::Exit {
                    code: None,
                    signal: None,
                }
            }
        };
        self.apply(&id, exit);
    }

    fn apply(&self, id: &JobId, event: JobEvent) {
        let update = {
            let mut jobs = self.jobs.write();
            let Some(job) = jobs.get_mut(id) else {
                return;
            };
            let before = (job.status, job.progress);
            job.apply(event);
            if before == (job.status, job.progress) {
                return;
            }
            match job.status {
                JobStatus::Done => tracing::info!("Job {} completed", id),
                JobStatus::Error => tracing::warn!(
                    "Job {} failed: {}",
                    id,
                    job.error.as_deref().unwrap_or("").trim_end()
                ),
                JobStatus::Running => tracing::debug!("Job {} at {}%", id, job.progress),
            }
            JobUpdate::from(&*job)
        };

        if self.event_tx.send(update).is_err() {
            tracing::trace!("No subscribers for job event");
        }
    }

    fn notify(&self, id: &JobId) {
        let update = match self.jobs.read().get(id) {
            Some(job) => JobUpdate::from(job),
            None => return,
        };
        if self.event_tx.send(update).is_err() {
            tracing::trace!("No subscribers for job event");
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
