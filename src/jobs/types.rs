use super::protocol::ControlLine;
use chrono::{DateTime, Utc};
use clipdock_common::{Error, JobId, MediaId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "type")]
    pub kind: JobKind,
    pub video_id: MediaId,
    pub status: JobStatus,
    pub progress: u8,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pid: Option<u32>,
    pub stdout: String,
    pub stderr: String,
    pub result: Option<Value>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Running)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    YoutubeUpload,
}

/// Kind-specific launch parameters handed to the external tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishParams {
    #[serde(default)]
    pub privacy: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Everything that can happen to a running job.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    SpawnError(String),
    StdoutLine(String),
    StderrLine(String),
    Exit {
        code: Option<i32>,
        signal: Option<i32>,
    },
}

impl Job {
    pub fn new(id: JobId, kind: JobKind, video_id: MediaId) -> Self {
        Self {
            id,
            kind,
            video_id,
            status: JobStatus::Running,
            progress: 0,
            started_at: Utc::now(),
            finished_at: None,
            pid: None,
            stdout: String::new(),
            stderr: String::new(),
            result: None,
            error: None,
        }
    }

    /// Apply one event. This is the only place job state changes after launch.
    pub fn apply(&mut self, event: JobEvent) {
        if self.status.is_terminal() {
            tracing::debug!("Job {} already finished, ignoring {:?}", self.id, event);
            return;
        }

        match event {
            JobEvent::SpawnError(message) => {
                self.finished_at = Some(Utc::now());
                self.status = JobStatus::Error;
                self.error = Some(message);
                self.result = Some(json!({ "ok": false, "reason": "spawn_failed" }));
            }
            JobEvent::StdoutLine(line) => {
                self.stdout.push_str(&line);
                self.stdout.push('\n');
                let control = ControlLine::parse(&line);
                if let Some(pct) = control.progress {
                    self.progress = pct;
                }
                if let Some(value) = control.result {
                    self.result = Some(value);
                }
            }
            JobEvent::StderrLine(line) => {
                self.stderr.push_str(&line);
                self.stderr.push('\n');
                let error = self.error.get_or_insert_with(String::new);
                error.push_str(&line);
                error.push('\n');
            }
            JobEvent::Exit { code, signal } => {
                self.finished_at = Some(Utc::now());
                if code == Some(0) {
                    self.status = JobStatus::Done;
                    self.progress = 100;
                    self.result.get_or_insert_with(|| json!({ "ok": true }));
                } else {
                    self.status = JobStatus::Error;
                    self.result.get_or_insert_with(|| {
                        json!({ "ok": false, "exitCode": code, "signal": signal })
                    });
                    if self.error.as_deref().map_or(true, str::is_empty) {
                        let failure = Error::ProcessFailed { code, signal };
                        self.error = Some(format!("{failure}\n"));
                    }
                }
            }
        }
    }
}
