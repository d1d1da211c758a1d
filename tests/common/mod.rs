//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary data directory, a
//! JSON-backed catalog inside it and a full [`AppContext`] whose publisher is
//! configurable, so job tests can run small shell scripts as the tool.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use clipdock::catalog::{Catalog, JsonFileStore, MediaRecord};
use clipdock::config::{Config, PublisherConfig};
use clipdock::jobs::{Job, JobSupervisor};
use clipdock::server::{create_router, AppContext};
use clipdock_common::{JobId, MediaId};
use http_body_util::BodyExt;
use tempfile::TempDir;

pub struct TestHarness {
    pub dir: TempDir,
    pub ctx: AppContext,
}

impl TestHarness {
    /// Harness whose publisher is a program that does not exist.
    pub fn new() -> Self {
        Self::with_publisher(PublisherConfig {
            program: "/nonexistent/clipdock-publisher".to_string(),
            script: None,
            default_privacy: "unlisted".to_string(),
        })
    }

    /// Harness that runs `script` with `sh` for every publish job.
    pub fn with_script(body: &str) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let script = dir.path().join("publish.sh");
        std::fs::write(&script, body).expect("failed to write script");

        Self::build(
            dir,
            PublisherConfig {
                program: "sh".to_string(),
                script: Some(script),
                default_privacy: "unlisted".to_string(),
            },
        )
    }

    pub fn with_publisher(publisher: PublisherConfig) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        Self::build(dir, publisher)
    }

    fn build(dir: TempDir, publisher: PublisherConfig) -> Self {
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.publisher = publisher;

        let media_dir = config.storage.resolved_media_dir();
        std::fs::create_dir_all(&media_dir).expect("failed to create media dir");

        let store = JsonFileStore::new(config.storage.resolved_catalog_file());
        let catalog =
            Arc::new(Catalog::open(media_dir, Box::new(store)).expect("failed to open catalog"));
        let supervisor = JobSupervisor::new(catalog.clone(), config.publisher.clone());

        let ctx = AppContext::new(config, catalog, supervisor);
        Self { dir, ctx }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn media_dir(&self) -> PathBuf {
        self.ctx.catalog.media_dir().to_path_buf()
    }

    pub fn catalog_file(&self) -> PathBuf {
        self.ctx.config.storage.resolved_catalog_file()
    }

    /// Write `data` to the media directory and catalog it.
    pub fn add_video(&self, title: &str, data: &[u8]) -> MediaId {
        let id = MediaId::generate();
        let filename = format!("{id}.mp4");
        std::fs::write(self.media_dir().join(&filename), data).expect("failed to write media");

        self.ctx
            .catalog
            .insert(MediaRecord::new(
                id.clone(),
                title,
                filename,
                format!("{title}.mp4"),
                data.len() as u64,
                Some("video/mp4".to_string()),
            ))
            .expect("failed to insert record");
        id
    }

    pub fn remove_file_of(&self, id: &MediaId) {
        let record = self.ctx.catalog.find(id).expect("record exists");
        std::fs::remove_file(self.ctx.catalog.path_for(&record)).expect("failed to remove file");
    }

    /// Poll a job until it leaves `running`.
    pub async fn wait_for_job(&self, id: &JobId) -> Job {
        wait_for_job(&self.ctx.supervisor, id).await
    }
}

pub async fn wait_for_job(supervisor: &JobSupervisor, id: &JobId) -> Job {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let job = supervisor.get_job(id).expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {id} still running: {job:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Helper to get response body as bytes
pub async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

/// Helper to get response body as JSON
pub async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}
