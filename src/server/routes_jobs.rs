use crate::jobs::{Job, JobKind, JobStatus, PublishParams};
use crate::server::{AppContext, AppError};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use clipdock_common::{JobId, MediaId};

pub fn job_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/videos/:id/upload/youtube", post(publish_youtube))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
}

async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    let counts = ctx.supervisor.counts();
    let count = |status: JobStatus| counts.get(&status).copied().unwrap_or(0);

    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "videos": ctx.catalog.len(),
        "jobs": {
            "running": count(JobStatus::Running),
            "done": count(JobStatus::Done),
            "error": count(JobStatus::Error),
        }
    }))
}

/// The body is optional; an empty or non-JSON body means "use defaults".
async fn publish_youtube(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    body: Option<Json<PublishParams>>,
) -> Result<impl IntoResponse, AppError> {
    let params = body.map(|Json(p)| p).unwrap_or_default();
    let job_id = ctx
        .supervisor
        .launch(JobKind::YoutubeUpload, &MediaId::from(id), params)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "jobId": job_id })),
    ))
}

async fn list_jobs(State(ctx): State<AppContext>) -> Json<Vec<Job>> {
    Json(ctx.supervisor.list_jobs())
}

async fn get_job(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(ctx.supervisor.get_job(&JobId::from(id))?))
}
