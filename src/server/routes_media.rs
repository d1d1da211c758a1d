use crate::catalog::MediaRecord;
use crate::server::{AppContext, AppError};
use crate::streaming;
use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use clipdock_common::paths::{content_type_for, dotted_extension};
use clipdock_common::{Error, MediaId};
use std::path::Path as FsPath;
use tokio::io::AsyncWriteExt;

pub fn media_routes() -> Router<AppContext> {
    Router::new()
        .route(
            "/videos",
            get(list_videos)
                .post(upload_video)
                .layer(DefaultBodyLimit::disable()),
        )
        .route("/videos/:id", delete(delete_video))
        .route("/videos/:id/stream", get(stream_video))
}

async fn list_videos(State(ctx): State<AppContext>) -> Json<Vec<MediaRecord>> {
    Json(ctx.catalog.list())
}

async fn upload_video(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut title: Option<String> = None;
    let mut stored: Option<StoredUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::validation(format!("Failed to read multipart: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if stored.is_none() => {
                stored = Some(store_upload(ctx.catalog.media_dir(), field).await?);
            }
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::validation(format!("Failed to read title: {e}")))?;
                title = Some(text);
            }
            _ => {}
        }
    }

    let stored = stored.ok_or_else(|| Error::validation("Missing 'file' part"))?;
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| stored.original_name.clone());

    let record = MediaRecord::new(
        stored.id,
        title,
        stored.filename,
        stored.original_name,
        stored.size_bytes,
        stored.mime_type,
    );

    if let Err(e) = ctx.catalog.insert(record.clone()) {
        let path = ctx.catalog.path_for(&record);
        if let Err(rm) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove upload {:?}: {}", path, rm);
        }
        return Err(e.into());
    }

    tracing::info!(
        "Uploaded video {} ({} bytes) as {}",
        record.id,
        record.size_bytes,
        record.filename
    );

    Ok((StatusCode::CREATED, Json(record)))
}

struct StoredUpload {
    id: MediaId,
    filename: String,
    original_name: String,
    size_bytes: u64,
    mime_type: Option<String>,
}

/// Stream one multipart file part to `<media_dir>/<id><ext>`.
async fn store_upload(
    media_dir: &FsPath,
    mut field: Field<'_>,
) -> Result<StoredUpload, AppError> {
    let original_name = field.file_name().unwrap_or("upload").to_string();
    let id = MediaId::generate();
    let filename = format!("{}{}", id, dotted_extension(&original_name));
    let path = media_dir.join(&filename);

    let mime_type = field
        .content_type()
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .map(str::to_string)
        .or_else(|| content_type_for(&path).map(str::to_string));

    let mut file = tokio::fs::File::create(&path).await?;
    let mut size_bytes = 0u64;

    let written = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| Error::validation(format!("Failed to read file data: {e}")))?
        {
            file.write_all(&chunk).await?;
            size_bytes += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<(), AppError>(())
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(rm) = tokio::fs::remove_file(&path).await {
            tracing::warn!("Failed to remove partial upload {:?}: {}", path, rm);
        }
        return Err(e);
    }

    Ok(StoredUpload {
        id,
        filename,
        original_name,
        size_bytes,
        mime_type,
    })
}

async fn delete_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let removed = ctx.catalog.remove(&MediaId::from(id))?;
    tracing::info!("Deleted video {} ({})", removed.id, removed.filename);
    Ok(Json(serde_json::json!({ "ok": true })))
}

async fn stream_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    // A Range header that is not visible ASCII is malformed, not absent.
    let range = headers
        .get(header::RANGE)
        .map(|h| h.to_str().unwrap_or_default());
    let response = streaming::serve_record(&ctx.catalog, &MediaId::from(id), range).await?;
    Ok(response)
}
