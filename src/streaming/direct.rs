//! Direct streaming with HTTP range requests.

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use clipdock_common::{Error, MediaId, Result};
use std::io::{ErrorKind, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::range::ServePlan;
use crate::catalog::Catalog;

/// Stream a cataloged file, honouring a single `Range` header.
///
/// A record whose file has vanished prunes the catalog and reports
/// [`Error::NotFound`]. Bad or out-of-bounds ranges report
/// [`Error::RangeNotSatisfiable`] carrying the file size.
pub async fn serve_record(
    catalog: &Catalog,
    id: &MediaId,
    range_header: Option<&str>,
) -> Result<Response> {
    let record = catalog.find(id)?;
    let path = catalog.path_for(&record);

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(missing_file(catalog, &record.filename)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(missing_file(catalog, &record.filename))
        }
        Err(e) => return Err(e.into()),
    };

    let file_size = metadata.len();
    let plan = ServePlan::for_request(range_header, file_size)?;
    let content_type = record.content_type();

    let file = match File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(missing_file(catalog, &record.filename))
        }
        Err(e) => return Err(e.into()),
    };

    match plan {
        ServePlan::Partial { start, end, size } => {
            let length = plan.content_length();
            let mut file = file;
            file.seek(SeekFrom::Start(start)).await?;

            let stream = ReaderStream::new(file.take(length));

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{size}"))
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
                .map_err(|e| Error::internal(e.to_string()))
        }
        ServePlan::Full { size } => {
            let stream = ReaderStream::new(file.take(size));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(Body::from_stream(stream))
                .map_err(|e| Error::internal(e.to_string()))
        }
    }
}

fn missing_file(catalog: &Catalog, filename: &str) -> Error {
    tracing::warn!("Media file {} disappeared, pruning catalog", filename);
    catalog.reconcile();
    Error::not_found("video file", filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MediaRecord, MemoryStore};
    use http_body_util::BodyExt;

    fn catalog_with(len: usize) -> (tempfile::TempDir, Catalog) {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(dir.path().join("v1.mp4"), &data).unwrap();

        let catalog = Catalog::open(dir.path(), Box::new(MemoryStore::default())).unwrap();
        catalog
            .insert(MediaRecord::new(
                MediaId::from("v1"),
                "clip",
                "v1.mp4",
                "clip.mp4",
                len as u64,
                Some("video/mp4".to_string()),
            ))
            .unwrap();
        (dir, catalog)
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn test_full_response() {
        let (_dir, catalog) = catalog_with(1000);
        let response = serve_record(&catalog, &MediaId::from("v1"), None)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "1000");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        assert_eq!(body_bytes(response).await.len(), 1000);
    }

    #[tokio::test]
    async fn test_partial_response() {
        let (_dir, catalog) = catalog_with(1000);
        let response = serve_record(&catalog, &MediaId::from("v1"), Some("bytes=500-599"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            response.headers()[header::CONTENT_RANGE],
            "bytes 500-599/1000"
        );
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "100");

        let body = body_bytes(response).await;
        let expected: Vec<u8> = (500..600).map(|i| (i % 251) as u8).collect();
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_out_of_range() {
        let (_dir, catalog) = catalog_with(1000);
        let err = serve_record(&catalog, &MediaId::from("v1"), Some("bytes=2000-2100"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RangeNotSatisfiable { size: 1000 }));
    }

    #[tokio::test]
    async fn test_missing_file_prunes_record() {
        let (dir, catalog) = catalog_with(10);
        std::fs::remove_file(dir.path().join("v1.mp4")).unwrap();

        let err = serve_record(&catalog, &MediaId::from("v1"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_record() {
        let (_dir, catalog) = catalog_with(10);
        let err = serve_record(&catalog, &MediaId::from("nope"), None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
