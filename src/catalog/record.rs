use chrono::{DateTime, Utc};
use clipdock_common::MediaId;
use serde::{Deserialize, Serialize};

/// One uploaded media file known to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: MediaId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Name of the backing file inside the media directory.
    pub filename: String,
    pub original_name: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl MediaRecord {
    /// Build a record for a freshly stored upload.
    pub fn new(
        id: MediaId,
        title: impl Into<String>,
        filename: impl Into<String>,
        original_name: impl Into<String>,
        size_bytes: u64,
        mime_type: Option<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            created_at: Utc::now(),
            filename: filename.into(),
            original_name: original_name.into(),
            size_bytes,
            mime_type,
        }
    }

    /// The stored MIME type, or the generic video type when unset.
    pub fn content_type(&self) -> &str {
        self.mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(clipdock_common::paths::DEFAULT_VIDEO_CONTENT_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_defaults_to_video_mp4() {
        let mut record = MediaRecord::new(MediaId::from("a1"), "t", "a1.bin", "x.bin", 1, None);
        assert_eq!(record.content_type(), "video/mp4");

        record.mime_type = Some(String::new());
        assert_eq!(record.content_type(), "video/mp4");

        record.mime_type = Some("video/webm".to_string());
        assert_eq!(record.content_type(), "video/webm");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let record = MediaRecord::new(
            MediaId::from("abc"),
            "Holiday",
            "abc.mp4",
            "holiday.mp4",
            42,
            Some("video/mp4".into()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["originalName"], "holiday.mp4");
        assert_eq!(json["sizeBytes"], 42);
        assert_eq!(json["mimeType"], "video/mp4");
        assert!(json.get("createdAt").is_some());
    }
}
