//! Path utilities for detecting media content types by extension.

use std::path::Path;

/// Content type used when a record carries no MIME type of its own.
pub const DEFAULT_VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Supported media extensions and their content types.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("ts", "video/mp2t"),
    ("flv", "video/x-flv"),
    ("m4a", "audio/mp4"),
    ("mp3", "audio/mpeg"),
    ("flac", "audio/flac"),
    ("wav", "audio/wav"),
];

/// Guess the content type of a file from its extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use clipdock_common::paths::content_type_for;
///
/// assert_eq!(content_type_for(Path::new("a/b/movie.MKV")), Some("video/x-matroska"));
/// assert_eq!(content_type_for(Path::new("notes.txt")), None);
/// ```
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
}

/// Return the extension of `name` including the leading dot, or an empty
/// string when there is none.
///
/// # Examples
///
/// ```
/// use clipdock_common::paths::dotted_extension;
///
/// assert_eq!(dotted_extension("clip.final.mp4"), ".mp4");
/// assert_eq!(dotted_extension("README"), "");
/// ```
pub fn dotted_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
