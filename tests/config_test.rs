//! Integration tests for configuration loading.

use clipdock::config::{load_config, load_config_or_default, validate_config, Config};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn full_config_round_trips_through_loader() {
    let file = write_config(
        r#"
        [server]
        host = "127.0.0.1"
        port = 8088

        [storage]
        data_dir = "/srv/clipdock"
        media_dir = "media"
        catalog_file = "catalog.json"

        [publisher]
        program = "python3"
        script = "/opt/clipdock/youtube_upload.py"
        default_privacy = "private"
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8088);
    assert_eq!(
        config.storage.resolved_media_dir(),
        PathBuf::from("/srv/clipdock/media")
    );
    assert_eq!(
        config.storage.resolved_catalog_file(),
        PathBuf::from("/srv/clipdock/catalog.json")
    );
    assert_eq!(
        config.publisher.script_path(),
        Some(PathBuf::from("/opt/clipdock/youtube_upload.py").as_path())
    );
    assert_eq!(config.publisher.default_privacy, "private");
}

#[test]
fn absolute_media_dir_ignores_data_dir() {
    let file = write_config(
        r#"
        [storage]
        data_dir = "/srv/clipdock"
        media_dir = "/mnt/videos"
        "#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.storage.resolved_media_dir(),
        PathBuf::from("/mnt/videos")
    );
}

#[test]
fn blank_program_is_rejected() {
    let mut config = Config::default();
    config.publisher.program = "  ".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn invalid_toml_reports_path() {
    let file = write_config("[server\nport = ");
    let err = load_config(file.path()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn explicit_path_must_exist() {
    let missing = std::path::Path::new("/nonexistent/clipdock/config.toml");
    assert!(load_config_or_default(Some(missing)).is_err());
}
