use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub publisher: PublisherConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where uploaded media and the catalog file live.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base directory; relative `media_dir` and `catalog_file` resolve against it.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    #[serde(default = "default_catalog_file")]
    pub catalog_file: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_media_dir() -> PathBuf {
    PathBuf::from("uploads/videos")
}
fn default_catalog_file() -> PathBuf {
    PathBuf::from("db.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            media_dir: default_media_dir(),
            catalog_file: default_catalog_file(),
        }
    }
}

impl StorageConfig {
    /// Absolute-or-relative path of the media directory.
    pub fn resolved_media_dir(&self) -> PathBuf {
        self.data_dir.join(&self.media_dir)
    }

    pub fn resolved_catalog_file(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }
}

/// External publish tool invoked for upload jobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    /// Program to execute (an interpreter or the tool itself).
    #[serde(default = "default_program")]
    pub program: String,

    /// Script passed as the first argument, if the program is an interpreter.
    #[serde(default = "default_script")]
    pub script: Option<PathBuf>,

    /// Privacy setting used when a launch request does not name one.
    #[serde(default = "default_privacy")]
    pub default_privacy: String,
}

fn default_program() -> String {
    "python3".to_string()
}
fn default_script() -> Option<PathBuf> {
    Some(PathBuf::from("youtube_upload.py"))
}
fn default_privacy() -> String {
    "unlisted".to_string()
}

impl PublisherConfig {
    /// The configured script, treating an empty value as "no script".
    pub fn script_path(&self) -> Option<&Path> {
        self.script
            .as_deref()
            .filter(|s| !s.as_os_str().is_empty())
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            script: default_script(),
            default_privacy: default_privacy(),
        }
    }
}
