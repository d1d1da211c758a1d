//! Detection of the external publish tool.

use crate::config::PublisherConfig;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool as configured.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Resolved location of the tool.
    pub path: Option<PathBuf>,
}

/// Look up an executable on `PATH` and ask it for its version.
pub fn check_program(name: &str) -> ToolInfo {
    let Ok(path) = which::which(name) else {
        return ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        };
    };

    let version = Command::new(&path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| {
            // Older Python prints its version on stderr.
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            String::from_utf8_lossy(&text)
                .lines()
                .next()
                .map(|s| s.trim().to_string())
        })
        .filter(|v| !v.is_empty());

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: Some(path),
    }
}

/// Check everything a publish job needs: the program and, if set, its script.
pub fn check_publisher(publisher: &PublisherConfig) -> Vec<ToolInfo> {
    let mut tools = vec![check_program(&publisher.program)];

    if let Some(script) = publisher.script_path() {
        let path = std::fs::canonicalize(script).ok().filter(|p| p.is_file());
        tools.push(ToolInfo {
            name: script.display().to_string(),
            available: path.is_some(),
            version: None,
            path,
        });
    }

    tools
}
