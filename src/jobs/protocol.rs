//! Control-line grammar spoken by publish tools on stdout.
//!
//! ```text
//! PROGRESS 37          progress, also "PROGRESS:37", "progress=37"
//! RESULT {"id": "x"}   structured result payload
//! anything else        plain log line
//! ```

use clipdock_common::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// What a line of tool output says, if anything.
///
/// Both patterns are tried on every line, so a `RESULT` line may carry
/// progress too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlLine {
    /// Progress percentage, already clamped to 0..=100.
    pub progress: Option<u8>,
    /// Parsed `RESULT` payload.
    pub result: Option<Value>,
}

fn progress_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)PROGRESS\s*[:=]?\s*(\d{1,3})").expect("progress pattern is valid")
    })
}

fn result_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^RESULT\s+(.+)$").expect("result pattern is valid"))
}

impl ControlLine {
    /// Classify a line.
    ///
    /// A `RESULT` payload that is not valid JSON is logged and dropped.
    pub fn parse(line: &str) -> Self {
        let result = match parse_result(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        };

        Self {
            progress: parse_progress(line),
            result,
        }
    }

    /// True when the line is neither progress nor a result.
    pub fn is_plain(&self) -> bool {
        self.progress.is_none() && self.result.is_none()
    }
}

/// Extract a progress value, clamped to 0..=100.
pub fn parse_progress(line: &str) -> Option<u8> {
    let caps = progress_re().captures(line)?;
    Some(clamp_percent(&caps[1]))
}

/// Extract a `RESULT` payload.
///
/// `Ok(None)` means the line is not a result line at all.
pub fn parse_result(line: &str) -> Result<Option<Value>> {
    let Some(caps) = result_re().captures(line) else {
        return Ok(None);
    };
    serde_json::from_str(&caps[1])
        .map(Some)
        .map_err(|e| Error::MalformedControlLine(format!("{line:?}: {e}")))
}

fn clamp_percent(digits: &str) -> u8 {
    digits
        .parse::<u32>()
        .map(|n| n.min(100) as u8)
        .unwrap_or(0)
}
