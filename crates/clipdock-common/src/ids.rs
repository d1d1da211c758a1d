//! Typed identifier wrappers.
//!
//! Identifiers are random hex tokens rather than UUIDs: media ids double as
//! the stem of the storage filename, and job ids must be unguessable.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes in a media id (24 hex characters).
const MEDIA_ID_BYTES: usize = 12;

/// Number of random bytes in a job id (20 hex characters).
const JOB_ID_BYTES: usize = 10;

fn random_token(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Unique identifier for a media record in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Generate a new random media ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token(MEDIA_ID_BYTES))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MediaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a supervised job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a new random job ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(random_token(JOB_ID_BYTES))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
