//! Error taxonomy shared by the catalog, streaming responder and job supervisor.
//!
//! Lookup and validation failures are returned synchronously to callers.
//! Spawn and process failures never reach the caller of a job launch; their
//! `Display` text is recorded in the job's terminal state instead.

use std::fmt;

/// Common error type for clipdock.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A record, job, or backing file could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "video", "job").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// The requested byte range is malformed or out of bounds.
    #[error("Range not satisfiable (size {size})")]
    RangeNotSatisfiable {
        /// Total size of the resource in bytes.
        size: u64,
    },

    /// The external process could not be started.
    #[error("Failed to spawn {program}: {message}")]
    SpawnFailed {
        /// Program that was executed.
        program: String,
        /// Underlying OS error text.
        message: String,
    },

    /// The external process exited unsuccessfully.
    #[error("{}", describe_exit(*.code, *.signal))]
    ProcessFailed {
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Terminating signal number, if any.
        signal: Option<i32>,
    },

    /// A control line from a child process could not be interpreted.
    #[error("Malformed control line: {0}")]
    MalformedControlLine(String),

    /// Invalid input was provided.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_exit(code: Option<i32>, signal: Option<i32>) -> String {
    match (code, signal) {
        (Some(code), Some(signal)) => format!("Exited with code {code} (signal {signal})"),
        (Some(code), None) => format!("Exited with code {code}"),
        (None, Some(signal)) => format!("Terminated by signal {signal}"),
        (None, None) => "Exited with unknown status".to_string(),
    }
}

impl Error {
    /// Map this error to an HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::RangeNotSatisfiable { .. } => 416,
            Error::SpawnFailed { .. } => 502,
            Error::ProcessFailed { .. } => 502,
            Error::MalformedControlLine(_) => 422,
            Error::Validation(_) => 400,
            Error::Io(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Create a new NotFound error.
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a new SpawnFailed error.
    pub fn spawn_failed(program: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            message: message.to_string(),
        }
    }

    /// Create a new Validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error means the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
