//! Clipdock-Common: shared types used across clipdock.
//!
//! - **Typed IDs**: hex-token wrappers for media records and jobs
//! - **Path Utilities**: extension and content-type detection
//! - **Error Handling**: the error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use clipdock_common::{Error, JobId, MediaId, Result};
//! use clipdock_common::paths::content_type_for;
//! use std::path::Path;
//!
//! let media_id = MediaId::generate();
//! assert_eq!(media_id.as_str().len(), 24);
//!
//! let job_id = JobId::generate();
//! assert_eq!(job_id.as_str().len(), 20);
//!
//! assert_eq!(content_type_for(Path::new("clip.webm")), Some("video/webm"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("video", "abc"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod paths;

pub use error::{Error, Result};
pub use ids::*;
