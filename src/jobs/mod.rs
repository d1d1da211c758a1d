//! External job supervision.
//!
//! A job runs an external publish tool against one cataloged file. The tool
//! reports back through a line-oriented text protocol on stdout (see
//! [`protocol`]); the supervisor turns its output and exit status into job
//! state that clients poll by id.

pub mod lines;
pub mod protocol;
mod supervisor;
pub mod tools;
mod types;

pub use supervisor::{JobSupervisor, JobUpdate};
pub use types::*;
