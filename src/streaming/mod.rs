//! Media streaming.
//!
//! Files are served straight from the media directory with support for a
//! single HTTP byte range, which is what browser `<video>` elements send
//! when seeking.

mod direct;
pub mod range;

pub use direct::serve_record;
pub use range::{ByteRange, ServePlan};
