//! Clipdock - media upload, catalog and publish server
//!
//! This library crate exposes the core functionality for integration testing.

pub mod catalog;
pub mod config;
pub mod jobs;
pub mod server;
pub mod streaming;
