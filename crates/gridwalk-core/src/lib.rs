//! Gridwalk Core Library
//!
//! This crate provides the layer domain model, error types and configuration
//! shared by the database, API and CLI crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, DEFAULT_LAYER_SCHEMA};
pub use error::{AppError, DbErrorKind, ErrorMetadata, LogLevel};
