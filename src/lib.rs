//! apiscope - a per-project registry of API specification sources.
//!
//! This library provides the core functionality for the `apiscope` CLI tool:
//! project root discovery, the `apiscope.ini` registry, and the idempotent
//! setup of the cache directory and `.gitignore` rule.

pub mod cli;
pub mod commands;
pub mod config;

use std::path::PathBuf;

/// Library-level error type for apiscope operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not initialized: run `apiscope init` first")]
    NotInitialized,

    #[error("Specification '{0}' already exists in configuration")]
    DuplicateName(String),

    #[error("Specification not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to parse {}: line {line}: {message}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to access configuration {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for apiscope operations.
pub type Result<T> = std::result::Result<T, Error>;
