//! Error types for the to-do list core.

use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Input rejected before any task is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task description cannot be empty")]
    EmptyDescription,
}

/// Import text that could not be turned into a task list.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON task list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate task id {0} in import")]
    DuplicateId(TaskId),
}

/// Failures of the persistent store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level error surfaced to callers of the core.
#[derive(Error, Debug)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode tasks: {0}")]
    Encode(#[from] serde_json::Error),

    /// Import source with an extension other than `.json` / `.csv`.
    #[error("unsupported file format `{0}`; use JSON or CSV")]
    UnsupportedFormat(String),

    #[error("file error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for to-do list operations.
pub type Result<T> = std::result::Result<T, TodoError>;
