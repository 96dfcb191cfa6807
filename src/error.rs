//! Error types for the task store.
//!
//! Every variant is recoverable: callers report it and carry on.

use std::path::PathBuf;

use thiserror::Error;

use crate::fields::Kind;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Task '{0}' not found.")]
    NotFound(String),

    #[error("No matching tasks found for '{0}'. Please enter a valid task name or number.")]
    NoMatches(String),

    #[error("Invalid input '{0}'. Please enter a valid index.")]
    InvalidIndex(String),

    #[error("Invalid index {index}. Only {len} matching tasks.")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid deadline '{0}'. Use the format dd/mm/yyyy.")]
    InvalidDeadline(String),

    #[error("Invalid {field} '{value}'.")]
    InvalidValue { field: &'static str, value: String },

    #[error("No task numbers left for {0}.")]
    NumbersExhausted(Kind),

    #[error("File '{}' not found.", .0.display())]
    MissingFile(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;
