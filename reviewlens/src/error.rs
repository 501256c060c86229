use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to the user by dashboard operations.
///
/// None of these are fatal: the CLI prints them in place of the affected section
/// and the HTTP API turns them into an error response.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("review file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("failed to parse review file at line {line}: {message}")]
    Parse { line: u64, message: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Stable machine-readable name, used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::FileNotFound(_) => "file_not_found",
            DashboardError::Connection(_) => "connection",
            DashboardError::Parse { .. } => "parse",
            DashboardError::Validation(_) => "validation",
            DashboardError::Io(_) => "io",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
