//! Error types for report rendering

use thiserror::Error;

/// Result type for report rendering
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that can occur while rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTML shell template error
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}
