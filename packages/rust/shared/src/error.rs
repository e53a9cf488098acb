//! Error types for waybackjobs.
//!
//! Library crates use [`WaybackJobsError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all waybackjobs operations.
#[derive(Debug, thiserror::Error)]
pub enum WaybackJobsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during index queries or snapshot fetches.
    #[error("network error: {0}")]
    Network(String),

    /// HTML or CDX response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad date range, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The index query for the primary target returned no snapshots.
    #[error("no snapshots found for the target URL in the requested date range")]
    NoSnapshots,

    /// Every snapshot and every extraction tier produced zero job records.
    #[error("no job listings extracted from any snapshot after all fallback tiers")]
    NoJobs,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WaybackJobsError>;

impl WaybackJobsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = WaybackJobsError::config("missing target URL");
        assert_eq!(err.to_string(), "config error: missing target URL");

        let err = WaybackJobsError::validation("from date after to date");
        assert!(err.to_string().contains("from date after to date"));
    }

    #[test]
    fn terminal_errors_are_distinct() {
        // The two fatal pipeline outcomes must be distinguishable to the user.
        let none_found = WaybackJobsError::NoSnapshots.to_string();
        let none_extracted = WaybackJobsError::NoJobs.to_string();
        assert_ne!(none_found, none_extracted);
        assert!(none_found.contains("snapshots"));
        assert!(none_extracted.contains("job listings"));
    }
}
