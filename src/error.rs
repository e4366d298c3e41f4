//! Error types for extsort
//!
//! Every fallible operation in the crate returns [`SortError`]. Per-file and
//! per-directory failures are recovered by the sorter; the variants here are
//! what reaches the log line or, for fatal problems, the binary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extsort operations
#[derive(Error, Debug)]
pub enum SortError {
    /// I/O error during file operations
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source directory does not exist
    #[error("Source directory does not exist: {0}")]
    NotFound(PathBuf),

    /// Source path exists but is not a directory
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Source and destination resolve to the same file
    #[error("Source and destination are the same file: {0}")]
    SameFile(PathBuf),

    /// A directory could not be read during traversal
    #[error("Failed to read directory '{path}': {message}")]
    Walk { path: PathBuf, message: String },

    /// A copy worker died before reporting back
    #[error("Copy worker {0} panicked")]
    WorkerPanicked(usize),

    /// Worker threads could not be started
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SortError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Build a traversal error from a `walkdir` failure
    pub fn walk(err: &walkdir::Error, fallback: &std::path::Path) -> Self {
        let path = err
            .path()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| fallback.to_path_buf());
        let message = match err.io_error() {
            Some(io) => io.to_string(),
            None => err.to_string(),
        };
        Self::Walk { path, message }
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. }
            | Self::NotFound(path)
            | Self::NotADirectory(path)
            | Self::SameFile(path)
            | Self::Walk { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for extsort operations
pub type Result<T> = std::result::Result<T, SortError>;

impl From<std::io::Error> for SortError {
    fn from(err: std::io::Error) -> Self {
        SortError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| SortError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SortError::io("/test/path", io_err);
        assert_eq!(err.path(), Some(&PathBuf::from("/test/path")));
        assert!(err.to_string().contains("/test/path"));
    }

    #[test]
    fn test_invalid_source_message_names_path() {
        let err = SortError::NotADirectory(PathBuf::from("/tmp/some-file.txt"));
        assert!(err.to_string().contains("/tmp/some-file.txt"));
    }

    #[test]
    fn test_config_error() {
        let err = SortError::config("Invalid buffer size: 0");
        assert!(matches!(err, SortError::Config(_)));
        assert_eq!(err.path(), None);
    }

    #[test]
    fn test_with_path() {
        let res: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = res.with_path("/a/b").unwrap_err();
        assert_eq!(err.path(), Some(&PathBuf::from("/a/b")));
    }
}
