//! Error types for report generation

use std::path::PathBuf;

/// Report persistence errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Output directory could not be created
    #[error("create dir failed for {path}: {source}")]
    CreateDir {
        /// Directory being created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A document or body could not be written
    #[error("write failed for {path}: {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
