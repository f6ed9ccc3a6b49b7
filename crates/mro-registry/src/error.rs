//! Error types for the registry
//!
//! Malformed schema documents are deliberately not represented here: they
//! are logged and skipped during discovery. Only filesystem faults that
//! invalidate the walk or a definition read are surfaced.

use std::path::PathBuf;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Directory walk failed (missing root, unreadable directory)
    #[error("model discovery failed under {root}: {source}")]
    Walk {
        /// Root directory being discovered
        root: PathBuf,
        /// Underlying walk error
        #[source]
        source: walkdir::Error,
    },

    /// Reading an artifact file failed
    #[error("read failed for {path}: {source}")]
    Read {
        /// File that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_error_display_names_path() {
        let err = RegistryError::Read {
            path: PathBuf::from("models/orders.sql"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("orders.sql"));
    }
}
