//! Error taxonomy for the conversion pipeline.
//!
//! Configuration errors abort a run before the source folder is traversed.
//! Filesystem and asset I/O errors raised while handling a single file are
//! recorded on that file's outcome and the run moves on to the next file.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for all conversion pipeline operations.
#[derive(Debug, Error)]
pub enum ConvertError {
    // --- Configuration errors ---
    /// The requested target format is not one of FBX, OBJ, GLTF or GLB.
    #[error("Unsupported target format '{value}' (expected one of FBX, OBJ, GLTF, GLB)")]
    UnsupportedTargetFormat {
        /// The value that failed to parse.
        value: String,
    },

    /// The request is structurally invalid (empty paths and similar).
    #[error("Invalid conversion request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// The source folder is missing or is not a directory.
    #[error("Source folder does not exist or is not a directory: {path}")]
    SourceRootMissing {
        /// The configured source folder.
        path: PathBuf,
    },

    // --- Filesystem errors ---
    /// Listing a directory failed.
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        /// The directory that could not be listed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Creating a destination directory failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Checking whether a target file exists failed.
    #[error("Failed to check whether {path} exists: {source}")]
    ExistenceCheck {
        /// The target path being checked.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Returns `true` for errors that reject the request as a whole.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedTargetFormat { .. }
                | Self::InvalidRequest { .. }
                | Self::SourceRootMissing { .. }
        )
    }
}
