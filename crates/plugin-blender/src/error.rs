//! Unified error type for the Blender backend.
//!
//! Discovery, script, process and output validation failures are collected
//! in one `BlenderError` enum that maps onto
//! `batchconv_core::AssetIoError` at the trait boundary.

use std::path::{Path, PathBuf};

use batchconv_core::AssetIoError;
use thiserror::Error;

/// Unified error type for all Blender backend operations.
#[derive(Debug, Error)]
pub enum BlenderError {
    // --- Discovery errors ---
    /// No Blender executable was found.
    #[error("Blender executable not found (searched: {searched})")]
    NotFound {
        /// Where discovery looked.
        searched: String,
    },

    // --- Session errors ---
    /// Source file passed to the importer does not exist.
    #[error("Source file not found: {path}")]
    SourceMissing {
        /// The missing source file.
        path: PathBuf,
    },

    /// Export was requested on an empty working scene.
    #[error("Nothing imported since the last scene reset; cannot export {path}")]
    NoPendingImport {
        /// Requested output path.
        path: PathBuf,
    },

    // --- Process execution errors ---
    /// Blender did not finish within the configured timeout.
    #[error("Blender process timed out after {timeout_seconds}s")]
    Timeout {
        /// The timeout that was exceeded.
        timeout_seconds: u64,
    },

    /// The generated script could not load the empty home file.
    #[error("Blender could not reset its scene: {stderr}")]
    SceneResetFailed {
        /// Captured stderr output.
        stderr: String,
    },

    /// An importer raised while loading the queued source files.
    #[error("Blender could not import the source: {stderr}")]
    ImportFailed {
        /// Captured stderr output.
        stderr: String,
    },

    /// Blender exited with a non-zero status.
    #[error("Blender exited with code {code}: {stderr}")]
    ProcessFailed {
        /// The exit code.
        code: i32,
        /// Captured stderr output.
        stderr: String,
        /// Captured stdout output.
        stdout: String,
    },

    /// Blender was terminated by a signal.
    #[error("Blender process was killed (signal termination)")]
    Killed,

    // --- Output validation errors ---
    /// Blender finished but the output file was not written.
    #[error("Output file not created: {path}")]
    OutputNotCreated {
        /// Expected output path.
        path: PathBuf,
    },

    /// Output file is smaller than the configured minimum.
    #[error("Output file is too small ({size} bytes): {path}")]
    OutputEmpty {
        /// Path to the output file.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
    },

    // --- Generic errors ---
    /// Configuration failed validation.
    #[error("Invalid Blender configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlenderError {
    /// Map into the backend-neutral error for an operation on `path`.
    ///
    /// `path` is the source file for import failures and the target file
    /// for everything else.
    pub fn into_asset_io(self, path: &Path) -> AssetIoError {
        match self {
            BlenderError::Io(e) => AssetIoError::Io(e),
            BlenderError::SceneResetFailed { stderr } => {
                AssetIoError::SceneResetFailed { reason: stderr }
            }
            import @ (BlenderError::SourceMissing { .. } | BlenderError::ImportFailed { .. }) => {
                AssetIoError::ImportFailed {
                    path: path.to_path_buf(),
                    reason: import.to_string(),
                }
            }
            other => AssetIoError::ExportFailed {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_errors_map_to_export_failed() {
        let err = BlenderError::OutputNotCreated {
            path: PathBuf::from("/out/a.glb"),
        }
        .into_asset_io(Path::new("/out/a.glb"));
        match err {
            AssetIoError::ExportFailed { path, reason } => {
                assert_eq!(path, PathBuf::from("/out/a.glb"));
                assert!(reason.contains("not created"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_script_step_failures_keep_their_stage() {
        let err = BlenderError::ImportFailed {
            stderr: "RuntimeError: invalid FBX header".to_string(),
        }
        .into_asset_io(Path::new("/src/corrupt.fbx"));
        match err {
            AssetIoError::ImportFailed { path, reason } => {
                assert_eq!(path, PathBuf::from("/src/corrupt.fbx"));
                assert!(reason.contains("invalid FBX header"));
            }
            other => panic!("unexpected mapping: {other:?}"),
        }

        let err = BlenderError::SceneResetFailed {
            stderr: "home file unreadable".to_string(),
        }
        .into_asset_io(Path::new("/out/a.fbx"));
        assert!(matches!(err, AssetIoError::SceneResetFailed { .. }));
    }

    #[test]
    fn test_missing_source_maps_to_import_failed() {
        let err = BlenderError::SourceMissing {
            path: PathBuf::from("/src/a.obj"),
        }
        .into_asset_io(Path::new("/src/a.obj"));
        assert!(matches!(err, AssetIoError::ImportFailed { .. }));
    }
}
