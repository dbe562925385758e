//! Domain models: discovered source files and per-file outcomes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A file found while walking the source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Path of the file as found during traversal.
    pub absolute_path: PathBuf,
    /// File name without its final extension.
    pub base_name: String,
    /// Final extension, lower-cased, without the dot. Empty if none.
    pub source_extension: String,
}

impl DiscoveredFile {
    /// Split a path into base name and lower-cased extension.
    pub fn from_path(path: &Path) -> Self {
        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed_file".to_string());
        let source_extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        Self {
            absolute_path: path.to_path_buf(),
            base_name,
            source_extension,
        }
    }
}

/// What happened to one discovered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Imported and exported successfully.
    Converted,
    /// Target already existed and overwriting was disabled.
    SkippedExisting,
    /// Extension is not routed to any importer.
    SkippedUnsupported,
    /// Import, export or a filesystem step failed.
    Failed,
}

impl OutcomeStatus {
    /// Short label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converted => "converted",
            Self::SkippedExisting => "skipped (exists)",
            Self::SkippedUnsupported => "skipped (unsupported)",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step of the per-file cycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Clearing the working scene.
    Reset,
    /// Loading the source file.
    Import,
    /// Writing the target file.
    Export,
    /// Creating the destination directory or checking the target path.
    Filesystem,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reset => "reset",
            Self::Import => "import",
            Self::Export => "export",
            Self::Filesystem => "filesystem",
        };
        f.write_str(s)
    }
}

/// The error attached to a failed outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    /// Step that failed.
    pub stage: FailureStage,
    /// Rendered underlying error.
    pub message: String,
}

impl OutcomeError {
    /// Capture `error` as the failure of `stage`.
    pub fn new(stage: FailureStage, error: &dyn std::error::Error) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.message)
    }
}

/// Per-file result of a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Source file.
    pub source_path: PathBuf,
    /// Resolved output file. `None` for unsupported sources.
    pub target_path: Option<PathBuf>,
    /// Result.
    pub status: OutcomeStatus,
    /// Set if and only if `status` is `Failed`.
    pub error: Option<OutcomeError>,
}

impl ConversionOutcome {
    /// The file was converted to `target_path`.
    pub fn converted(source_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            source_path,
            target_path: Some(target_path),
            status: OutcomeStatus::Converted,
            error: None,
        }
    }

    /// `target_path` already existed and was left alone.
    pub fn skipped_existing(source_path: PathBuf, target_path: PathBuf) -> Self {
        Self {
            source_path,
            target_path: Some(target_path),
            status: OutcomeStatus::SkippedExisting,
            error: None,
        }
    }

    /// The source extension has no importer.
    pub fn skipped_unsupported(source_path: PathBuf) -> Self {
        Self {
            source_path,
            target_path: None,
            status: OutcomeStatus::SkippedUnsupported,
            error: None,
        }
    }

    /// Conversion of the file failed.
    pub fn failed(source_path: PathBuf, target_path: PathBuf, error: OutcomeError) -> Self {
        Self {
            source_path,
            target_path: Some(target_path),
            status: OutcomeStatus::Failed,
            error: Some(error),
        }
    }

    /// Returns `true` if the file was converted.
    pub fn is_converted(&self) -> bool {
        self.status == OutcomeStatus::Converted
    }
}
