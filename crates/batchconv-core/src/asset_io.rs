//! Capability interface to the engine that actually reads and writes assets.
//!
//! An [`AssetIo`] owns a single working scene. The conversion engine resets
//! it before every file, imports one source into it and exports its whole
//! contents. Implementations are driven from one thread, one call at a time.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConversionRequest;
use crate::formats::registry::{ExportCapability, ExportSpec, GltfExportMode, ImportCapability};
use crate::models::FailureStage;

/// Which objects of the working scene an export covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionScope {
    /// Everything in the scene, regardless of selection.
    #[default]
    WholeScene,
    /// Only the currently selected objects.
    Selection,
}

/// Options handed to the exporter for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Compress geometry. Always `false` for non-glTF targets.
    pub compress: bool,
    /// glTF container layout. `None` for non-glTF targets.
    pub gltf_mode: Option<GltfExportMode>,
    /// Objects covered by the export.
    pub selection_scope: SelectionScope,
    /// Merge mesh objects into one before writing.
    pub merge_objects: bool,
}

impl ExportOptions {
    /// Derive the export options for `request`.
    ///
    /// glTF-only flags are cleared for FBX and OBJ targets so they can never
    /// influence those exporters.
    pub fn for_request(request: &ConversionRequest, spec: &ExportSpec) -> Self {
        let gltf_target = request.target_format.is_gltf_family();
        Self {
            compress: gltf_target && request.use_compression,
            gltf_mode: if gltf_target { spec.gltf_mode } else { None },
            selection_scope: SelectionScope::WholeScene,
            merge_objects: request.merge_objects,
        }
    }
}

/// Errors reported by an asset I/O backend.
#[derive(Debug, Error)]
pub enum AssetIoError {
    /// The working scene could not be cleared.
    #[error("Failed to reset working scene: {reason}")]
    SceneResetFailed {
        /// Backend-specific description.
        reason: String,
    },

    /// The importer rejected the source file.
    #[error("Import of {path} failed: {reason}")]
    ImportFailed {
        /// Source file.
        path: PathBuf,
        /// Backend-specific description.
        reason: String,
    },

    /// The exporter could not write the target file.
    #[error("Export to {path} failed: {reason}")]
    ExportFailed {
        /// Target file.
        path: PathBuf,
        /// Backend-specific description.
        reason: String,
    },

    /// The backend has no context in which the exporter can run.
    #[error("No export context available for {capability} writing {path}")]
    NoExportContext {
        /// Exporter that needed the context.
        capability: ExportCapability,
        /// Target file.
        path: PathBuf,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetIoError {
    /// The pipeline step this error belongs to, when the error itself says so.
    ///
    /// Backends that defer work (a deferred import runs during the export
    /// call) report failures through whichever trait method triggered them;
    /// the variant still names the step that actually failed.
    pub fn reported_stage(&self) -> Option<FailureStage> {
        match self {
            Self::SceneResetFailed { .. } => Some(FailureStage::Reset),
            Self::ImportFailed { .. } => Some(FailureStage::Import),
            Self::ExportFailed { .. } | Self::NoExportContext { .. } => Some(FailureStage::Export),
            Self::Io(_) => None,
        }
    }
}

/// Import/export operations of a 3D engine.
pub trait AssetIo {
    /// Discard everything loaded so far and return to an empty scene.
    fn reset_scene(&mut self) -> Result<(), AssetIoError>;

    /// Load `path` into the working scene with the given importer.
    fn import_asset(
        &mut self,
        path: &Path,
        capability: ImportCapability,
    ) -> Result<(), AssetIoError>;

    /// Write the working scene to `path` with the given exporter.
    fn export_asset(
        &mut self,
        path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
    ) -> Result<(), AssetIoError>;
}

impl<T: AssetIo + ?Sized> AssetIo for &mut T {
    fn reset_scene(&mut self) -> Result<(), AssetIoError> {
        (**self).reset_scene()
    }

    fn import_asset(
        &mut self,
        path: &Path,
        capability: ImportCapability,
    ) -> Result<(), AssetIoError> {
        (**self).import_asset(path, capability)
    }

    fn export_asset(
        &mut self,
        path: &Path,
        capability: ExportCapability,
        options: &ExportOptions,
    ) -> Result<(), AssetIoError> {
        (**self).export_asset(path, capability, options)
    }
}
