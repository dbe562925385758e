//! Extension → importer and target format → exporter routing.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::config::TargetFormat;

// ---------------------------------------------------------------------------
// Import table macro
// ---------------------------------------------------------------------------

macro_rules! define_import_table {
    ($($ext:literal => $capability:ident),* $(,)?) => {
        static IMPORT_TABLE: LazyLock<HashMap<&'static str, ImportCapability>> =
            LazyLock::new(|| HashMap::from([$(($ext, ImportCapability::$capability),)*]));

        impl FormatRegistry {
            /// All source extensions the registry routes to an importer.
            pub const SUPPORTED_EXTENSIONS: &'static [&'static str] = &[$($ext,)*];
        }
    };
}

define_import_table! {
    "gltf" => Gltf,
    "glb"  => Gltf,
    "obj"  => Obj,
    "stl"  => Stl,
    "fbx"  => Fbx,
}

/// Importer backend that handles a source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportCapability {
    /// glTF 2.0 importer (`.gltf` and `.glb`)
    Gltf,
    /// Wavefront OBJ importer
    Obj,
    /// STL importer
    Stl,
    /// FBX importer
    Fbx,
}

impl ImportCapability {
    /// Capability tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Gltf => "gltf-importer",
            Self::Obj => "obj-importer",
            Self::Stl => "stl-importer",
            Self::Fbx => "fbx-importer",
        }
    }
}

impl fmt::Display for ImportCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Exporter backend that writes a target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportCapability {
    /// FBX exporter
    Fbx,
    /// Wavefront OBJ exporter
    Obj,
    /// glTF 2.0 exporter, writes both `.gltf` and `.glb`
    Gltf,
}

impl ExportCapability {
    /// Capability tag name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Fbx => "fbx-exporter",
            Self::Obj => "obj-exporter",
            Self::Gltf => "gltf-exporter",
        }
    }
}

impl fmt::Display for ExportCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Container layout used by the glTF exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GltfExportMode {
    /// `.gltf` + `.bin` + texture files side by side
    Separate,
    /// Single `.gltf` with buffers and textures embedded as data URIs
    Embedded,
    /// Single binary `.glb`
    Glb,
}

impl GltfExportMode {
    /// Display name for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Separate => "separate",
            Self::Embedded => "embedded",
            Self::Glb => "glb",
        }
    }
}

impl fmt::Display for GltfExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to write a given target format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExportSpec {
    /// Output file extension, including the leading dot.
    pub extension: &'static str,
    /// Exporter that writes the file.
    pub capability: ExportCapability,
    /// Container layout, set for glTF-family targets only.
    pub gltf_mode: Option<GltfExportMode>,
}

/// Static routing tables for source and target formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatRegistry;

impl FormatRegistry {
    /// Create the registry.
    pub fn new() -> Self {
        Self
    }

    /// Look up the importer for a source extension.
    ///
    /// Case-insensitive; a leading dot is accepted.
    pub fn import_capability_for(&self, extension: &str) -> Option<ImportCapability> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        IMPORT_TABLE.get(ext.as_str()).copied()
    }

    /// Check whether a source extension is routed to any importer.
    pub fn is_supported(&self, extension: &str) -> bool {
        self.import_capability_for(extension).is_some()
    }

    /// Resolve the extension, exporter and container layout for a target.
    ///
    /// `export_separate_textures` selects between the separate and embedded
    /// layouts for `GLTF` and is ignored for every other format.
    pub fn export_spec_for(
        &self,
        target_format: TargetFormat,
        export_separate_textures: bool,
    ) -> ExportSpec {
        match target_format {
            TargetFormat::Fbx => ExportSpec {
                extension: ".fbx",
                capability: ExportCapability::Fbx,
                gltf_mode: None,
            },
            TargetFormat::Obj => ExportSpec {
                extension: ".obj",
                capability: ExportCapability::Obj,
                gltf_mode: None,
            },
            TargetFormat::Gltf => ExportSpec {
                extension: ".gltf",
                capability: ExportCapability::Gltf,
                gltf_mode: Some(if export_separate_textures {
                    GltfExportMode::Separate
                } else {
                    GltfExportMode::Embedded
                }),
            },
            TargetFormat::Glb => ExportSpec {
                extension: ".glb",
                capability: ExportCapability::Gltf,
                gltf_mode: Some(GltfExportMode::Glb),
            },
        }
    }

    /// Every supported source extension with its importer, sorted by extension.
    pub fn import_entries(&self) -> Vec<(&'static str, ImportCapability)> {
        let mut entries: Vec<_> = IMPORT_TABLE.iter().map(|(ext, cap)| (*ext, *cap)).collect();
        entries.sort_by_key(|(ext, _)| *ext);
        entries
    }
}
