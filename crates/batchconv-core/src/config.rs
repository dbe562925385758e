//! Conversion request and its deserializable settings form.
//!
//! [`RequestSettings`] is what a configuration file or command line produces.
//! It is validated once into an immutable [`ConversionRequest`] that the
//! engine borrows for the duration of a run.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Output format of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetFormat {
    /// Autodesk FBX
    Fbx,
    /// Wavefront OBJ
    Obj,
    /// glTF 2.0, JSON container
    Gltf,
    /// glTF 2.0, binary container
    Glb,
}

impl TargetFormat {
    /// Every target format, in display order.
    pub const ALL: [TargetFormat; 4] = [Self::Fbx, Self::Obj, Self::Gltf, Self::Glb];

    /// Canonical upper-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fbx => "FBX",
            Self::Obj => "OBJ",
            Self::Gltf => "GLTF",
            Self::Glb => "GLB",
        }
    }

    /// Returns `true` for the formats written by the glTF exporter.
    ///
    /// Compression and texture layout options only apply to these.
    pub fn is_gltf_family(&self) -> bool {
        matches!(self, Self::Gltf | Self::Glb)
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FBX" => Ok(Self::Fbx),
            "OBJ" => Ok(Self::Obj),
            "GLTF" => Ok(Self::Gltf),
            "GLB" => Ok(Self::Glb),
            _ => Err(ConvertError::UnsupportedTargetFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// A validated, immutable description of one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Folder to scan for source assets.
    pub source_root: PathBuf,
    /// Folder that receives converted assets. Created on demand.
    pub target_root: PathBuf,
    /// Output format.
    pub target_format: TargetFormat,
    /// Ask the exporter to merge mesh objects into one.
    pub merge_objects: bool,
    /// Replace target files that already exist.
    pub overwrite_files: bool,
    /// Compress geometry (glTF/GLB only).
    pub use_compression: bool,
    /// Write textures next to the `.gltf` file instead of embedding them (glTF only).
    pub export_separate_textures: bool,
    /// Descend into subfolders of the source folder.
    pub include_subfolders: bool,
    /// Write each converted asset into its own `<target>/<name>/` folder.
    pub export_to_subfolders: bool,
}

impl ConversionRequest {
    /// Create a request with the default options.
    ///
    /// Every flag is off except `merge_objects`.
    pub fn new(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        target_format: TargetFormat,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            target_format,
            merge_objects: true,
            overwrite_files: false,
            use_compression: false,
            export_separate_textures: false,
            include_subfolders: false,
            export_to_subfolders: false,
        }
    }
}

/// Conversion settings as read from a configuration file or the command line.
///
/// The target format is kept as a string so that an unknown value surfaces
/// as a configuration error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Folder to scan for source assets.
    pub source_folder: PathBuf,
    /// Folder that receives converted assets.
    pub target_folder: PathBuf,
    /// One of `FBX`, `OBJ`, `GLTF`, `GLB` (case-insensitive).
    pub target_format: String,
    /// Ask the exporter to merge mesh objects into one.
    pub merge_objects: bool,
    /// Replace target files that already exist.
    pub overwrite_files: bool,
    /// Compress geometry (glTF/GLB only).
    pub use_compression: bool,
    /// Write textures separately (glTF only).
    pub export_separate_textures: bool,
    /// Descend into subfolders of the source folder.
    pub include_subfolders: bool,
    /// Write each converted asset into its own folder.
    pub export_to_subfolders: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::new(),
            target_folder: PathBuf::new(),
            target_format: TargetFormat::Fbx.as_str().to_string(),
            merge_objects: true,
            overwrite_files: false,
            use_compression: false,
            export_separate_textures: false,
            include_subfolders: false,
            export_to_subfolders: false,
        }
    }
}

impl RequestSettings {
    /// Validate the settings and freeze them into a [`ConversionRequest`].
    pub fn into_request(self) -> Result<ConversionRequest, ConvertError> {
        let target_format = self.target_format.parse::<TargetFormat>()?;

        if self.source_folder.as_os_str().is_empty() {
            return Err(ConvertError::InvalidRequest {
                reason: "source folder is not set".to_string(),
            });
        }
        if self.target_folder.as_os_str().is_empty() {
            return Err(ConvertError::InvalidRequest {
                reason: "target folder is not set".to_string(),
            });
        }

        Ok(ConversionRequest {
            source_root: self.source_folder,
            target_root: self.target_folder,
            target_format,
            merge_objects: self.merge_objects,
            overwrite_files: self.overwrite_files,
            use_compression: self.use_compression,
            export_separate_textures: self.export_separate_textures,
            include_subfolders: self.include_subfolders,
            export_to_subfolders: self.export_to_subfolders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_format_parse_case_insensitive() {
        assert_eq!("glb".parse::<TargetFormat>().expect("glb"), TargetFormat::Glb);
        assert_eq!(" Gltf ".parse::<TargetFormat>().expect("gltf"), TargetFormat::Gltf);
        assert_eq!("FBX".parse::<TargetFormat>().expect("fbx"), TargetFormat::Fbx);
    }

    #[test]
    fn test_target_format_parse_unknown_is_configuration_error() {
        let err = "STL".parse::<TargetFormat>().expect_err("stl is input-only");
        assert!(matches!(err, ConvertError::UnsupportedTargetFormat { ref value } if value == "STL"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_request_defaults() {
        let request = ConversionRequest::new("/src", "/out", TargetFormat::Obj);
        assert!(request.merge_objects);
        assert!(!request.overwrite_files);
        assert!(!request.use_compression);
        assert!(!request.export_separate_textures);
        assert!(!request.include_subfolders);
        assert!(!request.export_to_subfolders);
    }

    #[test]
    fn test_settings_into_request() {
        let settings = RequestSettings {
            source_folder: PathBuf::from("/assets"),
            target_folder: PathBuf::from("/converted"),
            target_format: "glb".to_string(),
            use_compression: true,
            ..Default::default()
        };
        let request = settings.into_request().expect("valid settings");
        assert_eq!(request.target_format, TargetFormat::Glb);
        assert_eq!(request.source_root, PathBuf::from("/assets"));
        assert!(request.use_compression);
        assert!(request.merge_objects);
    }

    #[test]
    fn test_settings_missing_folders_rejected() {
        let settings = RequestSettings {
            target_folder: PathBuf::from("/converted"),
            ..Default::default()
        };
        let err = settings.into_request().expect_err("no source folder");
        assert!(matches!(err, ConvertError::InvalidRequest { .. }));
    }

    #[test]
    fn test_settings_unknown_format_rejected() {
        let settings = RequestSettings {
            source_folder: PathBuf::from("/a"),
            target_folder: PathBuf::from("/b"),
            target_format: "usdz".to_string(),
            ..Default::default()
        };
        let err = settings.into_request().expect_err("usdz unsupported");
        assert!(matches!(err, ConvertError::UnsupportedTargetFormat { .. }));
    }

    #[test]
    fn test_toml_deserialization_partial() {
        let toml_str = "source_folder = \"/in\"\ntarget_folder = \"/out\"\ntarget_format = \"gltf\"\n";
        let settings: RequestSettings = toml::from_str(toml_str).expect("parse toml");
        assert!(settings.merge_objects);
        assert!(!settings.overwrite_files);
        let request = settings.into_request().expect("valid");
        assert_eq!(request.target_format, TargetFormat::Gltf);
    }
}
