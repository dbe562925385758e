//! # batchconv-core
//!
//! The batch conversion pipeline for 3D asset files. Walks a source folder,
//! routes every recognised file (glTF, GLB, OBJ, STL, FBX) through an
//! [`AssetIo`] backend that imports it into an empty working scene, and
//! exports the scene in the requested target format.
//!
//! The crate owns orchestration only: traversal, format routing, target path
//! derivation, the overwrite policy and per-file failure isolation. Parsing
//! and writing the file formats themselves is the backend's job.
//!
//! This crate has **no** dependency on any concrete backend.

pub mod asset_io;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod models;
pub mod paths;
pub mod summary;

pub use asset_io::{AssetIo, AssetIoError, ExportOptions, SelectionScope};
pub use config::{ConversionRequest, RequestSettings, TargetFormat};
pub use engine::{ConversionEngine, RunReport};
pub use error::ConvertError;
pub use formats::registry::{
    ExportCapability, ExportSpec, FormatRegistry, GltfExportMode, ImportCapability,
};
pub use models::{ConversionOutcome, DiscoveredFile, FailureStage, OutcomeError, OutcomeStatus};
pub use paths::{PathResolver, ResolvedTarget};
pub use summary::RunSummary;
