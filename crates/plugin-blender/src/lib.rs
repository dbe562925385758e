//! # Plugin Blender
//!
//! An [`AssetIo`](batchconv_core::AssetIo) backend that performs imports and
//! exports with a headless Blender process.
//!
//! Each export renders a Python script that starts from an empty home file,
//! runs the importers recorded since the last scene reset, optionally joins
//! the imported meshes, and writes the scene with the requested exporter.
//! Blender runs in `--background` mode, so the glTF exporter does not need a
//! 3D viewport context.
//!
//! ## Blender Discovery
//!
//! If no executable is configured, the plugin looks in the usual install
//! locations for the current platform and then on `PATH`.

pub mod backend;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod scripting;

pub use backend::BlenderAssetIo;
pub use config::{BlenderConfig, OperatorSet};
pub use discovery::{BlenderDiscovery, BlenderInstallation, DiscoveryMethod};
pub use error::BlenderError;
