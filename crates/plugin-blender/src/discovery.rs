//! Blender installation discovery and validation.
//!
//! Locates the Blender executable by checking:
//! 1. An explicitly configured path (file or install directory)
//! 2. Common installation directories for the current platform
//! 3. The system PATH

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::BlenderError;

/// File name of the Blender executable on this platform.
#[cfg(windows)]
pub const BLENDER_EXECUTABLE: &str = "blender.exe";
/// File name of the Blender executable on this platform.
#[cfg(not(windows))]
pub const BLENDER_EXECUTABLE: &str = "blender";

/// Information about a discovered Blender installation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlenderInstallation {
    /// Full path to the Blender executable.
    pub executable: PathBuf,
    /// Directory containing the executable.
    pub install_dir: PathBuf,
    /// How the installation was discovered.
    pub discovery_method: DiscoveryMethod,
}

/// How the Blender installation was discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Found in a common installation directory.
    CommonPath,
    /// Found via the system PATH environment variable.
    SystemPath,
    /// Explicitly configured by the user.
    ExplicitConfig,
}

/// Blender installation discovery engine.
pub struct BlenderDiscovery;

impl BlenderDiscovery {
    /// Attempt to discover a Blender installation.
    ///
    /// Returns the first installation found in common install directories,
    /// then on `PATH`.
    pub fn discover() -> Result<BlenderInstallation, BlenderError> {
        info!("Searching for Blender installation...");

        match Self::discover_from_common_paths() {
            Some(installation) => {
                info!(
                    path = %installation.executable.display(),
                    "Found Blender in common installation path"
                );
                return Ok(installation);
            }
            None => debug!("Common path discovery failed, trying PATH"),
        }

        match Self::discover_from_path() {
            Some(installation) => {
                info!(
                    path = %installation.executable.display(),
                    "Found Blender in system PATH"
                );
                return Ok(installation);
            }
            None => debug!("PATH discovery failed"),
        }

        Err(BlenderError::NotFound {
            searched: "common install paths, PATH".to_string(),
        })
    }

    /// Discover Blender from common installation directories.
    fn discover_from_common_paths() -> Option<BlenderInstallation> {
        for candidate_dir in Self::common_install_paths() {
            if !candidate_dir.is_dir() {
                continue;
            }

            if let Some(executable) = Self::find_executable(&candidate_dir, 1) {
                return Some(Self::installation(executable, DiscoveryMethod::CommonPath));
            }
        }

        None
    }

    /// Generate common installation path candidates.
    fn common_install_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        #[cfg(windows)]
        {
            for var in ["ProgramFiles", "ProgramFiles(x86)"] {
                if let Ok(pf) = std::env::var(var) {
                    // Versioned folders, e.g. "Blender 4.2", are one level down.
                    paths.push(PathBuf::from(pf).join("Blender Foundation"));
                }
            }
            paths.push(PathBuf::from("C:/Program Files/Blender Foundation"));
        }

        #[cfg(target_os = "macos")]
        {
            paths.push(PathBuf::from("/Applications/Blender.app/Contents/MacOS"));
            if let Ok(home) = std::env::var("HOME") {
                paths.push(PathBuf::from(home).join("Applications/Blender.app/Contents/MacOS"));
            }
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            paths.push(PathBuf::from("/usr/bin"));
            paths.push(PathBuf::from("/usr/local/bin"));
            paths.push(PathBuf::from("/snap/bin"));
            paths.push(PathBuf::from("/opt/blender"));
        }

        paths
    }

    /// Discover Blender from the system PATH.
    fn discover_from_path() -> Option<BlenderInstallation> {
        let path_var = std::env::var_os("PATH")?;

        std::env::split_paths(&path_var)
            .map(|dir| dir.join(BLENDER_EXECUTABLE))
            .find(|candidate| candidate.is_file())
            .map(|executable| Self::installation(executable, DiscoveryMethod::SystemPath))
    }

    /// Search `dir` and up to `max_depth` levels below it for the executable.
    fn find_executable(dir: &Path, max_depth: usize) -> Option<PathBuf> {
        Self::find_executable_inner(dir, max_depth, 0)
    }

    /// Inner recursive search with depth tracking.
    fn find_executable_inner(
        dir: &Path,
        max_depth: usize,
        current_depth: usize,
    ) -> Option<PathBuf> {
        if current_depth > max_depth {
            return None;
        }

        let candidate = dir.join(BLENDER_EXECUTABLE);
        if candidate.is_file() {
            return Some(candidate);
        }

        let mut subdirs: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        // Newest version first when folders are named "Blender 4.1", "Blender 4.2", ...
        subdirs.sort();
        subdirs.reverse();

        subdirs
            .iter()
            .find_map(|sub| Self::find_executable_inner(sub, max_depth, current_depth + 1))
    }

    /// Create a `BlenderInstallation` from an explicitly configured path.
    ///
    /// Accepts the executable itself or a directory containing it (directly
    /// or one level down).
    pub fn from_explicit_path(path: &Path) -> Result<BlenderInstallation, BlenderError> {
        if path.is_file() {
            return Ok(Self::installation(
                path.to_path_buf(),
                DiscoveryMethod::ExplicitConfig,
            ));
        }

        if path.is_dir() {
            if let Some(executable) = Self::find_executable(path, 1) {
                return Ok(Self::installation(executable, DiscoveryMethod::ExplicitConfig));
            }
        }

        Err(BlenderError::NotFound {
            searched: path.display().to_string(),
        })
    }

    fn installation(executable: PathBuf, discovery_method: DiscoveryMethod) -> BlenderInstallation {
        let install_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        BlenderInstallation {
            executable,
            install_dir,
            discovery_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let exe = temp.path().join(BLENDER_EXECUTABLE);
        std::fs::write(&exe, "").expect("write");

        let inst = BlenderDiscovery::from_explicit_path(&exe).expect("found");
        assert_eq!(inst.executable, exe);
        assert_eq!(inst.install_dir, temp.path());
        assert_eq!(inst.discovery_method, DiscoveryMethod::ExplicitConfig);
    }

    #[test]
    fn test_explicit_directory_searches_one_level_down() {
        let temp = tempfile::tempdir().expect("tempdir");
        let versioned = temp.path().join("Blender 4.2");
        std::fs::create_dir_all(&versioned).expect("mkdir");
        let exe = versioned.join(BLENDER_EXECUTABLE);
        std::fs::write(&exe, "").expect("write");

        let inst = BlenderDiscovery::from_explicit_path(temp.path()).expect("found");
        assert_eq!(inst.executable, exe);
    }

    #[test]
    fn test_prefers_newest_versioned_folder() {
        let temp = tempfile::tempdir().expect("tempdir");
        for version in ["Blender 3.6", "Blender 4.2"] {
            let dir = temp.path().join(version);
            std::fs::create_dir_all(&dir).expect("mkdir");
            std::fs::write(dir.join(BLENDER_EXECUTABLE), "").expect("write");
        }

        let found = BlenderDiscovery::find_executable(temp.path(), 1).expect("found");
        assert!(found.to_string_lossy().contains("Blender 4.2"));
    }

    #[test]
    fn test_explicit_missing_path() {
        let result = BlenderDiscovery::from_explicit_path(Path::new("/nonexistent/blender"));
        assert!(matches!(result, Err(BlenderError::NotFound { .. })));
    }

    #[test]
    fn test_depth_limit() {
        let temp = tempfile::tempdir().expect("tempdir");
        let deep = temp.path().join("a").join("b");
        std::fs::create_dir_all(&deep).expect("mkdir");
        std::fs::write(deep.join(BLENDER_EXECUTABLE), "").expect("write");

        assert!(BlenderDiscovery::find_executable(temp.path(), 1).is_none());
        assert!(BlenderDiscovery::find_executable(temp.path(), 2).is_some());
    }
}
