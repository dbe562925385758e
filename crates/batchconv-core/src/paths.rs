//! Target path derivation and destination directory creation.

use std::path::{Path, PathBuf};

use crate::error::ConvertError;

/// Where a converted asset will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Full path of the output file.
    pub path: PathBuf,
    /// Directory that must exist before the file is written.
    pub directory: PathBuf,
    /// Whether `directory` is a per-asset subfolder of the target root.
    pub is_subfolder: bool,
}

/// Computes output paths from the target root and a source file's base name.
pub struct PathResolver;

impl PathResolver {
    /// Resolve the output path for `base_name`.
    ///
    /// With `export_to_subfolders` the file goes to
    /// `target_root/base_name/base_name.ext`, otherwise to
    /// `target_root/base_name.ext`. The extension may be given with or
    /// without its leading dot. Dots inside `base_name` are preserved.
    pub fn resolve(
        target_root: &Path,
        base_name: &str,
        extension: &str,
        export_to_subfolders: bool,
    ) -> ResolvedTarget {
        let file_name = format!("{}.{}", base_name, extension.trim_start_matches('.'));

        if export_to_subfolders {
            let directory = target_root.join(base_name);
            ResolvedTarget {
                path: directory.join(file_name),
                directory,
                is_subfolder: true,
            }
        } else {
            ResolvedTarget {
                path: target_root.join(file_name),
                directory: target_root.to_path_buf(),
                is_subfolder: false,
            }
        }
    }

    /// Create `path` and any missing parents. A directory that already
    /// exists is not an error.
    pub fn ensure_directory(path: &Path) -> Result<(), ConvertError> {
        std::fs::create_dir_all(path).map_err(|source| ConvertError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_subfolder() {
        let target = PathResolver::resolve(Path::new("/out"), "statue", ".glb", true);
        assert_eq!(target.path, PathBuf::from("/out/statue/statue.glb"));
        assert_eq!(target.directory, PathBuf::from("/out/statue"));
        assert!(target.is_subfolder);
    }

    #[test]
    fn test_resolve_flat() {
        let target = PathResolver::resolve(Path::new("/out"), "statue", ".glb", false);
        assert_eq!(target.path, PathBuf::from("/out/statue.glb"));
        assert_eq!(target.directory, PathBuf::from("/out"));
        assert!(!target.is_subfolder);
    }

    #[test]
    fn test_resolve_keeps_inner_dots_and_accepts_bare_extension() {
        let target = PathResolver::resolve(Path::new("/out"), "tree.v2", "fbx", false);
        assert_eq!(target.path, PathBuf::from("/out/tree.v2.fbx"));
    }

    #[test]
    fn test_ensure_directory_creates_subfolder_idempotently() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("out");
        let target = PathResolver::resolve(&root, "statue", ".glb", true);

        PathResolver::ensure_directory(&target.directory).expect("first");
        assert!(target.directory.is_dir());
        assert_eq!(target.path, root.join("statue").join("statue.glb"));

        PathResolver::ensure_directory(&target.directory).expect("second");
        assert!(target.directory.is_dir());
    }

    #[test]
    fn test_ensure_directory_fails_on_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let blocker = temp.path().join("statue");
        std::fs::write(&blocker, b"not a dir").expect("write");

        let err = PathResolver::ensure_directory(&blocker).expect_err("file in the way");
        assert!(matches!(err, ConvertError::CreateDir { .. }));
    }
}
