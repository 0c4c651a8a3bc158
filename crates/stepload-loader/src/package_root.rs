//! Nearest package root discovery

use std::path::{Path, PathBuf};

use crate::paths::{is_inside, normalize};

/// Directory holding installed dependencies
pub const DEPENDENCY_DIR: &str = "node_modules";

/// A directory that contains a [`DEPENDENCY_DIR`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRoot {
    dir: PathBuf,
}

impl PackageRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn dependency_dir(&self) -> PathBuf {
        self.dir.join(DEPENDENCY_DIR)
    }

    /// Absolute path of an installed dependency named by a bare specifier,
    /// if it exists under this root's dependency directory.
    pub fn installed_package(&self, specifier: &str) -> Option<PathBuf> {
        let dependency_dir = self.dependency_dir();
        let candidate = normalize(&dependency_dir.join(specifier));
        if candidate != dependency_dir && is_inside(&candidate, &dependency_dir) && candidate.exists() {
            Some(candidate)
        } else {
            None
        }
    }
}

/// Walks up from `start` to the nearest directory (inclusive) containing a
/// dependency directory.
pub fn find_package_root(start: &Path) -> Option<PackageRoot> {
    let start = if start.is_absolute() {
        normalize(start)
    } else {
        normalize(&std::env::current_dir().ok()?.join(start))
    };

    let mut current = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start
    };

    loop {
        if current.join(DEPENDENCY_DIR).exists() {
            return Some(PackageRoot::new(current));
        }

        match current.parent() {
            Some(parent) if parent != current => current = parent.to_path_buf(),
            // Reached filesystem root
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nearest_root() {
        let tmp = TempDir::new().unwrap();
        let outer = tmp.path().join("outer");
        let inner = outer.join("packages/inner");
        fs::create_dir_all(outer.join(DEPENDENCY_DIR)).unwrap();
        fs::create_dir_all(inner.join(DEPENDENCY_DIR)).unwrap();
        fs::create_dir_all(inner.join("src/deep")).unwrap();

        let root = find_package_root(&inner.join("src/deep")).unwrap();
        assert_eq!(root.dir(), normalize(&inner));

        let root = find_package_root(&outer.join("packages")).unwrap();
        assert_eq!(root.dir(), normalize(&outer));
    }

    #[test]
    fn test_start_may_be_a_file_or_the_root_itself() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(DEPENDENCY_DIR)).unwrap();
        let file = tmp.path().join("index.js");
        fs::write(&file, "module.exports = 1;").unwrap();

        assert_eq!(find_package_root(&file).unwrap().dir(), normalize(tmp.path()));
        assert_eq!(find_package_root(tmp.path()).unwrap().dir(), normalize(tmp.path()));
    }

    #[test]
    fn test_installed_package_lookup() {
        let tmp = TempDir::new().unwrap();
        let root = PackageRoot::new(tmp.path());
        fs::create_dir_all(root.dependency_dir().join("left-pad")).unwrap();
        fs::create_dir_all(root.dependency_dir().join("@cucumber/cucumber")).unwrap();

        assert_eq!(
            root.installed_package("left-pad"),
            Some(normalize(&tmp.path().join("node_modules/left-pad")))
        );
        assert!(root.installed_package("@cucumber/cucumber").is_some());
        assert_eq!(root.installed_package("missing"), None);
        assert_eq!(root.installed_package("left-pad/../../escape"), None);
    }
}
