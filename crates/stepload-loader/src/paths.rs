//! Specifier classification and lexical path arithmetic

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// How a dependency specifier is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    /// `/abs/file.js` or `C:\abs\file.js`
    Absolute,
    /// `./file.js` or `../file.js`
    Relative,
    /// Package name, looked up in installed dependencies
    Bare,
}

impl fmt::Display for SpecifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecifierKind::Absolute => write!(f, "absolute"),
            SpecifierKind::Relative => write!(f, "relative"),
            SpecifierKind::Bare => write!(f, "bare"),
        }
    }
}

pub fn is_absolute(specifier: &str) -> bool {
    specifier.starts_with('/') || has_drive_prefix(specifier)
}

pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

pub fn is_path(specifier: &str) -> bool {
    is_absolute(specifier) || is_relative(specifier)
}

pub fn classify(specifier: &str) -> SpecifierKind {
    if is_absolute(specifier) {
        SpecifierKind::Absolute
    } else if is_relative(specifier) {
        SpecifierKind::Relative
    } else {
        SpecifierKind::Bare
    }
}

/// `X:\` or `X:/`
fn has_drive_prefix(specifier: &str) -> bool {
    let bytes = specifier.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'\\' | b'/')
}

/// Removes `.` components and folds `..` into the preceding component,
/// without touching the filesystem. `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(comp),
            },
            _ => components.push(comp),
        }
    }
    components.iter().collect()
}

/// Resolves `path` against `base` when relative, then normalizes.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Lexical relative path from `from` to `to`. When the two paths share no
/// root (different drives), `to` is returned as is.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let from_parts: Vec<Component> = from.components().collect();
    let to_parts: Vec<Component> = to.components().collect();

    let same_root = match (from_parts.first(), to_parts.first()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) => a == b,
        (Some(Component::Prefix(_)), _) | (_, Some(Component::Prefix(_))) => false,
        _ => from.is_absolute() == to.is_absolute(),
    };
    if !same_root {
        return to;
    }

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from_parts.len() {
        result.push("..");
    }
    for part in &to_parts[common..] {
        result.push(part.as_os_str());
    }
    result
}

/// True if `subject` is `root` itself or lies beneath it.
pub fn is_inside(subject: &Path, root: &Path) -> bool {
    let rel = relative(root, subject);
    !matches!(rel.components().next(), Some(Component::ParentDir)) && !rel.is_absolute() && !rel.has_root()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("/usr/lib/x.js"), SpecifierKind::Absolute);
        assert_eq!(classify("C:\\steps\\x.js"), SpecifierKind::Absolute);
        assert_eq!(classify("d:/steps/x.js"), SpecifierKind::Absolute);
        assert_eq!(classify("./x"), SpecifierKind::Relative);
        assert_eq!(classify("../x"), SpecifierKind::Relative);
        assert_eq!(classify("left-pad"), SpecifierKind::Bare);
        assert_eq!(classify("@cucumber/cucumber"), SpecifierKind::Bare);
        assert_eq!(classify("."), SpecifierKind::Bare);
        assert_eq!(classify(".hidden"), SpecifierKind::Bare);
        assert_eq!(classify("C:"), SpecifierKind::Bare);
        assert_eq!(classify(""), SpecifierKind::Bare);
    }

    #[test]
    fn test_is_path_matches_classification() {
        for spec in ["/a", "./a", "../a", "a", "@s/a", "C:\\a", "1:/a", "..", "", "\\\\server\\share"] {
            assert_eq!(is_path(spec), is_absolute(spec) || is_relative(spec));
            assert_eq!(is_path(spec), classify(spec) != SpecifierKind::Bare);
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_relative() {
        assert_eq!(relative(Path::new("/p/root"), Path::new("/p/root/a/b.js")), PathBuf::from("a/b.js"));
        assert_eq!(relative(Path::new("/p/root"), Path::new("/p/other/x.js")), PathBuf::from("../other/x.js"));
        assert_eq!(relative(Path::new("/p/root"), Path::new("/p/root")), PathBuf::new());
    }

    #[test]
    fn test_is_inside() {
        let root = Path::new("/work/project");
        assert!(is_inside(root, root));
        assert!(is_inside(Path::new("/work/project/features/steps.js"), root));
        assert!(is_inside(Path::new("/work/project/a/b"), root));
        assert!(!is_inside(Path::new("/work"), root));
        assert!(!is_inside(Path::new("/work/project-other/steps.js"), root));
        assert!(!is_inside(Path::new("/elsewhere/steps.js"), root));
        assert!(!is_inside(Path::new("/work/project/../sibling/x.js"), root));
        assert!(is_inside(Path::new("/work/project/features/../steps.js"), root));
    }
}
