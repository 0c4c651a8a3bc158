//! Load errors, each attributed to the step that failed

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use stepload_rewriter::RewriteError;
use thiserror::Error;

use crate::host::ExecutionError;

/// Which execution path a failing file took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Delegated to the host loader because it lives inside the project
    InTree,
    /// Compiled in the host's global scope
    Compile,
    /// Run in a sandbox scope
    Sandbox,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::InTree => write!(f, "loading"),
            Phase::Compile => write!(f, "compiling"),
            Phase::Sandbox => write!(f, "running in sandbox"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no node_modules directory found at or above {}", start.display())]
    Resolution { start: PathBuf },

    #[error("failed to require module '{name}'")]
    RequireModule {
        name: String,
        #[source]
        source: ExecutionError,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to rewrite {}", path.display())]
    Rewrite {
        path: PathBuf,
        #[source]
        source: RewriteError,
    },

    #[error("{phase} {} failed", path.display())]
    Execution {
        path: PathBuf,
        phase: Phase,
        #[source]
        source: ExecutionError,
    },

    #[error("failed to import {}", path.display())]
    Import {
        path: PathBuf,
        #[source]
        source: ExecutionError,
    },
}

impl LoadError {
    /// The file the failure is attributed to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::Read { path, .. }
            | LoadError::Rewrite { path, .. }
            | LoadError::Execution { path, .. }
            | LoadError::Import { path, .. } => Some(path),
            LoadError::Resolution { .. } | LoadError::RequireModule { .. } => None,
        }
    }

    /// Whether the failure comes down to a missing file, read directly or
    /// reported by the host anywhere in the source chain.
    pub fn is_not_found(&self) -> bool {
        let mut cause: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = cause {
            if err
                .downcast_ref::<io::Error>()
                .map_or(false, |io_err| io_err.kind() == io::ErrorKind::NotFound)
            {
                return true;
            }
            cause = err.source();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = LoadError::Execution {
            path: PathBuf::from("/p/steps.js"),
            phase: Phase::Sandbox,
            source: ExecutionError::new("boom"),
        };
        assert_eq!(err.to_string(), "running in sandbox /p/steps.js failed");
        assert_eq!(err.path(), Some(Path::new("/p/steps.js")));

        let err = LoadError::Read {
            path: PathBuf::from("/p/missing.js"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "failed to read /p/missing.js");
    }

    #[test]
    fn test_not_found_reported_by_the_host() {
        let missing = || ExecutionError::with_source("Cannot find module 'x'", io::Error::from(io::ErrorKind::NotFound));

        let err = LoadError::Execution {
            path: PathBuf::from("/p/features/missing.js"),
            phase: Phase::InTree,
            source: missing(),
        };
        assert!(err.is_not_found());

        let err = LoadError::RequireModule { name: "x".to_string(), source: missing() };
        assert!(err.is_not_found());

        let err = LoadError::Import {
            path: PathBuf::from("/p/esm.mjs"),
            source: ExecutionError::with_source("denied", io::Error::from(io::ErrorKind::PermissionDenied)),
        };
        assert!(!err.is_not_found());

        let err = LoadError::Execution {
            path: PathBuf::from("/p/steps.js"),
            phase: Phase::Compile,
            source: ExecutionError::new("SyntaxError"),
        };
        assert!(!err.is_not_found());
    }
}
