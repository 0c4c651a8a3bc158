//! Capabilities the loader needs from the embedding runtime

use std::error::Error;
use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use url::Url;

use crate::config::LoadOptions;
use crate::context::ExecutionContext;
use crate::ids::IdGenerator;

/// A rewritten source file ready for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub source: String,
    /// Name the host should attribute diagnostics to
    pub filename: String,
}

impl Script {
    pub fn new(source: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            filename: filename.into(),
        }
    }
}

/// Failure reported by the host while loading or running code
#[derive(Debug)]
pub struct ExecutionError {
    message: String,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ExecutionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// The host's native module loader.
pub trait HostLoader {
    /// Loads a module by name for its side effects.
    fn require_module(&self, name: &str) -> Result<(), ExecutionError>;

    /// Loads a file through the native loader, which resolves its own
    /// dependencies.
    fn require_file(&self, path: &Path) -> Result<(), ExecutionError>;

    /// Compiles and evaluates rewritten source in the host's global scope.
    fn compile(&self, script: &Script) -> Result<(), ExecutionError>;
}

/// Isolated evaluation of rewritten source.
pub trait Sandbox {
    /// Creates a scope whose globals are the bindings of `context`.
    fn create_scope<'s>(&'s self, context: &'s ExecutionContext) -> Result<Box<dyn Scope + 's>, ExecutionError>;
}

pub trait Scope {
    fn run_script(&mut self, script: &Script) -> Result<(), ExecutionError>;
}

/// Dynamic import of an entry point, e.g. an ES module.
#[async_trait(?Send)]
pub trait Importer {
    async fn import(&self, url: &Url) -> Result<(), ExecutionError>;
}

/// Receives step definitions and hooks while support code runs.
pub trait SupportCodeRegistry {
    type Snapshot;

    /// Clears previous state. Called once before anything is loaded.
    fn reset(&mut self, cwd: &Path, new_id: IdGenerator, options: &LoadOptions);

    /// Returns everything registered since the last reset.
    fn finalize(&mut self) -> Self::Snapshot;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_execution_error_keeps_its_cause() {
        let cause = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = ExecutionError::with_source("Cannot find module 'x'", cause);
        assert_eq!(err.to_string(), "Cannot find module 'x'");
        assert_eq!(err.source().map(|e| e.to_string()), Some("gone".to_string()));
        assert!(ExecutionError::new("plain").source().is_none());
    }
}
