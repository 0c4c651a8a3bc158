//! A host and registry that record what the loader asks of them
//!
//! Nothing is executed. `RecordingHost` logs every capability call in
//! order, fails any call whose target was registered with
//! [`RecordingHost::fail_on`], and reports a missing file the way a
//! native loader would. The `plan` subcommand and the tests run the real
//! load flow against it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use url::Url;

use crate::config::LoadOptions;
use crate::context::ExecutionContext;
use crate::host::{ExecutionError, HostLoader, Importer, Sandbox, Scope, Script, SupportCodeRegistry};
use crate::ids::IdGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    RequireModule(String),
    RequireFile(PathBuf),
    Compile(Script),
    RunInScope { script: Script, bindings: Vec<String> },
    Import(Url),
}

impl fmt::Display for HostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostAction::RequireModule(name) => write!(f, "require-module {}", name),
            HostAction::RequireFile(path) => write!(f, "require-file   {}", path.display()),
            HostAction::Compile(script) => write!(f, "compile        {}", script.filename),
            HostAction::RunInScope { script, bindings } => {
                write!(f, "sandbox        {} [{}]", script.filename, bindings.join(", "))
            }
            HostAction::Import(url) => write!(f, "import         {}", url),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    actions: RefCell<Vec<HostAction>>,
    failures: HashMap<String, String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the call targeting `target` fail with `message`. The target is
    /// a module name, a file path, a script filename or an import URL.
    pub fn fail_on(mut self, target: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.insert(target.into(), message.into());
        self
    }

    pub fn actions(&self) -> Vec<HostAction> {
        self.actions.borrow().clone()
    }

    fn record(&self, target: &str, action: HostAction) -> Result<(), ExecutionError> {
        self.actions.borrow_mut().push(action);
        match self.failures.get(target) {
            Some(message) => Err(ExecutionError::new(message.clone())),
            None => Ok(()),
        }
    }
}

impl HostLoader for RecordingHost {
    fn require_module(&self, name: &str) -> Result<(), ExecutionError> {
        self.record(name, HostAction::RequireModule(name.to_string()))
    }

    fn require_file(&self, path: &Path) -> Result<(), ExecutionError> {
        let target = path.to_string_lossy();
        self.record(&target, HostAction::RequireFile(path.to_path_buf()))?;
        if !path.is_file() {
            return Err(ExecutionError::with_source(
                format!("Cannot find module '{}'", path.display()),
                io::Error::from(io::ErrorKind::NotFound),
            ));
        }
        Ok(())
    }

    fn compile(&self, script: &Script) -> Result<(), ExecutionError> {
        self.record(&script.filename, HostAction::Compile(script.clone()))
    }
}

impl Sandbox for RecordingHost {
    fn create_scope<'s>(&'s self, context: &'s ExecutionContext) -> Result<Box<dyn Scope + 's>, ExecutionError> {
        Ok(Box::new(RecordingScope {
            host: self,
            context,
        }))
    }
}

struct RecordingScope<'s> {
    host: &'s RecordingHost,
    context: &'s ExecutionContext,
}

impl Scope for RecordingScope<'_> {
    fn run_script(&mut self, script: &Script) -> Result<(), ExecutionError> {
        let bindings = self.context.names().map(str::to_string).collect();
        self.host.record(
            &script.filename,
            HostAction::RunInScope {
                script: script.clone(),
                bindings,
            },
        )
    }
}

#[async_trait(?Send)]
impl Importer for RecordingHost {
    async fn import(&self, url: &Url) -> Result<(), ExecutionError> {
        self.record(url.as_str(), HostAction::Import(url.clone()))
    }
}

/// What a [`RecordingRegistry`] hands back on finalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySnapshot {
    pub cwd: PathBuf,
    pub options: LoadOptions,
    /// Drawn from the id generator given on reset
    pub library_id: String,
}

#[derive(Debug, Default)]
pub struct RecordingRegistry {
    cwd: PathBuf,
    options: LoadOptions,
    new_id: Option<IdGenerator>,
    resets: usize,
    finalizations: usize,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> usize {
        self.resets
    }

    pub fn finalizations(&self) -> usize {
        self.finalizations
    }
}

impl SupportCodeRegistry for RecordingRegistry {
    type Snapshot = RegistrySnapshot;

    fn reset(&mut self, cwd: &Path, new_id: IdGenerator, options: &LoadOptions) {
        self.cwd = cwd.to_path_buf();
        self.options = options.clone();
        self.new_id = Some(new_id);
        self.resets += 1;
    }

    fn finalize(&mut self) -> RegistrySnapshot {
        self.finalizations += 1;
        RegistrySnapshot {
            cwd: self.cwd.clone(),
            options: self.options.clone(),
            library_id: self.new_id.as_ref().map(IdGenerator::next_id).unwrap_or_default(),
        }
    }
}
