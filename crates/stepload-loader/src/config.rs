//! Loader configuration and its JSON form

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::context::ExecutionContext;
use crate::ids::IdGenerator;
use crate::paths::absolutize;
use crate::resolution::RemapTable;

/// The load lists as given, passed to the registry on reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    pub require_modules: Vec<String>,
    pub require_paths: Vec<PathBuf>,
    pub import_paths: Vec<PathBuf>,
}

/// Everything one load operation needs.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Base for relative load requests
    pub cwd: PathBuf,
    pub new_id: IdGenerator,
    /// Loaded by name before any file
    pub require_modules: Vec<String>,
    /// Files loaded in order through the rewriter or the host loader
    pub require_paths: Vec<PathBuf>,
    /// Entry points imported after all require paths
    pub import_paths: Vec<PathBuf>,
    /// Explicit project root. Located from `install_dir` when absent.
    pub project_root: Option<PathBuf>,
    /// Where the loader itself is installed. Defaults to the directory of
    /// the running executable.
    pub install_dir: Option<PathBuf>,
    /// Sandbox bindings. Selects sandboxed execution when present.
    pub context: Option<ExecutionContext>,
    pub remap: RemapTable,
}

impl LoaderConfig {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            new_id: IdGenerator::default(),
            require_modules: Vec::new(),
            require_paths: Vec::new(),
            import_paths: Vec::new(),
            project_root: None,
            install_dir: None,
            context: None,
            remap: RemapTable::default(),
        }
    }

    pub fn with_require_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.require_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_import_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.import_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_require_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_modules = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_id_generator(mut self, new_id: IdGenerator) -> Self {
        self.new_id = new_id;
        self
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            require_modules: self.require_modules.clone(),
            require_paths: self.require_paths.clone(),
            import_paths: self.import_paths.clone(),
        }
    }

    /// Starting directory for project root discovery.
    pub fn install_dir(&self) -> Option<PathBuf> {
        match &self.install_dir {
            Some(dir) => Some(absolutize(dir, &self.cwd)),
            None => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
        }
    }

    /// Reads a JSON config file. A relative `cwd` in the file is taken
    /// relative to the file's directory.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_json_str(&text, base).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(text: &str, base: &Path) -> Result<Self, serde_json::Error> {
        let file: ConfigFile = serde_json::from_str(text)?;
        Ok(file.into_config(base))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum IdStyle {
    #[default]
    Uuid,
    Incrementing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    cwd: Option<PathBuf>,
    #[serde(default)]
    require_modules: Vec<String>,
    #[serde(default)]
    require_paths: Vec<PathBuf>,
    #[serde(default)]
    import_paths: Vec<PathBuf>,
    project_root: Option<PathBuf>,
    install_dir: Option<PathBuf>,
    /// Binding names to JSON values. Presence selects sandboxed execution.
    context: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    remap: BTreeMap<String, String>,
    #[serde(default)]
    ids: IdStyle,
}

impl ConfigFile {
    fn into_config(self, base: &Path) -> LoaderConfig {
        let cwd = match self.cwd {
            Some(cwd) => absolutize(&cwd, base),
            None => base.to_path_buf(),
        };

        let mut config = LoaderConfig::new(cwd)
            .with_require_modules(self.require_modules)
            .with_require_paths(self.require_paths)
            .with_import_paths(self.import_paths);
        config.project_root = self.project_root;
        config.install_dir = self.install_dir;
        config.remap.extend(self.remap);

        if let Some(bindings) = self.context {
            let mut context = ExecutionContext::new();
            for (name, value) in bindings {
                context.insert(name, value);
            }
            config.context = Some(context);
        }

        if self.ids == IdStyle::Incrementing {
            config.new_id = IdGenerator::incrementing();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = LoaderConfig::from_json_str("{}", Path::new("/work")).unwrap();
        assert_eq!(config.cwd, PathBuf::from("/work"));
        assert!(config.require_paths.is_empty());
        assert!(config.context.is_none());
        assert_eq!(config.remap, RemapTable::default());
    }

    #[test]
    fn test_full_config() {
        let text = r#"{
            "cwd": "project",
            "requireModules": ["ts-node/register"],
            "requirePaths": ["features/steps.js", "/abs/hooks.js"],
            "importPaths": ["features/esm.mjs"],
            "projectRoot": "/work/project",
            "context": { "Cucumber": {}, "Assert": null },
            "remap": { "chai": "Chai" },
            "ids": "incrementing"
        }"#;
        let config = LoaderConfig::from_json_str(text, Path::new("/work")).unwrap();
        assert_eq!(config.cwd, PathBuf::from("/work/project"));
        assert_eq!(config.require_modules, vec!["ts-node/register"]);
        assert_eq!(config.require_paths.len(), 2);
        assert_eq!(config.project_root, Some(PathBuf::from("/work/project")));
        assert_eq!(config.remap.get("chai"), Some("Chai"));
        assert_eq!(config.remap.get("assert"), Some("Assert"));

        let context = config.context.as_ref().unwrap();
        assert_eq!(context.names().collect::<Vec<_>>(), vec!["Assert", "Cucumber"]);
        assert_eq!(config.new_id.next_id(), "0");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(LoaderConfig::from_json_str(r#"{"requirepaths": []}"#, Path::new("/")).is_err());
    }

    #[test]
    fn test_load_options_mirror_lists() {
        let config = LoaderConfig::new("/w")
            .with_require_modules(["m"])
            .with_require_paths(["a.js"])
            .with_import_paths(["b.mjs"]);
        let options = config.load_options();
        assert_eq!(options.require_modules, vec!["m".to_string()]);
        assert_eq!(options.require_paths, vec![PathBuf::from("a.js")]);
        assert_eq!(options.import_paths, vec![PathBuf::from("b.mjs")]);
    }

    #[test]
    fn test_explicit_install_dir_is_resolved_against_cwd() {
        let config = LoaderConfig::new("/w").with_install_dir("tools/../bin");
        assert_eq!(config.install_dir(), Some(PathBuf::from("/w/bin")));
    }
}
