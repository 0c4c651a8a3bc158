//! The load operation: eager modules, require paths, import paths

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::LoaderConfig;
use crate::error::{LoadError, Phase};
use crate::host::{ExecutionError, HostLoader, Importer, Sandbox, Script, SupportCodeRegistry};
use crate::package_root::{find_package_root, PackageRoot};
use crate::paths::{absolutize, is_inside};
use crate::resolution::ResolutionPolicy;

/// Name under which rewritten source is compiled: the SHA-256 of its path.
pub fn synthetic_filename(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolves the project root: the configured one, or the nearest package
/// root above the install directory.
pub fn resolve_project_root(config: &LoaderConfig) -> Result<PackageRoot, LoadError> {
    if let Some(root) = &config.project_root {
        return Ok(PackageRoot::new(absolutize(root, &config.cwd)));
    }

    let start = config.install_dir().ok_or_else(|| LoadError::Resolution { start: PathBuf::new() })?;
    find_package_root(&start).ok_or(LoadError::Resolution { start })
}

/// Drives one load against a registry and the host's capabilities.
pub struct SupportCodeLoader<'a, R: SupportCodeRegistry> {
    registry: &'a mut R,
    host: &'a dyn HostLoader,
    sandbox: &'a dyn Sandbox,
    importer: &'a dyn Importer,
}

impl<'a, R: SupportCodeRegistry> SupportCodeLoader<'a, R> {
    pub fn new(
        registry: &'a mut R,
        host: &'a dyn HostLoader,
        sandbox: &'a dyn Sandbox,
        importer: &'a dyn Importer,
    ) -> Self {
        Self {
            registry,
            host,
            sandbox,
            importer,
        }
    }

    /// Loads everything `config` names, in order, and returns the registry
    /// snapshot. The first failure aborts the load and the registry is not
    /// finalized.
    pub async fn load(&mut self, config: &LoaderConfig) -> Result<R::Snapshot, LoadError> {
        info!(
            "loading support code from {}: {} module(s), {} require path(s), {} import path(s)",
            config.cwd.display(),
            config.require_modules.len(),
            config.require_paths.len(),
            config.import_paths.len()
        );

        self.registry.reset(&config.cwd, config.new_id.clone(), &config.load_options());

        for name in &config.require_modules {
            debug!("requiring module '{}'", name);
            self.host
                .require_module(name)
                .map_err(|source| LoadError::RequireModule {
                    name: name.clone(),
                    source,
                })?;
        }

        if let Some(context) = &config.context {
            for (specifier, identifier) in config.remap.iter() {
                if !context.contains(identifier) {
                    warn!("'{}' is remapped to '{}', which the context does not bind", specifier, identifier);
                }
            }
        }

        let project_root = OnceCell::new();
        for request in &config.require_paths {
            let root = project_root.get_or_try_init(|| {
                let root = resolve_project_root(config)?;
                debug!("project root: {}", root.dir().display());
                Ok::<_, LoadError>(root)
            })?;
            self.load_request(config, root, request).await?;
        }

        for entry in &config.import_paths {
            let path = absolutize(entry, &config.cwd);
            let url = Url::from_file_path(&path).map_err(|()| LoadError::Import {
                path: path.clone(),
                source: ExecutionError::new("not a valid file URL"),
            })?;
            debug!("importing {}", url);
            self.importer
                .import(&url)
                .await
                .map_err(|source| LoadError::Import { path, source })?;
        }

        Ok(self.registry.finalize())
    }

    async fn load_request(&self, config: &LoaderConfig, root: &PackageRoot, request: &Path) -> Result<(), LoadError> {
        let path = absolutize(request, &config.cwd);

        if is_inside(&path, root.dir()) {
            debug!("{}: inside project, delegating to host loader", path.display());
            return self.host.require_file(&path).map_err(|source| LoadError::Execution {
                path,
                phase: Phase::InTree,
                source,
            });
        }

        let source = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;

        let filename = synthetic_filename(&path);
        let policy = ResolutionPolicy::select(config.context.as_ref(), root, &config.remap);
        let rewritten = policy.rewrite(&source, &filename).map_err(|source| LoadError::Rewrite {
            path: path.clone(),
            source,
        })?;
        let script = Script::new(rewritten, filename);

        match &config.context {
            None => {
                debug!("{}: compiling as {}", path.display(), script.filename);
                self.host.compile(&script).map_err(|source| LoadError::Execution {
                    path,
                    phase: Phase::Compile,
                    source,
                })
            }
            Some(context) => {
                debug!("{}: running in sandbox as {}", path.display(), script.filename);
                let mut scope = self.sandbox.create_scope(context).map_err(|source| LoadError::Execution {
                    path: path.clone(),
                    phase: Phase::Sandbox,
                    source,
                })?;
                scope.run_script(&script).map_err(|source| LoadError::Execution {
                    path,
                    phase: Phase::Sandbox,
                    source,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_filename_is_stable_hex() {
        let a = synthetic_filename(Path::new("/outside/steps.js"));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, synthetic_filename(Path::new("/outside/steps.js")));
        assert_ne!(a, synthetic_filename(Path::new("/outside/hooks.js")));
    }

    #[test]
    fn test_explicit_project_root_wins() {
        let config = LoaderConfig::new("/work").with_project_root("app");
        assert_eq!(resolve_project_root(&config).unwrap(), PackageRoot::new("/work/app"));
    }
}
