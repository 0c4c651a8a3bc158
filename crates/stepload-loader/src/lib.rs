//! Support-code loader for a BDD test runner.
//!
//! Loads step definitions and hooks into a [`SupportCodeRegistry`]:
//! eagerly required modules first, then each require path, then each
//! import path, then the registry is finalized.
//!
//! A require path inside the project root goes straight to the host's
//! native loader. Anything outside it is read and rewritten so that its
//! package dependencies still resolve:
//!
//! - without an [`ExecutionContext`], bare specifiers become absolute paths
//!   under the project's `node_modules` and the source is compiled in the
//!   host's global scope;
//! - with one, remapped specifiers become identifiers bound by the context
//!   and the source runs in a fresh sandbox scope.

pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod ids;
pub mod loader;
pub mod package_root;
pub mod paths;
pub mod recording;
pub mod resolution;

pub use config::{ConfigError, LoadOptions, LoaderConfig};
pub use context::ExecutionContext;
pub use error::{LoadError, Phase};
pub use host::{ExecutionError, HostLoader, Importer, Sandbox, Scope, Script, SupportCodeRegistry};
pub use ids::IdGenerator;
pub use loader::{resolve_project_root, synthetic_filename, SupportCodeLoader};
pub use package_root::{find_package_root, PackageRoot, DEPENDENCY_DIR};
pub use paths::{classify, is_absolute, is_inside, is_path, is_relative, SpecifierKind};
pub use resolution::{RemapTable, ResolutionPolicy};

pub use stepload_events as events;
pub use stepload_rewriter as rewriter;
