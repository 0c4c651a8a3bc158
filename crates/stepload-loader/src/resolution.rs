//! Resolution policies: what each dependency specifier becomes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use stepload_rewriter::{ReplaceDecision, RewriteError, RewriteMode, Rewriter};

use crate::context::ExecutionContext;
use crate::package_root::PackageRoot;
use crate::paths::is_path;

/// Package specifier to context identifier, used when running in a sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemapTable {
    entries: IndexMap<String, String>,
}

impl Default for RemapTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert("@cucumber/cucumber", "Cucumber");
        table.insert("assert", "Assert");
        table
    }
}

impl RemapTable {
    pub fn empty() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Adds or overrides a mapping; returns the identifier it replaced.
    pub fn insert(&mut self, specifier: impl Into<String>, identifier: impl Into<String>) -> Option<String> {
        self.entries.insert(specifier.into(), identifier.into())
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.entries.get(specifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for RemapTable {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Exactly one policy applies to a file, chosen by whether an execution
/// context was supplied.
#[derive(Debug, Clone, Copy)]
pub enum ResolutionPolicy<'a> {
    /// Bare specifiers found under the root's dependency directory become
    /// absolute paths there. Used for direct compilation.
    InstalledPackage(&'a PackageRoot),
    /// Remapped specifiers become identifiers bound in the sandbox scope.
    ContextBinding(&'a RemapTable),
}

impl<'a> ResolutionPolicy<'a> {
    pub fn select(context: Option<&ExecutionContext>, root: &'a PackageRoot, remap: &'a RemapTable) -> Self {
        match context {
            Some(_) => ResolutionPolicy::ContextBinding(remap),
            None => ResolutionPolicy::InstalledPackage(root),
        }
    }

    pub fn mode(&self) -> RewriteMode {
        match self {
            ResolutionPolicy::InstalledPackage(_) => RewriteMode::RequirePath,
            ResolutionPolicy::ContextBinding(_) => RewriteMode::RequireStatement,
        }
    }

    pub fn decide(&self, specifier: &str) -> ReplaceDecision {
        if is_path(specifier) {
            return ReplaceDecision::keep();
        }

        match self {
            ResolutionPolicy::InstalledPackage(root) => match root.installed_package(specifier) {
                Some(path) => ReplaceDecision::replace(path.to_string_lossy()),
                None => ReplaceDecision::keep(),
            },
            ResolutionPolicy::ContextBinding(remap) => match remap.get(specifier) {
                Some(identifier) => ReplaceDecision::replace(identifier),
                None => ReplaceDecision::keep(),
            },
        }
    }

    /// Rewrites `source` in this policy's mode.
    pub fn rewrite(&self, source: &str, filename: &str) -> Result<String, RewriteError> {
        Rewriter::new(filename, self.mode()).rewrite(source, |specifier| self.decide(specifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_remap() {
        let table = RemapTable::default();
        assert_eq!(table.get("@cucumber/cucumber"), Some("Cucumber"));
        assert_eq!(table.get("assert"), Some("Assert"));
        assert_eq!(table.get("chai"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remap_json_is_a_plain_object() {
        let mut table = RemapTable::empty();
        table.extend([("chai", "Chai")]);
        assert_eq!(serde_json::to_string(&table).unwrap(), r#"{"chai":"Chai"}"#);
        let back: RemapTable = serde_json::from_str(r#"{"chai":"Chai","assert":"A"}"#).unwrap();
        assert_eq!(back.get("assert"), Some("A"));
    }

    #[test]
    fn test_installed_package_policy() {
        let tmp = TempDir::new().unwrap();
        let root = PackageRoot::new(tmp.path());
        fs::create_dir_all(root.dependency_dir().join("left-pad")).unwrap();
        let policy = ResolutionPolicy::InstalledPackage(&root);

        let expected = root.dependency_dir().join("left-pad");
        assert_eq!(policy.decide("left-pad").replacement(), Some(expected.to_string_lossy().as_ref()));
        assert_eq!(policy.decide("not-installed"), ReplaceDecision::keep());
        assert_eq!(policy.decide("./left-pad"), ReplaceDecision::keep());
        assert_eq!(policy.mode(), RewriteMode::RequirePath);
    }

    #[test]
    fn test_context_binding_policy() {
        let remap = RemapTable::default();
        let policy = ResolutionPolicy::ContextBinding(&remap);
        assert_eq!(policy.decide("assert"), ReplaceDecision::replace("Assert"));
        assert_eq!(policy.decide("fs"), ReplaceDecision::keep());
        assert_eq!(policy.decide("/abs/assert"), ReplaceDecision::keep());
        assert_eq!(policy.mode(), RewriteMode::RequireStatement);
    }

    #[test]
    fn test_select_is_exclusive() {
        let root = PackageRoot::new("/nowhere");
        let remap = RemapTable::default();
        let context = ExecutionContext::new();

        assert!(matches!(ResolutionPolicy::select(None, &root, &remap), ResolutionPolicy::InstalledPackage(_)));
        assert!(matches!(
            ResolutionPolicy::select(Some(&context), &root, &remap),
            ResolutionPolicy::ContextBinding(_)
        ));
    }

    #[test]
    fn test_rewrite_with_context_policy() {
        let remap = RemapTable::default();
        let policy = ResolutionPolicy::ContextBinding(&remap);
        let output = policy
            .rewrite("'use strict';\nconst assert = require('assert');", "x.js")
            .unwrap();
        assert_eq!(output, "\nconst assert = Assert;");
    }
}
