use std::fs;
use std::path::PathBuf;

use stepload_loader::recording::{HostAction, RecordingHost, RecordingRegistry, RegistrySnapshot};
use stepload_loader::rewriter::RewriteError;
use stepload_loader::{
    synthetic_filename, ExecutionContext, IdGenerator, LoadError, LoaderConfig, Phase, Script, SupportCodeLoader,
};
use tempfile::TempDir;
use url::Url;

struct Fixture {
    tmp: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("project/node_modules/left-pad")).unwrap();
        fs::create_dir_all(tmp.path().join("project/node_modules/@cucumber/cucumber")).unwrap();
        Self { tmp }
    }

    fn project(&self) -> PathBuf {
        self.tmp.path().join("project")
    }

    fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.tmp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn config(&self) -> LoaderConfig {
        LoaderConfig::new(self.project())
            .with_install_dir(self.project())
            .with_id_generator(IdGenerator::incrementing())
    }
}

async fn run(config: &LoaderConfig, host: &RecordingHost) -> (Result<RegistrySnapshot, LoadError>, RecordingRegistry) {
    let mut registry = RecordingRegistry::new();
    let result = SupportCodeLoader::new(&mut registry, host, host, host).load(config).await;
    (result, registry)
}

fn sandbox_context() -> ExecutionContext {
    let mut context = ExecutionContext::new();
    context.insert("Cucumber", "cucumber api").insert("Assert", "assert api");
    context
}

#[tokio::test]
async fn test_in_tree_file_is_delegated_to_host_loader() {
    let fx = Fixture::new();
    let steps = fx.write("project/features/steps.js", "require('left-pad');");
    let config = fx.config().with_require_paths(["features/steps.js"]);
    let host = RecordingHost::new();

    let (result, registry) = run(&config, &host).await;

    let snapshot = result.unwrap();
    assert_eq!(host.actions(), vec![HostAction::RequireFile(steps)]);
    assert_eq!(snapshot.cwd, fx.project());
    assert_eq!(snapshot.options.require_paths, vec![PathBuf::from("features/steps.js")]);
    assert_eq!(snapshot.library_id, "0");
    assert_eq!((registry.resets(), registry.finalizations()), (1, 1));
}

#[tokio::test]
async fn test_out_of_tree_file_is_rewritten_and_compiled() {
    let fx = Fixture::new();
    let shared = fx.write(
        "shared/steps.js",
        "'use strict';\nconst pad = require('left-pad');\nconst util = require('./util');\nconst chalk = require('chalk');\n",
    );
    let config = fx.config().with_require_paths([shared.clone()]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;
    result.unwrap();

    let installed = fx.project().join("node_modules/left-pad");
    let expected = format!(
        "\nconst pad = require('{}');\nconst util = require('./util');\nconst chalk = require('chalk');\n",
        installed.display()
    );
    assert_eq!(
        host.actions(),
        vec![HostAction::Compile(Script::new(expected, synthetic_filename(&shared)))]
    );
}

#[tokio::test]
async fn test_context_runs_out_of_tree_file_in_sandbox() {
    let fx = Fixture::new();
    let shared = fx.write(
        "shared/steps.js",
        "const { Given } = require('@cucumber/cucumber');\nconst assert = require('assert');\nconst fs = require('fs');\n",
    );
    let config = fx
        .config()
        .with_context(sandbox_context())
        .with_require_paths([shared.clone()]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;
    result.unwrap();

    assert_eq!(
        host.actions(),
        vec![HostAction::RunInScope {
            script: Script::new(
                "const { Given } = Cucumber;\nconst assert = Assert;\nconst fs = require('fs');\n",
                synthetic_filename(&shared),
            ),
            bindings: vec!["Cucumber".to_string(), "Assert".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_es_imports_are_lowered_before_binding() {
    let fx = Fixture::new();
    let shared = fx.write(
        "shared/steps.mjs",
        "import { Given, When as on } from '@cucumber/cucumber';\nGiven('x', () => {});\n",
    );
    let config = fx.config().with_context(sandbox_context()).with_require_paths([shared]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;
    result.unwrap();

    match host.actions().as_slice() {
        [HostAction::RunInScope { script, .. }] => {
            assert!(script.source.contains("Cucumber"));
            assert!(!script.source.contains("import"));
            assert!(!script.source.contains("require('@cucumber/cucumber')"));
        }
        other => panic!("unexpected actions: {:?}", other),
    }
}

#[tokio::test]
async fn test_order_is_modules_then_requires_then_imports() {
    let fx = Fixture::new();
    let in_tree = fx.write("project/features/a.js", "");
    let outside = fx.write("shared/b.js", "module.exports = 1;");
    let entry = fx.write("project/features/c.mjs", "export {};");
    let config = fx
        .config()
        .with_require_modules(["ts-node/register"])
        .with_require_paths([in_tree.clone(), outside.clone()])
        .with_import_paths(["features/c.mjs"]);
    let host = RecordingHost::new();

    let (result, registry) = run(&config, &host).await;
    result.unwrap();

    assert_eq!(
        host.actions(),
        vec![
            HostAction::RequireModule("ts-node/register".to_string()),
            HostAction::RequireFile(in_tree),
            HostAction::Compile(Script::new("module.exports = 1;", synthetic_filename(&outside))),
            HostAction::Import(Url::from_file_path(&entry).unwrap()),
        ]
    );
    assert_eq!(registry.finalizations(), 1);
}

#[tokio::test]
async fn test_missing_out_of_tree_file_fails_without_finalize() {
    let fx = Fixture::new();
    let missing = fx.tmp.path().join("shared/missing.js");
    let config = fx.config().with_require_paths([missing.clone()]);
    let host = RecordingHost::new();

    let (result, registry) = run(&config, &host).await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(missing.as_path()));
    assert_eq!((registry.resets(), registry.finalizations()), (1, 0));
}

#[tokio::test]
async fn test_missing_in_tree_file_fails_in_host_loader() {
    let fx = Fixture::new();
    let config = fx.config().with_require_paths(["features/missing.js"]);
    let host = RecordingHost::new();

    let (result, registry) = run(&config, &host).await;

    let err = result.unwrap_err();
    assert!(err.is_not_found());
    match err {
        LoadError::Execution { path, phase, source } => {
            assert_eq!(path, fx.project().join("features/missing.js"));
            assert_eq!(phase, Phase::InTree);
            assert!(source.message().starts_with("Cannot find module"));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(registry.finalizations(), 0);
}

#[tokio::test]
async fn test_first_failure_stops_the_load() {
    let fx = Fixture::new();
    let first = fx.write("project/features/first.js", "");
    let second = fx.write("project/features/second.js", "");
    let host = RecordingHost::new().fail_on(first.to_string_lossy(), "SyntaxError: Unexpected token");
    let config = fx.config().with_require_paths([first.clone(), second]);

    let (result, registry) = run(&config, &host).await;

    assert!(matches!(result, Err(LoadError::Execution { phase: Phase::InTree, .. })));
    assert_eq!(host.actions(), vec![HostAction::RequireFile(first)]);
    assert_eq!(registry.finalizations(), 0);
}

#[tokio::test]
async fn test_require_module_failure_precedes_files() {
    let fx = Fixture::new();
    let steps = fx.write("project/features/steps.js", "");
    let host = RecordingHost::new().fail_on("missing-transpiler", "Cannot find module 'missing-transpiler'");
    let config = fx
        .config()
        .with_require_modules(["missing-transpiler"])
        .with_require_paths([steps]);

    let (result, _) = run(&config, &host).await;

    match result.unwrap_err() {
        LoadError::RequireModule { name, .. } => assert_eq!(name, "missing-transpiler"),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(host.actions().len(), 1);
}

#[tokio::test]
async fn test_sandbox_failure_is_attributed_to_the_file() {
    let fx = Fixture::new();
    let shared = fx.write("shared/steps.js", "throw new Error('nope');");
    let host = RecordingHost::new().fail_on(synthetic_filename(&shared), "Error: nope");
    let config = fx.config().with_context(sandbox_context()).with_require_paths([shared.clone()]);

    let (result, _) = run(&config, &host).await;

    match result.unwrap_err() {
        LoadError::Execution { path, phase, source } => {
            assert_eq!(path, shared);
            assert_eq!(phase, Phase::Sandbox);
            assert_eq!(source.message(), "Error: nope");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_unparseable_file_is_a_rewrite_error() {
    let fx = Fixture::new();
    let shared = fx.write("shared/broken.js", "foo(];");
    let config = fx.config().with_require_paths([shared.clone()]);
    let host = RecordingHost::new();

    let (result, registry) = run(&config, &host).await;

    match result.unwrap_err() {
        LoadError::Rewrite { path, source } => {
            assert_eq!(path, shared);
            assert!(matches!(source, RewriteError::Parse { .. }));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(host.actions().is_empty());
    assert_eq!(registry.finalizations(), 0);
}

#[tokio::test]
async fn test_empty_transform_output_is_an_error() {
    let fx = Fixture::new();
    let shared = fx.write("shared/strict.js", "'use strict';\n");
    let config = fx.config().with_require_paths([shared]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;

    assert!(matches!(
        result,
        Err(LoadError::Rewrite {
            source: RewriteError::EmptyOutput { .. },
            ..
        })
    ));
    assert!(host.actions().is_empty());
}

#[tokio::test]
async fn test_nearest_root_decides_membership() {
    let fx = Fixture::new();
    let inner = fx.project().join("packages/inner");
    fs::create_dir_all(inner.join("node_modules")).unwrap();
    let inner_steps = fx.write("project/packages/inner/steps.js", "");
    let outer_steps = fx.write("project/steps.js", "module.exports = {};");
    let config = fx
        .config()
        .with_install_dir(&inner)
        .with_require_paths([inner_steps.clone(), outer_steps.clone()]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;
    result.unwrap();

    assert_eq!(
        host.actions(),
        vec![
            HostAction::RequireFile(inner_steps),
            HostAction::Compile(Script::new("module.exports = {};", synthetic_filename(&outer_steps))),
        ]
    );
}

#[tokio::test]
async fn test_explicit_project_root_overrides_discovery() {
    let fx = Fixture::new();
    let shared = fx.write("shared/steps.js", "");
    let config = fx
        .config()
        .with_project_root(fx.tmp.path())
        .with_require_paths([shared.clone()]);
    let host = RecordingHost::new();

    let (result, _) = run(&config, &host).await;
    result.unwrap();

    assert_eq!(host.actions(), vec![HostAction::RequireFile(shared)]);
}

#[tokio::test]
async fn test_missing_root_only_fails_when_needed() {
    let fx = Fixture::new();
    let bare = fx.tmp.path().join("bare");
    fs::create_dir_all(&bare).unwrap();
    let host = RecordingHost::new();

    // An ancestor of the temp dir with its own node_modules would be found
    if bare.ancestors().any(|dir| dir.join("node_modules").exists()) {
        return;
    }

    let config = fx.config().with_install_dir(&bare);
    let (result, _) = run(&config, &host).await;
    assert!(result.is_ok());

    let config = config.with_require_paths(["x.js"]);
    let (result, registry) = run(&config, &host).await;
    assert!(matches!(result, Err(LoadError::Resolution { .. })));
    assert_eq!(registry.finalizations(), 0);
}
