//! End-to-end rewrites of realistic support files.

use stepload_rewriter::{replace_require_path, replace_require_statement, ReplaceDecision};

const STEPS: &str = r#"'use strict';
const { Given, Then } = require('@cucumber/cucumber');
const assert = require('assert');
const helpers = require('./support/helpers');
const leftPad = require('left-pad');

Given('a padded value of {string}', function (value) {
  this.value = leftPad(value, 8);
});

Then('it matches /^ +\\w+$/', function () {
  assert.ok(/^ +\w+$/.test(this.value), `got ${this.value}`);
});
"#;

#[test]
fn argument_substitution_changes_only_matched_literals() {
    let output = replace_require_path(STEPS, "steps.js", |spec| match spec {
        "left-pad" => ReplaceDecision::replace("/work/project/node_modules/left-pad"),
        _ => ReplaceDecision::keep(),
    })
    .unwrap();

    let expected = STEPS
        .replacen("'use strict';\n", "\n", 1)
        .replace("require('left-pad')", "require('/work/project/node_modules/left-pad')");
    assert_eq!(output, expected);
}

#[test]
fn statement_substitution_replaces_whole_calls() {
    let output = replace_require_statement(STEPS, "steps.js", |spec| match spec {
        "@cucumber/cucumber" => ReplaceDecision::replace("Cucumber"),
        "assert" => ReplaceDecision::replace("Assert"),
        _ => ReplaceDecision::keep(),
    })
    .unwrap();

    assert!(output.contains("const { Given, Then } = Cucumber;"));
    assert!(output.contains("const assert = Assert;"));
    assert!(output.contains("require('./support/helpers')"));
    assert!(output.contains("require('left-pad')"));
    assert!(!output.contains("use strict"));
    // Template literal and regex bodies are untouched
    assert!(output.contains("`got ${this.value}`"));
}

#[test]
fn single_line_scenarios() {
    let path = replace_require_path("const x = require('left-pad')", "x.js", |_| {
        ReplaceDecision::replace("/abs/node_modules/left-pad")
    })
    .unwrap();
    assert_eq!(path, "const x = require('/abs/node_modules/left-pad')");

    let statement = replace_require_statement("const a = require('assert')", "a.js", |spec| {
        if spec == "assert" {
            ReplaceDecision::replace("Assert")
        } else {
            ReplaceDecision::keep()
        }
    })
    .unwrap();
    assert_eq!(statement, "const a = Assert");
}

#[test]
fn es_imports_are_lowered_before_resolution() {
    let source = "import { Given } from '@cucumber/cucumber';\nimport pad from 'left-pad';\nGiven('x', () => pad('a', 2));\n";

    let sandboxed = replace_require_statement(source, "esm.js", |spec| {
        if spec == "@cucumber/cucumber" {
            ReplaceDecision::replace("Cucumber")
        } else {
            ReplaceDecision::keep()
        }
    })
    .unwrap();
    assert_eq!(
        sandboxed,
        "const { Given } = Cucumber;\nconst pad = require('left-pad');\nGiven('x', () => pad('a', 2));\n"
    );

    let direct = replace_require_path(source, "esm.js", |spec| {
        if spec == "left-pad" {
            ReplaceDecision::replace("/p/node_modules/left-pad")
        } else {
            ReplaceDecision::keep()
        }
    })
    .unwrap();
    assert_eq!(
        direct,
        "const { Given } = require('@cucumber/cucumber');\nconst pad = require('/p/node_modules/left-pad');\nGiven('x', () => pad('a', 2));\n"
    );
}

#[test]
fn windows_style_replacement_paths_stay_valid_literals() {
    let output = replace_require_path("require(\"dep\");", "w.js", |_| {
        ReplaceDecision::replace("C:\\proj\\node_modules\\dep")
    })
    .unwrap();
    assert_eq!(output, "require(\"C:\\\\proj\\\\node_modules\\\\dep\");");
}
