//! Source rewriter for support-code files.
//!
//! Finds `require('...')` calls, static imports and `'use strict'`
//! directives in a JavaScript source file and rewrites them without
//! executing anything. Two entry points implement the two substitution
//! modes:
//!
//! - [`replace_require_path`] swaps only the string argument, keeping the
//!   call so the host loader can resolve the new path.
//! - [`replace_require_statement`] swaps the whole call for expression
//!   source, e.g. an identifier supplied by a sandbox scope.
//!
//! Static `import` declarations are lowered to `const ... = require(...)`
//! first, so both modes see them as ordinary dependency loads. Re-exports
//! load their module the same way; exported bindings are assigned to
//! `exports` after the module body.

mod decision;
mod edit;
mod error;
mod lower;
mod rewriter;

pub use decision::ReplaceDecision;
pub use error::RewriteError;
pub use rewriter::{replace_require_path, replace_require_statement, RewriteMode, Rewriter};
