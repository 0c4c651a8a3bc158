//! Program-level items recognized by the parser

use super::*;

/// Marker value of the legacy strict-mode directive
pub const USE_STRICT: &str = "use strict";

/// Item of interest found in a source file
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Directive prologue entry such as `'use strict';`
    Directive(Directive),

    /// `require('specifier')` call expression
    Require(RequireCall),

    /// Static `import ... from 'specifier'` declaration
    Import(ImportDecl),

    /// Top-level `export` statement
    Export(ExportDecl),
}

/// String-literal expression statement in directive position.
/// The node span covers the literal and its terminating semicolon, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub value: String,
    /// The raw literal contained escape sequences
    pub has_escapes: bool,
}

impl Directive {
    pub fn is_use_strict(&self) -> bool {
        !self.has_escapes && self.value == USE_STRICT
    }
}

/// Dependency-load call whose callee is the bare `require` identifier and
/// whose first argument is a string literal. The node span covers the
/// whole call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct RequireCall {
    pub callee: Node<Ident>,
    pub specifier: Node<StrLit>,
}

impl RequireCall {
    pub fn specifier(&self) -> &str {
        &self.specifier.value.value
    }
}

/// Import declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub specifiers: Vec<ImportSpecifier>,
    pub source: Node<StrLit>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// import name from "module"
    Default(Node<Ident>),

    /// import * as name from "module"
    Namespace(Node<Ident>),

    /// import { name } from "module" or import { name as alias } from "module"
    Named {
        imported: Node<Ident>,
        local: Option<Node<Ident>>,
    },
}

/// Export statement. For `Declaration` and `Default` the node span covers
/// only the leading `export` (and `default`) keywords; the declaration or
/// expression after them stays in place.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// export { a, b as c } or export { a } from "module"
    Named {
        specifiers: Vec<ExportSpecifier>,
        source: Option<Node<StrLit>>,
    },

    /// export * from "module" or export * as ns from "module"
    All {
        source: Node<StrLit>,
        as_name: Option<Node<Ident>>,
    },

    /// export const/let/var/function/class, with every name it binds
    Declaration { names: Vec<Node<Ident>> },

    /// export default ...; `binding` is the name of a named function or
    /// class declaration
    Default { binding: Option<Node<Ident>> },
}

impl ExportDecl {
    /// Module the statement re-exports from, if any.
    pub fn source(&self) -> Option<&Node<StrLit>> {
        match self {
            ExportDecl::Named { source, .. } => source.as_ref(),
            ExportDecl::All { source, .. } => Some(source),
            ExportDecl::Declaration { .. } | ExportDecl::Default { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: Node<Ident>,
    pub exported: Option<Node<Ident>>,
}

impl ExportSpecifier {
    /// Name the binding is exported under.
    pub fn exported_name(&self) -> &str {
        &self.exported.as_ref().unwrap_or(&self.local).value.name
    }
}

/// Root node: every recognized item in source order
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Node<Item>>,
    pub span: Span,
}

impl Program {
    pub fn requires(&self) -> impl Iterator<Item = (Span, &RequireCall)> {
        self.items.iter().filter_map(|item| match &item.value {
            Item::Require(call) => Some((item.span, call)),
            _ => None,
        })
    }

    pub fn directives(&self) -> impl Iterator<Item = (Span, &Directive)> {
        self.items.iter().filter_map(|item| match &item.value {
            Item::Directive(directive) => Some((item.span, directive)),
            _ => None,
        })
    }

    pub fn imports(&self) -> impl Iterator<Item = (Span, &ImportDecl)> {
        self.items.iter().filter_map(|item| match &item.value {
            Item::Import(decl) => Some((item.span, decl)),
            _ => None,
        })
    }

    pub fn exports(&self) -> impl Iterator<Item = (Span, &ExportDecl)> {
        self.items.iter().filter_map(|item| match &item.value {
            Item::Export(decl) => Some((item.span, decl)),
            _ => None,
        })
    }
}
