//! # Stepload AST
//!
//! Syntax tree definitions for the stepload source rewriter.
//! The tree is shallow: it records only the constructs a dependency-load
//! rewrite cares about, each with the exact byte span it occupies in the
//! original source.

use std::fmt;

// =============================================================================
// Core Types
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Quoted string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    /// Cooked value (escapes resolved)
    pub value: String,
    /// Quote character used in the source (`'` or `"`)
    pub quote: char,
}

impl StrLit {
    pub fn new(value: impl Into<String>, quote: char) -> Self {
        Self { value: value.into(), quote }
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod module;

pub use module::*;

// =============================================================================
// Tests
// =============================================================================
