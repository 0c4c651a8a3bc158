//! # Stepload Parser
//!
//! Shallow parser for JavaScript support files. Validates the delimiter
//! structure of the whole file and collects dependency-load calls,
//! directives, static imports and exports with their exact spans.

use stepload_ast::*;
use stepload_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod import;
mod export;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lexes and parses `source` in one step.
pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(source, tokens).parse_program()
}

// =============================================================================
// Tests
// =============================================================================
