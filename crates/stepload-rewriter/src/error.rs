//! Error types for source rewriting

use stepload_ast::Span;
use stepload_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RewriteError {
    #[error("failed to parse {filename}: {}", summarize(.errors))]
    Parse {
        filename: String,
        errors: Vec<ParseError>,
    },

    #[error("replacement for '{specifier}' in {filename} is not a valid expression: {replacement}")]
    InvalidReplacement {
        filename: String,
        specifier: String,
        replacement: String,
        /// Span of the call expression the replacement was meant for
        span: Span,
    },

    #[error("transform of {filename} produced no output")]
    EmptyOutput { filename: String },
}

impl RewriteError {
    pub fn filename(&self) -> &str {
        match self {
            RewriteError::Parse { filename, .. }
            | RewriteError::InvalidReplacement { filename, .. }
            | RewriteError::EmptyOutput { filename } => filename,
        }
    }
}

fn summarize(errors: &[ParseError]) -> String {
    match errors {
        [] => "unknown error".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}
