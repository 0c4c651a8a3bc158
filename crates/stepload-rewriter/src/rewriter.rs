//! Rewrite passes over a parsed program

use log::{debug, warn};
use stepload_ast::{ExportDecl, Item, Node, Program, Span, StrLit};
use stepload_lexer::{Lexer, TokenKind};

use crate::decision::ReplaceDecision;
use crate::edit::{render_string_literal, EditSet};
use crate::error::RewriteError;
use crate::lower::{
    export_binding, export_default_head, lower_import, lower_reexport_all, lower_reexport_named,
};

/// `span` widened over the spaces and tabs after it.
fn keyword_span(source: &str, span: Span) -> Span {
    let blanks = source[span.end..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    Span { end: span.end + blanks, ..span }
}

/// What a replacement substitutes at a matched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// Only the string argument; the replacement is a loadable path.
    RequirePath,
    /// The whole call expression; the replacement is expression source.
    RequireStatement,
}

/// Rewrites every matched `require('...')` argument according to `policy`.
pub fn replace_require_path<P>(source: &str, filename: &str, policy: P) -> Result<String, RewriteError>
where
    P: FnMut(&str) -> ReplaceDecision,
{
    Rewriter::new(filename, RewriteMode::RequirePath).rewrite(source, policy)
}

/// Replaces every matched `require('...')` call with expression source chosen by `policy`.
pub fn replace_require_statement<P>(source: &str, filename: &str, policy: P) -> Result<String, RewriteError>
where
    P: FnMut(&str) -> ReplaceDecision,
{
    Rewriter::new(filename, RewriteMode::RequireStatement).rewrite(source, policy)
}

pub struct Rewriter<'a> {
    filename: &'a str,
    mode: RewriteMode,
}

impl<'a> Rewriter<'a> {
    pub fn new(filename: &'a str, mode: RewriteMode) -> Self {
        Self { filename, mode }
    }

    pub fn rewrite<P>(&self, source: &str, mut policy: P) -> Result<String, RewriteError>
    where
        P: FnMut(&str) -> ReplaceDecision,
    {
        let program = stepload_parser::parse(source).map_err(|errors| RewriteError::Parse {
            filename: self.filename.to_string(),
            errors,
        })?;

        let (edits, trailer) = self.collect_edits(source, &program, &mut policy)?;
        debug!("{}: applying {} edit(s)", self.filename, edits.len());
        let mut output = edits.apply(source);

        // Exported bindings are assigned once the module body has run.
        if !trailer.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&trailer.join("\n"));
            output.push('\n');
        }

        if output.trim().is_empty() {
            return Err(RewriteError::EmptyOutput {
                filename: self.filename.to_string(),
            });
        }
        Ok(output)
    }

    /// Edits for every recognized item, plus the `exports` assignments to
    /// append after the rewritten source.
    fn collect_edits<P>(
        &self,
        source: &str,
        program: &Program,
        policy: &mut P,
    ) -> Result<(EditSet, Vec<String>), RewriteError>
    where
        P: FnMut(&str) -> ReplaceDecision,
    {
        let mut edits = EditSet::new();
        let mut trailer = Vec::new();

        for item in &program.items {
            match &item.value {
                Item::Directive(directive) => {
                    if directive.is_use_strict() {
                        edits.remove(item.span);
                    }
                }
                Item::Require(call) => {
                    let decision = self.decide(policy, call.specifier());
                    if let Some(replacement) = decision.replacement() {
                        match self.mode {
                            RewriteMode::RequirePath => {
                                let quote = call.specifier.value.quote;
                                edits.replace(call.specifier.span, render_string_literal(replacement, quote));
                            }
                            RewriteMode::RequireStatement => {
                                let expr = self.replacement_expr(call.specifier(), replacement, item)?;
                                edits.replace(item.span, expr);
                            }
                        }
                    }
                }
                Item::Import(decl) => {
                    let load_expr = self.load_expr(source, &decl.source, item, policy)?;
                    edits.replace(item.span, lower_import(decl, &load_expr));
                }
                Item::Export(decl) => match decl {
                    ExportDecl::Named { specifiers, source: Some(module) } => {
                        let load_expr = self.load_expr(source, module, item, policy)?;
                        edits.replace(item.span, lower_reexport_named(specifiers, &load_expr));
                    }
                    ExportDecl::Named { specifiers, source: None } => {
                        edits.remove(item.span);
                        trailer.extend(
                            specifiers
                                .iter()
                                .map(|s| export_binding(s.exported_name(), &s.local.value.name)),
                        );
                    }
                    ExportDecl::All { source: module, as_name } => {
                        let load_expr = self.load_expr(source, module, item, policy)?;
                        let as_name = as_name.as_ref().map(|name| name.value.name.as_str());
                        edits.replace(item.span, lower_reexport_all(as_name, &load_expr));
                    }
                    ExportDecl::Declaration { names } => {
                        edits.remove(keyword_span(source, item.span));
                        trailer.extend(names.iter().map(|n| export_binding(&n.value.name, &n.value.name)));
                    }
                    ExportDecl::Default { binding: Some(name) } => {
                        edits.remove(keyword_span(source, item.span));
                        trailer.push(export_binding("default", &name.value.name));
                    }
                    ExportDecl::Default { binding: None } => {
                        edits.replace(item.span, export_default_head());
                    }
                },
            }
        }

        Ok((edits, trailer))
    }

    /// The expression that loads `module` for an import or re-export: the
    /// original `require`, a `require` of the replacement path, or the
    /// replacement expression itself.
    fn load_expr<P>(
        &self,
        source: &str,
        module: &Node<StrLit>,
        item: &Node<Item>,
        policy: &mut P,
    ) -> Result<String, RewriteError>
    where
        P: FnMut(&str) -> ReplaceDecision,
    {
        let specifier = module.value.value.as_str();
        let decision = self.decide(policy, specifier);

        match (decision.replacement(), self.mode) {
            (None, _) => Ok(format!("require({})", &source[module.span.start..module.span.end])),
            (Some(replacement), RewriteMode::RequirePath) => {
                Ok(format!("require({})", render_string_literal(replacement, module.value.quote)))
            }
            (Some(replacement), RewriteMode::RequireStatement) => self.replacement_expr(specifier, replacement, item),
        }
    }

    fn decide<P>(&self, policy: &mut P, specifier: &str) -> ReplaceDecision
    where
        P: FnMut(&str) -> ReplaceDecision,
    {
        let decision = policy(specifier);
        if decision.need_replace && decision.replacement.is_none() {
            warn!(
                "{}: replacement requested for '{}' without content; leaving it unchanged",
                self.filename, specifier
            );
        }
        if let Some(replacement) = decision.replacement() {
            debug!("{}: '{}' -> {}", self.filename, specifier, replacement);
        }
        decision
    }

    /// Validates statement-mode replacement source and parenthesizes it
    /// unless it is a plain identifier or dotted member chain.
    fn replacement_expr(&self, specifier: &str, replacement: &str, item: &Node<Item>) -> Result<String, RewriteError> {
        let invalid = || RewriteError::InvalidReplacement {
            filename: self.filename.to_string(),
            specifier: specifier.to_string(),
            replacement: replacement.to_string(),
            span: item.span,
        };

        let tokens = Lexer::new(replacement).tokenize();
        let significant = &tokens[..tokens.len() - 1];
        if significant.is_empty()
            || significant
                .iter()
                .any(|t| matches!(t.kind, TokenKind::Error | TokenKind::Semicolon))
            || stepload_parser::parse(replacement).is_err()
        {
            return Err(invalid());
        }

        let is_member_chain = significant.iter().enumerate().all(|(i, token)| {
            if i % 2 == 0 {
                token.kind.is_identifier_like() || token.kind == TokenKind::This
            } else {
                token.kind == TokenKind::Dot
            }
        }) && significant.len() % 2 == 1;

        if is_member_chain {
            Ok(replacement.trim().to_string())
        } else {
            Ok(format!("({})", replacement.trim()))
        }
    }
}
