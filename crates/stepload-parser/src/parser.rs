//! Core Parser struct and the item scan

use super::*;

/// Shallow parser: checks the bracket structure of a whole file and
/// records the items a dependency rewrite needs, without building a full
/// expression tree.
pub struct Parser<'src> {
    pub(crate) source: &'src str,
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl<'src> Parser<'src> {
    /// Creates a new parser over `source` and its token stream
    pub fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self { source, tokens, current: 0 }
    }

    /// Parses a complete program
    pub fn parse_program(&mut self) -> Result<Program, Vec<ParseError>> {
        let mut items = Vec::new();
        let mut errors = Vec::new();
        // Open delimiters: `(`, `[`, `{` and template heads
        let mut open: Vec<Token> = Vec::new();

        while !self.is_at_end() {
            let index = self.current;
            let token = self.current_token().clone();

            match token.kind {
                TokenKind::Error => {
                    errors.push(ParseError { message: token.value.clone(), span: token.span });
                    self.advance();
                }
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::TemplateHead => {
                    open.push(token);
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    let expected = match token.kind {
                        TokenKind::RParen => TokenKind::LParen,
                        TokenKind::RBracket => TokenKind::LBracket,
                        _ => TokenKind::LBrace,
                    };
                    match open.pop() {
                        Some(opener) if opener.kind == expected => {}
                        Some(opener) => errors.push(ParseError {
                            message: format!(
                                "Mismatched `{}`: `{}` opened at {} is still unclosed",
                                token.value, Self::opener_text(&opener), opener.span.start
                            ),
                            span: token.span,
                        }),
                        None => errors.push(ParseError {
                            message: format!("Unexpected `{}`", token.value),
                            span: token.span,
                        }),
                    }
                    self.advance();
                }
                TokenKind::TemplateMiddle | TokenKind::TemplateTail => {
                    match open.last() {
                        Some(opener) if opener.kind == TokenKind::TemplateHead => {
                            if token.kind == TokenKind::TemplateTail {
                                open.pop();
                            }
                        }
                        _ => errors.push(ParseError {
                            message: "Unexpected end of template substitution".to_string(),
                            span: token.span,
                        }),
                    }
                    self.advance();
                }
                TokenKind::StringLiteral if self.in_prologue(index) && self.ends_statement(index + 1) => {
                    items.push(self.parse_directive());
                }
                TokenKind::Require => {
                    if let Some(item) = self.recognize_require(index) {
                        items.push(item);
                    }
                    self.advance();
                }
                TokenKind::Import
                    if open.is_empty()
                        && self.at_statement_start(index)
                        && !matches!(self.peek_kind(1), Some(TokenKind::LParen) | Some(TokenKind::Dot)) =>
                {
                    match self.parse_import_decl() {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            errors.push(err);
                            self.synchronize();
                        }
                    }
                }
                TokenKind::Export if open.is_empty() && self.at_statement_start(index) => {
                    match self.parse_export_decl() {
                        Ok(item) => items.push(item),
                        Err(err) => {
                            errors.push(err);
                            self.synchronize();
                        }
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }

        for opener in open {
            errors.push(ParseError {
                message: format!("Unclosed `{}`", Self::opener_text(&opener)),
                span: opener.span,
            });
        }

        if errors.is_empty() {
            let end = self.current_token().span;
            Ok(Program {
                items,
                span: Span::new(0, end.end, end.file_id),
            })
        } else {
            Err(errors)
        }
    }

    fn opener_text(token: &Token) -> &str {
        match token.kind {
            TokenKind::TemplateHead => "${",
            _ => token.value.as_str(),
        }
    }

    /// Consumes a string-literal statement; the span includes its semicolon.
    fn parse_directive(&mut self) -> Node<Item> {
        let token = self.advance().clone();
        let mut span = token.span;
        if self.check(&TokenKind::Semicolon) {
            span = span.merge(&self.advance().span);
        }

        // Raw text is longer than the cooked value whenever escapes occur
        let has_escapes = token.span.len() != token.value.len() + 2;
        Node::new(
            Item::Directive(Directive { value: token.value, has_escapes }),
            span,
        )
    }

    /// Recognizes `require('...')` with `require` at `index`. Member callees,
    /// `new require(...)` and `function require(...)` do not count.
    fn recognize_require(&self, index: usize) -> Option<Node<Item>> {
        if matches!(
            self.kind_before(index),
            Some(TokenKind::Dot) | Some(TokenKind::QuestionDot) | Some(TokenKind::New) | Some(TokenKind::Function)
        ) {
            return None;
        }

        let callee = self.token_at(index)?;
        let open = self.token_at(index + 1)?;
        let argument = self.token_at(index + 2)?;
        let after = self.token_at(index + 3)?;

        if open.kind != TokenKind::LParen
            || argument.kind != TokenKind::StringLiteral
            || !matches!(after.kind, TokenKind::RParen | TokenKind::Comma)
        {
            return None;
        }

        let close = self.matching_paren(index + 1)?;
        let span = callee.span.merge(&self.tokens[close].span);

        Some(Node::new(
            Item::Require(RequireCall {
                callee: Node::new(Ident::new(callee.value.clone()), callee.span),
                specifier: Node::new(
                    StrLit::new(argument.value.clone(), self.quote_of(argument)),
                    argument.span,
                ),
            }),
            span,
        ))
    }

    pub(crate) fn quote_of(&self, token: &Token) -> char {
        self.source[token.span.start..].chars().next().unwrap_or('"')
    }
}
