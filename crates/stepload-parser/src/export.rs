//! Export statements

use super::*;

impl<'src> Parser<'src> {
    /// Parses a top-level `export` statement starting at the `export` keyword.
    ///
    /// Re-exports and export lists are consumed whole. For declarations and
    /// `export default` only the keywords are consumed, so the scan goes on
    /// through the declaration body.
    pub(crate) fn parse_export_decl(&mut self) -> ParseResult<Node<Item>> {
        let start = self.consume(TokenKind::Export)?.span;

        // export default ...
        if self.check(&TokenKind::Default) {
            let head = start.merge(&self.advance().span);
            let binding = self.default_binding(self.current);
            return Ok(Node::new(Item::Export(ExportDecl::Default { binding }), head));
        }

        // export * from "module" / export * as ns from "module"
        if self.check(&TokenKind::Star) {
            self.advance();
            let as_name = if self.check(&TokenKind::As) {
                self.advance();
                Some(self.parse_export_name()?.0)
            } else {
                None
            };
            self.consume(TokenKind::From)?;
            let source = self.parse_module_source()?;
            return Ok(self.finish_export(start, ExportDecl::All { source, as_name }));
        }

        // export { ... } [from "module"]
        if self.check(&TokenKind::LBrace) {
            self.advance();
            let mut specifiers = Vec::new();
            let mut string_locals = Vec::new();
            while !self.check(&TokenKind::RBrace) {
                let (local, local_is_string) = self.parse_export_name()?;
                if local_is_string {
                    string_locals.push(local.span);
                }
                let exported = if self.check(&TokenKind::As) {
                    self.advance();
                    Some(self.parse_export_name()?.0)
                } else {
                    None
                };
                specifiers.push(ExportSpecifier { local, exported });
                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RBrace)?;

            let source = if self.check(&TokenKind::From) {
                self.advance();
                Some(self.parse_module_source()?)
            } else {
                None
            };
            if let (None, Some(span)) = (&source, string_locals.first()) {
                return Err(ParseError {
                    message: "A string can only be exported from another module".to_string(),
                    span: *span,
                });
            }
            return Ok(self.finish_export(start, ExportDecl::Named { specifiers, source }));
        }

        // export const / let / var / function / class
        let names = self.declared_names(self.current)?;
        Ok(Node::new(Item::Export(ExportDecl::Declaration { names }), start))
    }

    /// A name in an export list; the flag is set when it was a string.
    fn parse_export_name(&mut self) -> ParseResult<(Node<Ident>, bool)> {
        let token = self.current_token().clone();
        if token.kind == TokenKind::StringLiteral || Self::is_name(&token) {
            self.advance();
            let is_string = token.kind == TokenKind::StringLiteral;
            Ok((Node::new(Ident::new(token.value), token.span), is_string))
        } else {
            Err(self.error(format!("Expected export name, found {:?}", token.kind)))
        }
    }

    fn finish_export(&mut self, start: Span, decl: ExportDecl) -> Node<Item> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        let span = start.merge(&self.previous_token().span);
        Node::new(Item::Export(decl), span)
    }

    /// Name of `function f` / `async function f` / `class C` at `index`.
    fn default_binding(&self, mut index: usize) -> Option<Node<Ident>> {
        if *self.kind_at(index) == TokenKind::Async && *self.kind_at(index + 1) == TokenKind::Function {
            index += 1;
        }
        let name = match self.kind_at(index) {
            TokenKind::Function if *self.kind_at(index + 1) == TokenKind::Star => index + 2,
            TokenKind::Function | TokenKind::Class => index + 1,
            _ => return None,
        };
        self.binding_ident(name)
    }

    fn binding_ident(&self, index: usize) -> Option<Node<Ident>> {
        let token = self.token_at(index)?;
        token
            .kind
            .is_identifier_like()
            .then(|| Node::new(Ident::new(token.value.clone()), token.span))
    }

    /// Every name bound by the declaration starting at `index`.
    fn declared_names(&self, index: usize) -> ParseResult<Vec<Node<Ident>>> {
        let mut names = Vec::new();
        match self.kind_at(index) {
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                let mut i = index + 1;
                loop {
                    i = self.binding_target(i, &mut names)?;
                    if *self.kind_at(i) == TokenKind::Eq {
                        i = self.expression_end(i + 1, true);
                    }
                    if *self.kind_at(i) != TokenKind::Comma {
                        return Ok(names);
                    }
                    i += 1;
                }
            }
            TokenKind::Async if *self.kind_at(index + 1) == TokenKind::Function => {
                names.push(self.declaration_name(index + 1)?);
            }
            TokenKind::Function | TokenKind::Class => names.push(self.declaration_name(index)?),
            other => {
                return Err(ParseError {
                    message: format!("Expected declaration after `export`, found {:?}", other),
                    span: self.span_at(index),
                })
            }
        }
        Ok(names)
    }

    fn declaration_name(&self, keyword: usize) -> ParseResult<Node<Ident>> {
        let mut index = keyword + 1;
        if *self.kind_at(keyword) == TokenKind::Function && *self.kind_at(index) == TokenKind::Star {
            index += 1;
        }
        self.binding_ident(index).ok_or_else(|| ParseError {
            message: "Exported declaration must have a name".to_string(),
            span: self.span_at(index),
        })
    }

    /// Collects the names bound by an identifier or destructuring pattern at
    /// `index`; returns the index just past it.
    fn binding_target(&self, index: usize, names: &mut Vec<Node<Ident>>) -> ParseResult<usize> {
        match self.kind_at(index) {
            kind if kind.is_identifier_like() => {
                names.extend(self.binding_ident(index));
                Ok(index + 1)
            }
            TokenKind::LBrace => self.object_pattern(index, names),
            TokenKind::LBracket => self.array_pattern(index, names),
            other => Err(ParseError {
                message: format!("Expected binding name or pattern, found {:?}", other),
                span: self.span_at(index),
            }),
        }
    }

    fn object_pattern(&self, open: usize, names: &mut Vec<Node<Ident>>) -> ParseResult<usize> {
        let mut i = open + 1;
        loop {
            let token = &self.tokens[i.min(self.tokens.len() - 1)];
            i = match token.kind {
                TokenKind::RBrace => return Ok(i + 1),
                TokenKind::DotDotDot => self.binding_target(i + 1, names)?,
                // [computed]: target
                TokenKind::LBracket => {
                    let close = self.expression_end(i + 1, false);
                    if *self.kind_at(close) != TokenKind::RBracket || *self.kind_at(close + 1) != TokenKind::Colon {
                        return Err(ParseError {
                            message: "Expected `]:` after computed key in pattern".to_string(),
                            span: self.span_at(close),
                        });
                    }
                    self.binding_target(close + 2, names)?
                }
                // key: target
                _ if *self.kind_at(i + 1) == TokenKind::Colon
                    && (Self::is_name(token)
                        || matches!(token.kind, TokenKind::StringLiteral | TokenKind::NumberLiteral)) =>
                {
                    self.binding_target(i + 2, names)?
                }
                // shorthand
                _ => self.binding_target(i, names)?,
            };

            if *self.kind_at(i) == TokenKind::Eq {
                i = self.expression_end(i + 1, false);
            }
            match self.kind_at(i) {
                TokenKind::Comma => i += 1,
                TokenKind::RBrace => {}
                other => {
                    return Err(ParseError {
                        message: format!("Expected `,` or `}}` in object pattern, found {:?}", other),
                        span: self.span_at(i),
                    })
                }
            }
        }
    }

    fn array_pattern(&self, open: usize, names: &mut Vec<Node<Ident>>) -> ParseResult<usize> {
        let mut i = open + 1;
        loop {
            i = match self.kind_at(i) {
                TokenKind::RBracket => return Ok(i + 1),
                // hole
                TokenKind::Comma => {
                    i += 1;
                    continue;
                }
                TokenKind::DotDotDot => self.binding_target(i + 1, names)?,
                _ => self.binding_target(i, names)?,
            };

            if *self.kind_at(i) == TokenKind::Eq {
                i = self.expression_end(i + 1, false);
            }
            match self.kind_at(i) {
                TokenKind::Comma => i += 1,
                TokenKind::RBracket => {}
                other => {
                    return Err(ParseError {
                        message: format!("Expected `,` or `]` in array pattern, found {:?}", other),
                        span: self.span_at(i),
                    })
                }
            }
        }
    }

    /// Index of the first token at nesting depth zero, from `start` on, that
    /// ends an expression: a comma, a semicolon, an unmatched closing bracket
    /// or the end of input. With `until_line_break`, a line break that ends
    /// the statement counts as well.
    fn expression_end(&self, start: usize, until_line_break: bool) -> usize {
        let mut depth = 0usize;
        let mut i = start;
        loop {
            let token = &self.tokens[i.min(self.tokens.len() - 1)];
            match token.kind {
                TokenKind::Eof => return i,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace | TokenKind::TemplateHead => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace | TokenKind::TemplateTail => {
                    if depth == 0 {
                        return i;
                    }
                    depth -= 1;
                }
                TokenKind::Comma | TokenKind::Semicolon if depth == 0 => return i,
                ref kind if until_line_break
                    && depth == 0
                    && i > start
                    && token.newline_before
                    && !kind.continues_expression()
                    && !self.kind_at(i - 1).continues_expression() =>
                {
                    return i
                }
                _ => {}
            }
            i += 1;
        }
    }
}
