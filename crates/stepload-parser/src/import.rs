//! Static import declarations

use super::*;

impl<'src> Parser<'src> {
    /// Parses `import ... from '...'` starting at the `import` keyword.
    pub(crate) fn parse_import_decl(&mut self) -> ParseResult<Node<Item>> {
        let start = self.consume(TokenKind::Import)?.span;
        let mut specifiers = Vec::new();

        // import "module"
        if self.check(&TokenKind::StringLiteral) {
            let source = self.parse_module_source()?;
            return Ok(self.finish_import(start, specifiers, source));
        }

        if self.current_token().kind.is_identifier_like() {
            specifiers.push(ImportSpecifier::Default(self.consume_binding()?));

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                self.consume(TokenKind::From)?;
                let source = self.parse_module_source()?;
                return Ok(self.finish_import(start, specifiers, source));
            }
        }

        if self.check(&TokenKind::Star) {
            // import * as name from "module"
            self.advance();
            self.consume(TokenKind::As)?;
            specifiers.push(ImportSpecifier::Namespace(self.consume_binding()?));
        } else if self.check(&TokenKind::LBrace) {
            self.advance();
            while !self.check(&TokenKind::RBrace) {
                specifiers.push(self.parse_named_specifier()?);
                if !self.check(&TokenKind::RBrace) {
                    self.consume(TokenKind::Comma)?;
                }
            }
            self.consume(TokenKind::RBrace)?;
        } else {
            return Err(self.error(format!(
                "Expected import specifiers, found {:?}",
                self.current_token().kind
            )));
        }

        self.consume(TokenKind::From)?;
        let source = self.parse_module_source()?;
        Ok(self.finish_import(start, specifiers, source))
    }

    fn parse_named_specifier(&mut self) -> ParseResult<ImportSpecifier> {
        let token = self.current_token().clone();
        // Any name (keywords included) or a string may be imported, but only
        // identifiers may be bound locally.
        let imported = if token.kind == TokenKind::StringLiteral || Self::is_name(&token) {
            self.advance();
            Node::new(Ident::new(token.value.clone()), token.span)
        } else {
            return Err(self.error(format!("Expected import name, found {:?}", token.kind)));
        };

        if self.check(&TokenKind::As) {
            self.advance();
            let local = self.consume_binding()?;
            return Ok(ImportSpecifier::Named { imported, local: Some(local) });
        }

        if token.kind == TokenKind::StringLiteral || !token.kind.is_identifier_like() {
            return Err(ParseError {
                message: format!("Import name '{}' must be renamed with `as`", token.value),
                span: token.span,
            });
        }

        Ok(ImportSpecifier::Named { imported, local: None })
    }

    /// Identifier-shaped token, keywords included (`default`, `from`, ...).
    pub(crate) fn is_name(token: &Token) -> bool {
        let identifier_shaped = token
            .value
            .chars()
            .next()
            .map_or(false, |c| c.is_alphabetic() || c == '_' || c == '$')
            && token.value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
        identifier_shaped
            && !matches!(
                token.kind,
                TokenKind::StringLiteral
                    | TokenKind::TemplateLiteral
                    | TokenKind::TemplateHead
                    | TokenKind::PrivateName
                    | TokenKind::Error
            )
    }

    pub(crate) fn parse_module_source(&mut self) -> ParseResult<Node<StrLit>> {
        let token = self.consume(TokenKind::StringLiteral)?.clone();
        let quote = self.quote_of(&token);
        Ok(Node::new(StrLit::new(token.value, quote), token.span))
    }

    fn finish_import(&mut self, start: Span, specifiers: Vec<ImportSpecifier>, source: Node<StrLit>) -> Node<Item> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        let span = start.merge(&self.previous_token().span);
        Node::new(Item::Import(ImportDecl { specifiers, source }), span)
    }
}
