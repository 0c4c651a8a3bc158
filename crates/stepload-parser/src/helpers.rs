//! Token cursor helpers

use super::*;

impl<'src> Parser<'src> {
    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn token_at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.token_at(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, found {:?}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn consume_binding(&mut self) -> ParseResult<Node<Ident>> {
        if self.current_token().kind.is_identifier_like() {
            let token = self.advance();
            Ok(Node::new(Ident::new(token.value.clone()), token.span))
        } else {
            Err(self.error(format!(
                "Expected binding identifier, found {:?}",
                self.current_token().kind
            )))
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            span: self.current_token().span,
        }
    }

    /// Kind of the token at `index`; `Eof` past the end.
    pub(crate) fn kind_at(&self, index: usize) -> &TokenKind {
        &self.tokens[index.min(self.tokens.len() - 1)].kind
    }

    pub(crate) fn span_at(&self, index: usize) -> Span {
        self.tokens[index.min(self.tokens.len() - 1)].span
    }

    /// Kind of the token before `index`, if any.
    pub(crate) fn kind_before(&self, index: usize) -> Option<&TokenKind> {
        index.checked_sub(1).and_then(|i| self.token_at(i)).map(|t| &t.kind)
    }

    /// Whether the token at `index` begins a new statement.
    pub(crate) fn at_statement_start(&self, index: usize) -> bool {
        match self.kind_before(index) {
            None => true,
            Some(TokenKind::Semicolon) | Some(TokenKind::LBrace) | Some(TokenKind::RBrace) => true,
            Some(prev) => {
                let newline = self.token_at(index).map_or(false, |t| t.newline_before);
                newline && !prev.continues_expression()
            }
        }
    }

    /// Whether the string literal at `index` sits in a directive prologue:
    /// the start of the file or of a function body, preceded only by other
    /// directives.
    pub(crate) fn in_prologue(&self, index: usize) -> bool {
        let Some(prev) = index.checked_sub(1) else {
            return true;
        };

        match self.tokens[prev].kind {
            TokenKind::Semicolon => match prev.checked_sub(1) {
                Some(string) if self.tokens[string].kind == TokenKind::StringLiteral => self.in_prologue(string),
                _ => false,
            },
            TokenKind::StringLiteral => self.tokens[index].newline_before && self.in_prologue(prev),
            TokenKind::LBrace => self.opens_function_body(prev),
            _ => false,
        }
    }

    /// Whether the `{` at `index` opens a function, method or arrow body.
    fn opens_function_body(&self, index: usize) -> bool {
        match self.kind_before(index) {
            Some(TokenKind::FatArrow) => true,
            Some(TokenKind::RParen) => match self.matching_open_paren(index - 1) {
                Some(open) => !matches!(
                    self.kind_before(open),
                    Some(TokenKind::If)
                        | Some(TokenKind::While)
                        | Some(TokenKind::For)
                        | Some(TokenKind::With)
                        | Some(TokenKind::Switch)
                        | Some(TokenKind::Catch)
                        | None
                ),
                None => false,
            },
            _ => false,
        }
    }

    /// Index of the `(` matching the `)` at `close`.
    fn matching_open_paren(&self, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in (0..=close).rev() {
            match self.tokens[index].kind {
                TokenKind::RParen => depth += 1,
                TokenKind::LParen => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Whether the statement that ends just before `index` is terminated there.
    pub(crate) fn ends_statement(&self, index: usize) -> bool {
        match self.token_at(index) {
            None => true,
            Some(token) => match token.kind {
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof => true,
                ref kind => token.newline_before && !kind.continues_expression(),
            },
        }
    }

    /// Index of the `)` matching the `(` at `open`.
    pub(crate) fn matching_paren(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (offset, token) in self.tokens[open..].iter().enumerate() {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(open + offset);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    /// Skips to the next plausible statement boundary after an error.
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon {
                return;
            }

            if self.current_token().newline_before {
                return;
            }

            self.advance();
        }
    }
}
