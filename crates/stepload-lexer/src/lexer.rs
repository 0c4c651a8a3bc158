use stepload_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for JavaScript.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    file_id: usize,
    /// Kind of the last significant token, used to tell regex from division
    prev_kind: Option<TokenKind>,
    /// Set when a line terminator is skipped before the next token
    saw_newline: bool,
    brace_depth: usize,
    /// Brace depth at which each open template substitution `${` started
    template_stack: Vec<usize>,
    /// One entry per open `(`: true if it follows `if`, `while`, `for` or `with`
    paren_stack: Vec<bool>,
    /// The last token closed a control-statement head, so a statement follows
    after_control_paren: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        Self::with_file_id(source, 0)
    }

    /// Creates a new lexer with a specific file ID.
    pub fn with_file_id(source: &'a str, file_id: usize) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            file_id,
            prev_kind: None,
            saw_newline: false,
            brace_depth: 0,
            template_stack: Vec::new(),
            paren_stack: Vec::new(),
            after_control_paren: false,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        let mut token = match self.skip_whitespace_and_comments() {
            Some(error_token) => error_token,
            None => self.scan_token(),
        };
        token.newline_before = self.saw_newline;
        if token.kind != TokenKind::Error {
            if token.kind != TokenKind::RParen {
                self.after_control_paren = false;
            }
            self.prev_kind = Some(token.kind.clone());
        }
        token
    }

    fn scan_token(&mut self) -> Token {
        let start = self.current_pos;

        match self.current_char {
            None => Token::new(TokenKind::Eof, self.span_from(start), String::new()),
            Some(ch) => match ch {
                // String literals
                '"' | '\'' => self.read_string_literal(ch),
                '`' => {
                    self.advance(); // Skip opening backtick
                    self.read_template_chars(start, true)
                }

                // Numbers
                '0'..='9' => self.read_number(),

                // Identifiers and keywords
                'a'..='z' | 'A'..='Z' | '_' | '$' => self.read_identifier_or_keyword(),
                '#' => self.read_private_name(),

                // Operators and delimiters
                '+' => self.read_plus(),
                '-' => self.read_minus(),
                '*' => self.read_star(),
                '/' => {
                    if self.regex_allowed() {
                        self.read_regex()
                    } else {
                        self.read_slash()
                    }
                }
                '%' => self.read_percent(),
                '=' => self.read_eq(),
                '!' => self.read_bang(),
                '<' => self.read_lt(),
                '>' => self.read_gt(),
                '&' => self.read_amp(),
                '|' => self.read_pipe(),
                '^' => {
                    self.advance();
                    if self.current_char == Some('=') {
                        self.advance();
                        Token::new(TokenKind::CaretEq, self.span_from(start), "^=".to_string())
                    } else {
                        Token::new(TokenKind::Caret, self.span_from(start), "^".to_string())
                    }
                }
                '~' => self.single(TokenKind::Tilde, "~"),
                '?' => self.read_question(),
                '.' => self.read_dot(),

                // Delimiters
                '(' => {
                    let control = matches!(
                        self.prev_kind,
                        Some(TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::With)
                    );
                    self.paren_stack.push(control);
                    self.single(TokenKind::LParen, "(")
                }
                ')' => {
                    self.after_control_paren = self.paren_stack.pop().unwrap_or(false);
                    self.single(TokenKind::RParen, ")")
                }
                '{' => {
                    self.brace_depth += 1;
                    self.single(TokenKind::LBrace, "{")
                }
                '}' => {
                    if self.template_stack.last() == Some(&self.brace_depth) {
                        self.template_stack.pop();
                        self.advance(); // Skip closing brace of the substitution
                        self.read_template_chars(start, false)
                    } else {
                        self.brace_depth = self.brace_depth.saturating_sub(1);
                        self.single(TokenKind::RBrace, "}")
                    }
                }
                '[' => self.single(TokenKind::LBracket, "["),
                ']' => self.single(TokenKind::RBracket, "]"),
                ';' => self.single(TokenKind::Semicolon, ";"),
                ',' => self.single(TokenKind::Comma, ","),
                ':' => self.single(TokenKind::Colon, ":"),
                '@' => self.single(TokenKind::At, "@"),

                // Unicode identifiers
                _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),

                // Error
                _ => {
                    self.advance();
                    Token::new(
                        TokenKind::Error,
                        self.span_from(start),
                        format!("Unexpected character: {}", ch),
                    )
                }
            },
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.current_pos, self.file_id)
    }

    fn single(&mut self, kind: TokenKind, text: &str) -> Token {
        let start = self.current_pos;
        self.advance();
        Token::new(kind, self.span_from(start), text.to_string())
    }

    fn regex_allowed(&self) -> bool {
        self.after_control_paren || self.prev_kind.as_ref().map_or(true, |kind| kind.allows_regex_after())
    }

    fn is_line_terminator(ch: char) -> bool {
        matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        // Hashbang line
        if self.current_pos == 0 && self.current_char == Some('#') && self.peek() == Some('!') {
            self.skip_single_line_comment();
        }

        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    if Self::is_line_terminator(ch) {
                        self.saw_newline = true;
                    }
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        if !self.skip_multi_line_comment() {
                            return Some(Token::new(
                                TokenKind::Error,
                                self.span_from(start),
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        // Skip // (or #!)
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if Self::is_line_terminator(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance(); // *
                self.advance(); // /
                return true;
            }
            if Self::is_line_terminator(ch) {
                self.saw_newline = true;
            }
            self.advance();
        }
        false // Unterminated
    }

    /// Consumes the character after a backslash and returns its cooked value,
    /// or `None` for a line continuation.
    fn read_escape(&mut self) -> Option<char> {
        let escaped = self.current_char?;
        match escaped {
            'u' => {
                self.advance();
                Some(self.read_unicode_escape())
            }
            'x' => {
                self.advance();
                Some(self.read_hex_escape())
            }
            '\r' => {
                self.advance();
                if self.current_char == Some('\n') {
                    self.advance();
                }
                None
            }
            '\n' | '\u{2028}' | '\u{2029}' => {
                self.advance();
                None
            }
            _ => {
                let unescaped = match escaped {
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'v' => '\u{b}',
                    '0' => '\0',
                    _ => escaped,
                };
                self.advance();
                Some(unescaped)
            }
        }
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance(); // Skip closing quote
                return Token::new(TokenKind::StringLiteral, self.span_from(start), value);
            } else if ch == '\\' {
                self.advance();
                if let Some(unescaped) = self.read_escape() {
                    value.push(unescaped);
                }
            } else if Self::is_line_terminator(ch) {
                return Token::new(
                    TokenKind::Error,
                    self.span_from(start),
                    "Unterminated string literal".to_string(),
                );
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated string literal".to_string(),
        )
    }

    fn read_unicode_escape(&mut self) -> char {
        if self.current_char == Some('{') {
            self.advance();
            let mut code = 0u32;
            while let Some(ch) = self.current_char {
                if ch == '}' {
                    self.advance();
                    break;
                }
                match ch.to_digit(16) {
                    Some(digit) => {
                        code = code.saturating_mul(16).saturating_add(digit);
                        self.advance();
                    }
                    None => break,
                }
            }
            return char::from_u32(code).unwrap_or('\u{FFFD}');
        }

        let mut code = 0u32;
        for _ in 0..4 {
            if let Some(ch) = self.current_char {
                if let Some(digit) = ch.to_digit(16) {
                    code = code * 16 + digit;
                    self.advance();
                } else {
                    break;
                }
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    fn read_hex_escape(&mut self) -> char {
        let mut code = 0u32;
        for _ in 0..2 {
            if let Some(ch) = self.current_char {
                if let Some(digit) = ch.to_digit(16) {
                    code = code * 16 + digit;
                    self.advance();
                } else {
                    break;
                }
            }
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    /// Reads template characters after an opening backtick (`head`) or after
    /// the `}` closing a substitution.
    fn read_template_chars(&mut self, start: usize, head: bool) -> Token {
        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == '`' {
                self.advance(); // Skip closing backtick
                let kind = if head { TokenKind::TemplateLiteral } else { TokenKind::TemplateTail };
                return Token::new(kind, self.span_from(start), value);
            } else if ch == '$' && self.peek() == Some('{') {
                self.advance(); // $
                self.advance(); // {
                self.template_stack.push(self.brace_depth);
                let kind = if head { TokenKind::TemplateHead } else { TokenKind::TemplateMiddle };
                return Token::new(kind, self.span_from(start), value);
            } else if ch == '\\' {
                self.advance();
                if let Some(unescaped) = self.read_escape() {
                    value.push(unescaped);
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated template literal".to_string(),
        )
    }

    fn read_regex(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening slash

        let mut in_class = false;
        loop {
            match self.current_char {
                None => break,
                Some(ch) if Self::is_line_terminator(ch) => break,
                Some('\\') => {
                    self.advance();
                    if self.current_char.map_or(false, |c| !Self::is_line_terminator(c)) {
                        self.advance();
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.advance();
                }
                Some('/') if !in_class => {
                    self.advance(); // Skip closing slash
                    while let Some(flag) = self.current_char {
                        if flag.is_alphanumeric() {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let raw = self.source[start..self.current_pos].to_string();
                    return Token::new(TokenKind::RegexLiteral, self.span_from(start), raw);
                }
                Some(_) => self.advance(),
            }
        }

        Token::new(
            TokenKind::Error,
            self.span_from(start),
            "Unterminated regular expression".to_string(),
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;

        // Check for special number formats
        if self.current_char == Some('0') {
            match self.peek() {
                Some('x') | Some('X') => return self.read_radix_number(start, "0x", |c| c.is_ascii_hexdigit()),
                Some('o') | Some('O') => return self.read_radix_number(start, "0o", |c| ('0'..='7').contains(&c)),
                Some('b') | Some('B') => return self.read_radix_number(start, "0b", |c| c == '0' || c == '1'),
                _ => {}
            }
        }

        let mut value = String::new();
        self.read_digits(&mut value);

        // Check for decimal point
        if self.current_char == Some('.') && self.peek().map_or(false, |c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            self.read_digits(&mut value);
        } else if self.current_char == Some('.') && !self.peek().map_or(false, |c| c.is_alphabetic() || c == '.') {
            // Trailing dot: 1.
            value.push('.');
            self.advance();
        }

        // Check for exponent
        if matches!(self.current_char, Some('e') | Some('E')) {
            value.push('e');
            self.advance();

            if let Some(sign @ ('+' | '-')) = self.current_char {
                value.push(sign);
                self.advance();
            }

            self.read_digits(&mut value);
        }

        // Check for BigInt suffix
        if self.current_char == Some('n') {
            self.advance();
            return Token::new(TokenKind::BigIntLiteral, self.span_from(start), value);
        }

        Token::new(TokenKind::NumberLiteral, self.span_from(start), value)
    }

    fn read_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_radix_number(&mut self, start: usize, prefix: &str, is_digit: fn(char) -> bool) -> Token {
        let mut value = String::from(prefix);
        self.advance(); // 0
        self.advance(); // x / o / b

        while let Some(ch) = self.current_char {
            if is_digit(ch) || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        if self.current_char == Some('n') {
            self.advance();
            return Token::new(TokenKind::BigIntLiteral, self.span_from(start), value);
        }

        Token::new(TokenKind::NumberLiteral, self.span_from(start), value)
    }

    fn read_identifier_chars(&mut self) -> String {
        let mut value = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        value
    }

    fn read_private_name(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // #
        let name = self.read_identifier_chars();
        if name.is_empty() {
            return Token::new(
                TokenKind::Error,
                self.span_from(start),
                "Unexpected character: #".to_string(),
            );
        }
        Token::new(TokenKind::PrivateName, self.span_from(start), name)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        let value = self.read_identifier_chars();

        let kind = match value.as_str() {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "class" => TokenKind::Class,
            "extends" => TokenKind::Extends,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "super" => TokenKind::Super,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "of" => TokenKind::Of,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "null" => TokenKind::Null,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "async" => TokenKind::Async,
            "await" => TokenKind::Await,
            "yield" => TokenKind::Yield,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "static" => TokenKind::Static,
            "debugger" => TokenKind::Debugger,
            "with" => TokenKind::With,
            "require" => TokenKind::Require,
            _ => TokenKind::Identifier,
        };

        Token::new(kind, self.span_from(start), value)
    }

    fn read_plus(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('+') => {
                self.advance();
                Token::new(TokenKind::PlusPlus, self.span_from(start), "++".to_string())
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::PlusEq, self.span_from(start), "+=".to_string())
            }
            _ => Token::new(TokenKind::Plus, self.span_from(start), "+".to_string()),
        }
    }

    fn read_minus(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('-') => {
                self.advance();
                Token::new(TokenKind::MinusMinus, self.span_from(start), "--".to_string())
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::MinusEq, self.span_from(start), "-=".to_string())
            }
            _ => Token::new(TokenKind::Minus, self.span_from(start), "-".to_string()),
        }
    }

    fn read_star(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('*') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::StarStarEq, self.span_from(start), "**=".to_string())
                } else {
                    Token::new(TokenKind::StarStar, self.span_from(start), "**".to_string())
                }
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::StarEq, self.span_from(start), "*=".to_string())
            }
            _ => Token::new(TokenKind::Star, self.span_from(start), "*".to_string()),
        }
    }

    fn read_slash(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('=') => {
                self.advance();
                Token::new(TokenKind::SlashEq, self.span_from(start), "/=".to_string())
            }
            _ => Token::new(TokenKind::Slash, self.span_from(start), "/".to_string()),
        }
    }

    fn read_percent(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        if self.current_char == Some('=') {
            self.advance();
            Token::new(TokenKind::PercentEq, self.span_from(start), "%=".to_string())
        } else {
            Token::new(TokenKind::Percent, self.span_from(start), "%".to_string())
        }
    }

    fn read_eq(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('=') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::EqEqEq, self.span_from(start), "===".to_string())
                } else {
                    Token::new(TokenKind::EqEq, self.span_from(start), "==".to_string())
                }
            }
            Some('>') => {
                self.advance();
                Token::new(TokenKind::FatArrow, self.span_from(start), "=>".to_string())
            }
            _ => Token::new(TokenKind::Eq, self.span_from(start), "=".to_string()),
        }
    }

    fn read_bang(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('=') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::BangEqEq, self.span_from(start), "!==".to_string())
                } else {
                    Token::new(TokenKind::BangEq, self.span_from(start), "!=".to_string())
                }
            }
            _ => Token::new(TokenKind::Bang, self.span_from(start), "!".to_string()),
        }
    }

    fn read_lt(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('<') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::LtLtEq, self.span_from(start), "<<=".to_string())
                } else {
                    Token::new(TokenKind::LtLt, self.span_from(start), "<<".to_string())
                }
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::LtEq, self.span_from(start), "<=".to_string())
            }
            _ => Token::new(TokenKind::Lt, self.span_from(start), "<".to_string()),
        }
    }

    fn read_gt(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('>') => {
                self.advance();
                match self.current_char {
                    Some('>') => {
                        self.advance();
                        if self.current_char == Some('=') {
                            self.advance();
                            Token::new(TokenKind::GtGtGtEq, self.span_from(start), ">>>=".to_string())
                        } else {
                            Token::new(TokenKind::GtGtGt, self.span_from(start), ">>>".to_string())
                        }
                    }
                    Some('=') => {
                        self.advance();
                        Token::new(TokenKind::GtGtEq, self.span_from(start), ">>=".to_string())
                    }
                    _ => Token::new(TokenKind::GtGt, self.span_from(start), ">>".to_string()),
                }
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::GtEq, self.span_from(start), ">=".to_string())
            }
            _ => Token::new(TokenKind::Gt, self.span_from(start), ">".to_string()),
        }
    }

    fn read_amp(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('&') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::AmpAmpEq, self.span_from(start), "&&=".to_string())
                } else {
                    Token::new(TokenKind::AmpAmp, self.span_from(start), "&&".to_string())
                }
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::AmpEq, self.span_from(start), "&=".to_string())
            }
            _ => Token::new(TokenKind::Amp, self.span_from(start), "&".to_string()),
        }
    }

    fn read_pipe(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('|') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::PipePipeEq, self.span_from(start), "||=".to_string())
                } else {
                    Token::new(TokenKind::PipePipe, self.span_from(start), "||".to_string())
                }
            }
            Some('=') => {
                self.advance();
                Token::new(TokenKind::PipeEq, self.span_from(start), "|=".to_string())
            }
            _ => Token::new(TokenKind::Pipe, self.span_from(start), "|".to_string()),
        }
    }

    fn read_question(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        match self.current_char {
            Some('?') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenKind::QuestionQuestionEq, self.span_from(start), "??=".to_string())
                } else {
                    Token::new(TokenKind::QuestionQuestion, self.span_from(start), "??".to_string())
                }
            }
            // `a?.5:b` is a conditional, not optional chaining
            Some('.') if !self.peek().map_or(false, |c| c.is_ascii_digit()) => {
                self.advance();
                Token::new(TokenKind::QuestionDot, self.span_from(start), "?.".to_string())
            }
            _ => Token::new(TokenKind::Question, self.span_from(start), "?".to_string()),
        }
    }

    fn read_dot(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        if self.current_char == Some('.') && self.peek() == Some('.') {
            self.advance();
            self.advance();
            Token::new(TokenKind::DotDotDot, self.span_from(start), "...".to_string())
        } else if self.current_char.map_or(false, |c| c.is_ascii_digit()) {
            // Number starting with dot (e.g., .5)
            let mut value = String::from("0.");
            self.read_digits(&mut value);

            if matches!(self.current_char, Some('e') | Some('E')) {
                value.push('e');
                self.advance();

                if let Some(sign @ ('+' | '-')) = self.current_char {
                    value.push(sign);
                    self.advance();
                }

                self.read_digits(&mut value);
            }

            Token::new(TokenKind::NumberLiteral, self.span_from(start), value)
        } else {
            Token::new(TokenKind::Dot, self.span_from(start), ".".to_string())
        }
    }
}
