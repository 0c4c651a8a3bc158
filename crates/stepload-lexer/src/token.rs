use stepload_ast::Span;

/// Represents the different kinds of tokens in JavaScript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Let,
    Const,
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Class,
    Extends,
    Import,
    Export,
    From,
    As,
    New,
    This,
    Super,
    Typeof,
    Instanceof,
    In,
    Of,
    Void,
    Delete,
    Null,
    True,
    False,
    Async,
    Await,
    Yield,
    Try,
    Catch,
    Finally,
    Throw,
    Static,
    Debugger,
    With,
    Require,

    // Literals
    NumberLiteral,
    StringLiteral,
    /// Template without substitutions: `text`
    TemplateLiteral,
    /// Template start up to the first substitution: `text${
    TemplateHead,
    /// Between two substitutions: }text${
    TemplateMiddle,
    /// After the last substitution: }text`
    TemplateTail,
    RegexLiteral,
    BigIntLiteral,

    // Identifiers
    Identifier,
    /// Class private name: #field
    PrivateName,

    // Operators
    Plus,              // +
    Minus,             // -
    Star,              // *
    Slash,             // /
    Percent,           // %
    StarStar,          // **
    Eq,                // =
    EqEq,              // ==
    EqEqEq,            // ===
    BangEq,            // !=
    BangEqEq,          // !==
    Lt,                // <
    Gt,                // >
    LtEq,              // <=
    GtEq,              // >=
    AmpAmp,            // &&
    PipePipe,          // ||
    Bang,              // !
    Amp,               // &
    Pipe,              // |
    Caret,             // ^
    Tilde,             // ~
    LtLt,              // <<
    GtGt,              // >>
    GtGtGt,            // >>>
    PlusEq,            // +=
    MinusEq,           // -=
    StarEq,            // *=
    SlashEq,           // /=
    PercentEq,         // %=
    StarStarEq,        // **=
    AmpAmpEq,          // &&=
    PipePipeEq,        // ||=
    QuestionQuestionEq,// ??=
    LtLtEq,            // <<=
    GtGtEq,            // >>=
    GtGtGtEq,          // >>>=
    AmpEq,             // &=
    PipeEq,            // |=
    CaretEq,           // ^=
    QuestionQuestion,  // ??
    QuestionDot,       // ?.
    PlusPlus,          // ++
    MinusMinus,        // --
    FatArrow,          // =>
    DotDotDot,         // ...

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    Colon,             // :
    Question,          // ?
    At,                // @

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keywords that are only reserved in some positions and may name bindings.
    pub fn is_identifier_like(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Let
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Of
                | TokenKind::Async
                | TokenKind::Static
                | TokenKind::Require
        )
    }

    /// Whether a `/` following this token starts a regular expression
    /// rather than a division.
    pub fn allows_regex_after(&self) -> bool {
        !(self.is_identifier_like()
            || matches!(
                self,
                TokenKind::NumberLiteral
                    | TokenKind::StringLiteral
                    | TokenKind::TemplateLiteral
                    | TokenKind::TemplateTail
                    | TokenKind::RegexLiteral
                    | TokenKind::BigIntLiteral
                    | TokenKind::PrivateName
                    | TokenKind::This
                    | TokenKind::Super
                    | TokenKind::Null
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::PlusPlus
                    | TokenKind::MinusMinus
            ))
    }

    /// Tokens that can only continue the expression on the previous line,
    /// so a line break before them does not end a statement.
    pub fn continues_expression(&self) -> bool {
        matches!(
            self,
            TokenKind::Dot
                | TokenKind::QuestionDot
                | TokenKind::Comma
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::TemplateLiteral
                | TokenKind::TemplateHead
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Eq
                | TokenKind::EqEq
                | TokenKind::EqEqEq
                | TokenKind::BangEq
                | TokenKind::BangEqEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::LtEq
                | TokenKind::GtEq
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::QuestionQuestion
                | TokenKind::Amp
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::LtLt
                | TokenKind::GtGt
                | TokenKind::GtGtGt
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::StarStar
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::In
                | TokenKind::Instanceof
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::StarStarEq
                | TokenKind::AmpAmpEq
                | TokenKind::PipePipeEq
                | TokenKind::QuestionQuestionEq
                | TokenKind::LtLtEq
                | TokenKind::GtGtEq
                | TokenKind::GtGtGtEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::FatArrow
        )
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    /// A line terminator appeared between the previous token and this one
    pub newline_before: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value, newline_before: false }
    }
}
