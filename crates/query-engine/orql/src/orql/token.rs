//! ORQL token types.

use std::fmt;

use super::error::Span;

/// The closed set of token kinds produced by the [`Lexer`](super::lexer::Lexer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// An identifier.
    Name,
    /// *
    All,
    /// :
    Colon,
    /// {
    OpenCurly,
    /// }
    CloseCurly,
    /// (
    OpenParen,
    /// )
    CloseParen,
    /// >
    Gt,
    /// >=
    Ge,
    /// <
    Lt,
    /// <=
    Le,
    /// =
    Eq,
    /// !=
    Ne,
    /// like
    Like,
    /// &&
    And,
    /// ||
    Or,
    /// $name
    Param,
    /// true
    True,
    /// false
    False,
    Int,
    Float,
    /// A quoted string literal.
    String,
    /// null
    Null,
    /// ,
    Comma,
    /// -
    Hyphen,
    /// !
    Not,
    /// End of input.
    Eof,
}

impl TokenType {
    /// The name used for this token kind in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenType::Name => "name",
            TokenType::All => "'*'",
            TokenType::Colon => "':'",
            TokenType::OpenCurly => "'{'",
            TokenType::CloseCurly => "'}'",
            TokenType::OpenParen => "'('",
            TokenType::CloseParen => "')'",
            TokenType::Gt => "'>'",
            TokenType::Ge => "'>='",
            TokenType::Lt => "'<'",
            TokenType::Le => "'<='",
            TokenType::Eq => "'='",
            TokenType::Ne => "'!='",
            TokenType::Like => "'like'",
            TokenType::And => "'&&'",
            TokenType::Or => "'||'",
            TokenType::Param => "parameter",
            TokenType::True => "'true'",
            TokenType::False => "'false'",
            TokenType::Int => "integer",
            TokenType::Float => "float",
            TokenType::String => "string",
            TokenType::Null => "'null'",
            TokenType::Comma => "','",
            TokenType::Hyphen => "'-'",
            TokenType::Not => "'!'",
            TokenType::Eof => "end of input",
        }
    }

    /// Maps a case-sensitive literal keyword to its token kind.
    pub fn from_keyword(word: &str) -> Option<TokenType> {
        match word {
            "true" => Some(TokenType::True),
            "false" => Some(TokenType::False),
            "null" => Some(TokenType::Null),
            "like" => Some(TokenType::Like),
            _ => None,
        }
    }
}

/// A token with its optional lexeme and its span in the query text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    /// Text carried by names, parameters and literals. Quotes and the leading
    /// `$` are already stripped.
    pub lexeme: Option<String>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenType, lexeme: Option<String>, span: Span) -> Self {
        Self { kind, lexeme, span }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenType::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, &self.lexeme) {
            (TokenType::Name, Some(name)) => write!(f, "name '{name}'"),
            (TokenType::Param, Some(name)) => write!(f, "parameter '${name}'"),
            (TokenType::Int | TokenType::Float, Some(number)) => write!(f, "number '{number}'"),
            (TokenType::String, Some(string)) => write!(f, "string '{string}'"),
            (kind, _) => f.write_str(kind.describe()),
        }
    }
}
