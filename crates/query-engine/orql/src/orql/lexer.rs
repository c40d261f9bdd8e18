//! ORQL tokenizer.
//!
//! The [`Lexer`] produces tokens lazily, one per call to [`Lexer::next_token`].
//! It handles:
//! - names and the case-sensitive keywords `true`, `false`, `null`, `like`
//! - integer and float literals (the sign is a separate `-` token)
//! - single- or double-quoted strings, where `\` followed by the opening quote
//!   yields a literal quote
//! - parameters (`$id`, `$user.id`), whose name may contain dots
//! - one- and two-character operators and punctuation

use super::error::{Error, Span};
use super::token::{Token, TokenType};

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether the iterator has already yielded EOF.
    eof_returned: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            eof_returned: false,
        }
    }

    /// Returns the next token. Once the input is exhausted every call returns EOF.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_whitespace();

        let start = self.pos;
        let Some(ch) = self.peek(0) else {
            return Ok(Token::new(TokenType::Eof, None, Span::at(start)));
        };

        match ch {
            '\'' | '"' => self.scan_string(ch),
            '$' => self.scan_param(),
            ch if ch.is_ascii_digit() => Ok(self.scan_number()),
            ch if is_name_start(ch) => Ok(self.scan_name_or_keyword()),
            _ => self.scan_operator(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(ch) = self.peek(0) {
                self.pos += ch.len_utf8();
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<Token, Error> {
        let start = self.pos;
        self.advance(1);

        let mut value = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(Error::UnterminatedString {
                        span: Span::new(start, self.pos),
                    })
                }
                Some('\\') if self.peek(1) == Some(quote) => {
                    value.push(quote);
                    self.advance(2);
                }
                Some(ch) if ch == quote => {
                    self.advance(1);
                    break;
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance(1);
                }
            }
        }

        Ok(Token::new(
            TokenType::String,
            Some(value),
            Span::new(start, self.pos),
        ))
    }

    fn scan_param(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        self.advance(1); // '$'

        let name_start = self.pos;
        if self.peek(0).is_some_and(is_name_start) {
            while self
                .peek(0)
                .is_some_and(|ch| is_name_continue(ch) || ch == '.')
            {
                self.advance(1);
            }
        }

        let span = Span::new(start, self.pos);
        if self.pos == name_start {
            return Err(Error::InvalidParameter { span });
        }

        Ok(Token::new(
            TokenType::Param,
            Some(self.input[name_start..self.pos].to_string()),
            span,
        ))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        self.skip_digits();

        let mut kind = TokenType::Int;
        // a dot only belongs to the number when digits follow it
        if self.peek(0) == Some('.') && self.peek(1).is_some_and(|ch| ch.is_ascii_digit()) {
            kind = TokenType::Float;
            self.advance(1);
            self.skip_digits();
        }

        Token::new(
            kind,
            Some(self.input[start..self.pos].to_string()),
            Span::new(start, self.pos),
        )
    }

    fn skip_digits(&mut self) {
        while self.peek(0).is_some_and(|ch| ch.is_ascii_digit()) {
            self.advance(1);
        }
    }

    fn scan_name_or_keyword(&mut self) -> Token {
        let start = self.pos;
        while self.peek(0).is_some_and(is_name_continue) {
            self.advance(1);
        }

        let word = &self.input[start..self.pos];
        let kind = TokenType::from_keyword(word).unwrap_or(TokenType::Name);
        Token::new(kind, Some(word.to_string()), Span::new(start, self.pos))
    }

    fn scan_operator(&mut self) -> Result<Token, Error> {
        let start = self.pos;

        // Two-character operators first, so that '>=' is never read as '>' '='.
        if let Some(two_chars) = self.input.get(self.pos..self.pos + 2) {
            let kind = match two_chars {
                ">=" => Some(TokenType::Ge),
                "<=" => Some(TokenType::Le),
                "!=" => Some(TokenType::Ne),
                "&&" => Some(TokenType::And),
                "||" => Some(TokenType::Or),
                _ => None,
            };
            if let Some(kind) = kind {
                self.pos += 2;
                return Ok(Token::new(kind, None, Span::new(start, self.pos)));
            }
        }

        let Some(ch) = self.peek(0) else {
            return Ok(Token::new(TokenType::Eof, None, Span::at(start)));
        };
        self.advance(1);
        let span = Span::new(start, self.pos);
        let kind = match ch {
            '*' => TokenType::All,
            ':' => TokenType::Colon,
            '{' => TokenType::OpenCurly,
            '}' => TokenType::CloseCurly,
            '(' => TokenType::OpenParen,
            ')' => TokenType::CloseParen,
            '>' => TokenType::Gt,
            '<' => TokenType::Lt,
            '=' => TokenType::Eq,
            ',' => TokenType::Comma,
            '-' => TokenType::Hyphen,
            '!' => TokenType::Not,
            _ => {
                return Err(Error::UnexpectedCharacter {
                    character: ch,
                    span,
                })
            }
        };
        Ok(Token::new(kind, None, span))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    /// Yields every token up to and including a single EOF.
    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_returned {
            return None;
        }
        let token = self.next_token();
        match &token {
            Ok(token) if token.is_eof() => self.eof_returned = true,
            Err(_) => self.eof_returned = true,
            Ok(_) => {}
        }
        Some(token)
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenType> {
        Lexer::new(input)
            .map(|token| token.map(|token| token.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn lexemes(input: &str) -> Vec<Option<String>> {
        Lexer::new(input)
            .map(|token| token.map(|token| token.lexeme))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_selection_punctuation() {
        assert_eq!(
            kinds("user: {*, !password}"),
            vec![
                TokenType::Name,
                TokenType::Colon,
                TokenType::OpenCurly,
                TokenType::All,
                TokenType::Comma,
                TokenType::Not,
                TokenType::Name,
                TokenType::CloseCurly,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_are_greedy() {
        assert_eq!(
            kinds("> >= < <= = != ! && ||"),
            vec![
                TokenType::Gt,
                TokenType::Ge,
                TokenType::Lt,
                TokenType::Le,
                TokenType::Eq,
                TokenType::Ne,
                TokenType::Not,
                TokenType::And,
                TokenType::Or,
                TokenType::Eof,
            ]
        );
        assert_eq!(
            kinds("a>=1"),
            vec![TokenType::Name, TokenType::Ge, TokenType::Int, TokenType::Eof]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("true false null like True NULL likes"),
            vec![
                TokenType::True,
                TokenType::False,
                TokenType::Null,
                TokenType::Like,
                TokenType::Name,
                TokenType::Name,
                TokenType::Name,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("1 1.5 -2"),
            vec![
                TokenType::Int,
                TokenType::Float,
                TokenType::Hyphen,
                TokenType::Int,
                TokenType::Eof,
            ]
        );
        assert_eq!(
            lexemes("12 3.25"),
            vec![Some("12".to_string()), Some("3.25".to_string()), None]
        );
    }

    #[test]
    fn test_dot_without_digits_is_not_part_of_the_number() {
        let mut lexer = Lexer::new("1.");
        assert_eq!(lexer.next_token().unwrap().kind, TokenType::Int);
        assert_eq!(
            lexer.next_token(),
            Err(Error::UnexpectedCharacter {
                character: '.',
                span: Span::new(1, 2),
            })
        );
    }

    #[test]
    fn test_floats_need_a_leading_digit() {
        assert_eq!(
            Lexer::new(".5").next_token(),
            Err(Error::UnexpectedCharacter {
                character: '.',
                span: Span::new(0, 1),
            })
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lexemes(r#""str" 'str' 'st\'r' "say \"hi\"" 'a\"b' 'c\d'"#),
            vec![
                Some("str".to_string()),
                Some("str".to_string()),
                Some("st'r".to_string()),
                Some("say \"hi\"".to_string()),
                Some("a\\\"b".to_string()),
                Some("c\\d".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("name = 'abc");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token(),
            Err(Error::UnterminatedString {
                span: Span::new(7, 11),
            })
        );
    }

    #[test]
    fn test_params() {
        let tokens: Vec<Token> = Lexer::new("$id $user.id")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenType::Param);
        assert_eq!(tokens[0].lexeme.as_deref(), Some("id"));
        assert_eq!(tokens[1].kind, TokenType::Param);
        assert_eq!(tokens[1].lexeme.as_deref(), Some("user.id"));
        assert_eq!(tokens[1].span, Span::new(4, 12));
    }

    #[test]
    fn test_empty_param_name() {
        assert_eq!(
            Lexer::new("$ id").next_token(),
            Err(Error::InvalidParameter {
                span: Span::new(0, 1),
            })
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("a & b");
        lexer.next_token().unwrap();
        assert_eq!(
            lexer.next_token(),
            Err(Error::UnexpectedCharacter {
                character: '&',
                span: Span::new(2, 3),
            })
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("  ");
        assert!(lexer.next_token().unwrap().is_eof());
        assert!(lexer.next_token().unwrap().is_eof());
        assert_eq!(Lexer::new("").count(), 1);
    }
}
