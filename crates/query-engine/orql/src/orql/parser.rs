//! ORQL parser using recursive descent.
//!
//! Grammar, entry `item`:
//!
//! ```text
//! item      := '*' | '!' name | name ('(' where ')')? (':' '{' items '}')?
//! items     := item (',' item)*
//! where     := exp?
//! exp       := term ('||' exp)?
//! term      := factor ('&&' term)?
//! factor    := '!' factor | '(' exp ')' | compare
//! compare   := name compareOp right
//! compareOp := '=' | '>' | '>=' | '<' | '<=' | '!=' | 'like'
//! right     := name | param | int | float | string | 'true' | 'false' | 'null' | '-' right
//! ```
//!
//! `exp` and `term` recurse on the right, so `a && b && c` is `a && (b && c)`.

use super::ast::*;
use super::error::{Error, Span};
use super::lexer::Lexer;
use super::token::{Token, TokenType};

/// Parses a complete query into its root node.
pub fn parse(query: &str) -> Result<FieldNode, Error> {
    Parser::new(query)?.parse()
}

/// Pulls tokens from the lexer one at a time; `token` is always the lookahead.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    token: Token,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token()?;
        Ok(Self { lexer, token })
    }

    /// Parses the root item and checks that nothing follows it.
    pub fn parse(mut self) -> Result<FieldNode, Error> {
        let root = self.parse_field()?;
        self.expect(TokenType::Eof)?;
        Ok(root)
    }

    fn parse_items(&mut self) -> Result<Vec<QueryNode>, Error> {
        if self.check(TokenType::CloseCurly) {
            return Err(Error::EmptySelection {
                span: self.token.span,
            });
        }

        let mut items = vec![self.parse_item()?];
        while self.consume(TokenType::Comma)? {
            items.push(self.parse_item()?);
        }
        Ok(items)
    }

    fn parse_item(&mut self) -> Result<QueryNode, Error> {
        if self.consume(TokenType::All)? {
            return Ok(QueryNode::All);
        }
        if self.consume(TokenType::Not)? {
            return Ok(QueryNode::Ignore(self.expect_name()?));
        }
        Ok(QueryNode::Field(self.parse_field()?))
    }

    fn parse_field(&mut self) -> Result<FieldNode, Error> {
        let name = self.expect_name()?;

        let mut filter = None;
        if self.consume(TokenType::OpenParen)? {
            filter = self.parse_where()?;
            self.expect(TokenType::CloseParen)?;
        }

        let mut children = vec![];
        if self.consume(TokenType::Colon)? {
            self.expect(TokenType::OpenCurly)?;
            children = self.parse_items()?;
            self.expect(TokenType::CloseCurly)?;
        }

        Ok(FieldNode {
            name,
            children,
            filter,
        })
    }

    /// `()` is an empty filter.
    fn parse_where(&mut self) -> Result<Option<QueryExp>, Error> {
        if self.check(TokenType::CloseParen) {
            return Ok(None);
        }
        self.parse_exp().map(Some)
    }

    fn parse_exp(&mut self) -> Result<QueryExp, Error> {
        let left = self.parse_term()?;
        if self.consume(TokenType::Or)? {
            let right = self.parse_exp()?;
            return Ok(QueryExp::Logic {
                left: Box::new(left),
                op: LogicOp::Or,
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<QueryExp, Error> {
        let left = self.parse_factor()?;
        if self.consume(TokenType::And)? {
            let right = self.parse_term()?;
            return Ok(QueryExp::Logic {
                left: Box::new(left),
                op: LogicOp::And,
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<QueryExp, Error> {
        if self.consume(TokenType::Not)? {
            return Ok(QueryExp::Not(Box::new(self.parse_factor()?)));
        }
        if self.consume(TokenType::OpenParen)? {
            let exp = self.parse_exp()?;
            self.expect(TokenType::CloseParen)?;
            return Ok(QueryExp::Nest(Box::new(exp)));
        }
        self.parse_compare()
    }

    fn parse_compare(&mut self) -> Result<QueryExp, Error> {
        let left = Column {
            name: self.expect_name()?,
        };
        let op = self.parse_compare_op()?;
        let right = self.parse_right()?;
        Ok(QueryExp::Compare { left, op, right })
    }

    fn parse_compare_op(&mut self) -> Result<CompareOp, Error> {
        let op = match self.token.kind {
            TokenType::Eq => CompareOp::Eq,
            TokenType::Gt => CompareOp::Gt,
            TokenType::Ge => CompareOp::Ge,
            TokenType::Lt => CompareOp::Lt,
            TokenType::Le => CompareOp::Le,
            TokenType::Ne => CompareOp::Ne,
            TokenType::Like => CompareOp::Like,
            _ => return Err(self.unexpected("comparison operator")),
        };
        self.advance()?;
        Ok(op)
    }

    fn parse_right(&mut self) -> Result<Operand, Error> {
        let operand = match self.token.kind {
            TokenType::Name => Operand::Column(Column {
                name: self.lexeme(),
            }),
            TokenType::Param => Operand::Param(Param {
                name: self.lexeme(),
            }),
            TokenType::Int => {
                let literal = self.lexeme();
                let value = literal
                    .parse::<i64>()
                    .map_err(|_| Error::InvalidNumber {
                        literal,
                        span: self.token.span,
                    })?;
                Operand::Value(Literal::Int(value))
            }
            TokenType::Float => {
                let literal = self.lexeme();
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidNumber {
                        literal,
                        span: self.token.span,
                    })?;
                Operand::Value(Literal::Float(value))
            }
            TokenType::String => Operand::Value(Literal::String(self.lexeme())),
            TokenType::True => Operand::Value(Literal::Bool(true)),
            TokenType::False => Operand::Value(Literal::Bool(false)),
            TokenType::Null => Operand::Value(Literal::Null),
            TokenType::Hyphen => {
                let start = self.advance()?.span;
                let target_span = self.token.span;
                let operand = self.parse_right()?;
                return negate(operand, start.extend(target_span));
            }
            _ => return Err(self.unexpected("column, parameter or literal")),
        };
        self.advance()?;
        Ok(operand)
    }

    // Token helpers //

    /// Moves to the next token, returning the one just consumed.
    fn advance(&mut self) -> Result<Token, Error> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.token, next))
    }

    fn check(&self, kind: TokenType) -> bool {
        self.token.kind == kind
    }

    fn consume(&mut self, kind: TokenType) -> Result<bool, Error> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenType) -> Result<Token, Error> {
        if self.check(kind) {
            self.advance()
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    fn expect_name(&mut self) -> Result<String, Error> {
        let token = self.expect(TokenType::Name)?;
        Ok(token.lexeme.unwrap_or_default())
    }

    fn lexeme(&self) -> String {
        self.token.lexeme.clone().unwrap_or_default()
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            found: self.token.to_string(),
            span: self.token.span,
        }
    }
}

/// Applies a unary minus. Only numeric literals can be negated.
fn negate(operand: Operand, span: Span) -> Result<Operand, Error> {
    match operand {
        Operand::Value(Literal::Int(value)) => value
            .checked_neg()
            .map(|negated| Operand::Value(Literal::Int(negated)))
            .ok_or_else(|| Error::InvalidNumber {
                literal: format!("-{value}"),
                span,
            }),
        Operand::Value(Literal::Float(value)) => Ok(Operand::Value(Literal::Float(-value))),
        Operand::Value(literal) => Err(Error::InvalidNegation {
            found: literal.to_string(),
            span,
        }),
        Operand::Column(column) => Err(Error::InvalidNegation {
            found: format!("column '{}'", column.name),
            span,
        }),
        Operand::Param(param) => Err(Error::InvalidNegation {
            found: format!("parameter '${}'", param.name),
            span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(query: &str) -> QueryExp {
        parse(query).unwrap().filter.unwrap()
    }

    fn compare_value(literal: &str) -> Literal {
        match filter(&format!("user(id = {literal}): {{*, !password}}")) {
            QueryExp::Compare {
                right: Operand::Value(value),
                ..
            } => value,
            other => panic!("expected a comparison with a value, got {other:?}"),
        }
    }

    fn compare(column: &str, op: CompareOp, right: Operand) -> QueryExp {
        QueryExp::Compare {
            left: Column {
                name: column.to_string(),
            },
            op,
            right,
        }
    }

    fn logic(left: QueryExp, op: LogicOp, right: QueryExp) -> QueryExp {
        QueryExp::Logic {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn int(value: i64) -> Operand {
        Operand::Value(Literal::Int(value))
    }

    #[test]
    fn test_root() {
        let root = parse("entity: {a, b}").unwrap();
        assert_eq!(root.name, "entity");
        assert_eq!(
            root.children,
            vec![
                QueryNode::Field(FieldNode::new("a")),
                QueryNode::Field(FieldNode::new("b")),
            ]
        );
        assert_eq!(root.filter, None);
    }

    #[test]
    fn test_bare_root() {
        assert_eq!(parse("user").unwrap(), FieldNode::new("user"));
        assert_eq!(parse("user()").unwrap(), FieldNode::new("user"));
    }

    #[test]
    fn test_wildcard_and_ignore() {
        let root = parse("user : {*, !password}").unwrap();
        assert_eq!(
            root.children,
            vec![QueryNode::All, QueryNode::Ignore("password".to_string())]
        );
        assert_eq!(root.children[1].name(), "password");
        assert_eq!(root.children[0].name(), "");
    }

    #[test]
    fn test_nested_relation() {
        let root = parse("user : {id, name, role : {id, name}}").unwrap();
        let QueryNode::Field(role) = &root.children[2] else {
            panic!("expected a field node");
        };
        assert_eq!(role.name, "role");
        assert_eq!(role.children.len(), 2);
    }

    #[test]
    fn test_filter_on_nested_node() {
        let root = parse("user: {photos(url like '%.png'): {url}}").unwrap();
        let QueryNode::Field(photos) = &root.children[0] else {
            panic!("expected a field node");
        };
        assert_eq!(
            photos.filter,
            Some(compare(
                "url",
                CompareOp::Like,
                Operand::Value(Literal::String("%.png".to_string()))
            ))
        );
    }

    #[test]
    fn test_eq_param() {
        assert_eq!(
            filter("user(id = $id) : {*, !password}"),
            compare(
                "id",
                CompareOp::Eq,
                Operand::Param(Param {
                    name: "id".to_string()
                })
            )
        );
    }

    #[test]
    fn test_param_with_dots() {
        assert_eq!(
            filter("user(id = $user.id)"),
            compare(
                "id",
                CompareOp::Eq,
                Operand::Param(Param {
                    name: "user.id".to_string()
                })
            )
        );
    }

    #[test]
    fn test_column_on_the_right() {
        assert_eq!(
            filter("user(firstName = lastName)"),
            compare(
                "firstName",
                CompareOp::Eq,
                Operand::Column(Column {
                    name: "lastName".to_string()
                })
            )
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(compare_value("true"), Literal::Bool(true));
        assert_eq!(compare_value("false"), Literal::Bool(false));
        assert_eq!(compare_value("1"), Literal::Int(1));
        assert_eq!(compare_value("null"), Literal::Null);
        assert_eq!(compare_value(r#""str""#), Literal::String("str".to_string()));
        assert_eq!(compare_value("'str'"), Literal::String("str".to_string()));
        assert_eq!(compare_value(r"'st\'r'"), Literal::String("st'r".to_string()));
        assert_eq!(compare_value("1.1"), Literal::Float(1.1));
    }

    #[test]
    fn test_negation() {
        assert_eq!(compare_value("-1"), Literal::Int(-1));
        assert_eq!(compare_value("-1.5"), Literal::Float(-1.5));
        assert_eq!(compare_value("- -2"), Literal::Int(2));
    }

    #[test]
    fn test_negation_of_non_numbers_is_rejected() {
        for literal in ["-true", "-null", "-'a'", "-name", "-$id"] {
            let err = parse(&format!("user(id = {literal})")).unwrap_err();
            assert!(
                matches!(err, Error::InvalidNegation { .. }),
                "{literal}: {err:?}"
            );
        }
    }

    #[test]
    fn test_integer_overflow() {
        let err = parse("user(id = 99999999999999999999)").unwrap_err();
        assert!(matches!(err, Error::InvalidNumber { .. }));
    }

    #[test]
    fn test_compare_operators() {
        for op in enum_iterator::all::<CompareOp>() {
            let exp = filter(&format!("user(id {op} 1)"));
            assert_eq!(exp, compare("id", op, int(1)));
        }
    }

    #[test]
    fn test_and() {
        assert_eq!(
            filter("user(id = 1 && name = 2)"),
            logic(
                compare("id", CompareOp::Eq, int(1)),
                LogicOp::And,
                compare("name", CompareOp::Eq, int(2)),
            )
        );
    }

    #[test]
    fn test_or() {
        let QueryExp::Logic { op, .. } = filter("user(id = 1 || name = 2)") else {
            panic!("expected a logic expression");
        };
        assert_eq!(op, LogicOp::Or);
    }

    #[test]
    fn test_precedence() {
        similar_asserts::assert_eq!(
            filter("user(a = 1 && b = 2 || c = 3 && d = 4)"),
            logic(
                logic(
                    compare("a", CompareOp::Eq, int(1)),
                    LogicOp::And,
                    compare("b", CompareOp::Eq, int(2)),
                ),
                LogicOp::Or,
                logic(
                    compare("c", CompareOp::Eq, int(3)),
                    LogicOp::And,
                    compare("d", CompareOp::Eq, int(4)),
                ),
            )
        );
    }

    #[test]
    fn test_chains_associate_to_the_right() {
        similar_asserts::assert_eq!(
            filter("user(a = 1 && b = 2 && c = 3)"),
            logic(
                compare("a", CompareOp::Eq, int(1)),
                LogicOp::And,
                logic(
                    compare("b", CompareOp::Eq, int(2)),
                    LogicOp::And,
                    compare("c", CompareOp::Eq, int(3)),
                ),
            )
        );
    }

    #[test]
    fn test_nest() {
        assert_eq!(
            filter("user((id = $id)): {*}"),
            QueryExp::Nest(Box::new(compare(
                "id",
                CompareOp::Eq,
                Operand::Param(Param {
                    name: "id".to_string()
                })
            )))
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        assert_eq!(
            filter("user(a = 1 && (b = 2 || c = 3))"),
            logic(
                compare("a", CompareOp::Eq, int(1)),
                LogicOp::And,
                QueryExp::Nest(Box::new(logic(
                    compare("b", CompareOp::Eq, int(2)),
                    LogicOp::Or,
                    compare("c", CompareOp::Eq, int(3)),
                ))),
            )
        );
    }

    #[test]
    fn test_not() {
        assert_eq!(
            filter("user(!(a = 1) && b = 2)"),
            logic(
                QueryExp::Not(Box::new(QueryExp::Nest(Box::new(compare(
                    "a",
                    CompareOp::Eq,
                    int(1)
                ))))),
                LogicOp::And,
                compare("b", CompareOp::Eq, int(2)),
            )
        );
    }

    #[test]
    fn test_unexpected_token() {
        assert_eq!(
            parse("user: {id,}").unwrap_err(),
            Error::UnexpectedToken {
                expected: "name".to_string(),
                found: "'}'".to_string(),
                span: Span::new(10, 11),
            }
        );
    }

    #[test]
    fn test_colon_requires_block() {
        let err = parse("user: id").unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedToken {
                expected: "'{'".to_string(),
                found: "name 'id'".to_string(),
                span: Span::new(6, 8),
            }
        );
    }

    #[test]
    fn test_empty_selection() {
        assert_eq!(
            parse("user: {}").unwrap_err(),
            Error::EmptySelection {
                span: Span::new(7, 8),
            }
        );
    }

    #[test]
    fn test_trailing_input() {
        let err = parse("user: {id} extra").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected end of input, found name 'extra' at offset 11"
        );
    }

    #[test]
    fn test_wildcard_root_is_rejected() {
        assert!(matches!(
            parse("*").unwrap_err(),
            Error::UnexpectedToken { .. }
        ));
    }

    #[test]
    fn test_missing_compare_operator() {
        let err = parse("user(id 1)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected comparison operator, found number '1' at offset 8"
        );
    }

    #[test]
    fn test_lexical_errors_abort_parsing() {
        let err = parse("user(name = 'abc)").unwrap_err();
        assert!(err.is_lexical());
        assert!(matches!(err, Error::UnterminatedString { .. }));
    }
}
