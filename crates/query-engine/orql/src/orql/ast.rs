//! Type definitions of the ORQL AST: the selection tree and its filter expressions.

use std::fmt;

use enum_iterator::Sequence;

/// An element of a selection list.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// `*`: every column of the entity that is not otherwise selected or excluded.
    All,
    /// `!name`: exclude a column from the wildcard expansion.
    Ignore(String),
    /// A column or a relation, optionally filtered and with a nested selection.
    Field(FieldNode),
}

impl QueryNode {
    /// The field name this node refers to. Empty for the wildcard.
    pub fn name(&self) -> &str {
        match self {
            QueryNode::All => "",
            QueryNode::Ignore(name) => name,
            QueryNode::Field(field) => &field.name,
        }
    }
}

/// A named selection node. The root of every query is one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub name: String,
    /// Nested selection, in the order written. Empty when no block was given.
    pub children: Vec<QueryNode>,
    /// Filter applied to this node's entity only.
    pub filter: Option<QueryExp>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: vec![],
            filter: None,
        }
    }
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExp {
    /// A parenthesized sub-expression.
    Nest(Box<QueryExp>),
    /// `exp && exp`, `exp || exp`
    Logic {
        left: Box<QueryExp>,
        op: LogicOp,
        right: Box<QueryExp>,
    },
    /// `!exp`
    Not(Box<QueryExp>),
    /// `column op column|param|value`
    Compare {
        left: Column,
        op: CompareOp,
        right: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence)]
pub enum CompareOp {
    Ge,
    Gt,
    Le,
    Lt,
    Eq,
    Ne,
    Like,
}

impl CompareOp {
    /// The operator as written in ORQL.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Like => "like",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the entity the filter belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
}

/// A named parameter. Dots are part of the name, not a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Column),
    Param(Param),
    Value(Literal),
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::String(s) => write!(f, "'{s}'"),
        }
    }
}
