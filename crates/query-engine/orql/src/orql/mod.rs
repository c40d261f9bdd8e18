//! Tokenize and parse ORQL text into a selection tree.
//!
//! A query such as `user(id = $id): {id, profile: {gender}}` describes one root
//! entity, the fields to select from it, the relations to follow and an optional
//! filter per node.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{Error, Span};
pub use parser::parse;
