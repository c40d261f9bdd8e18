//! The ORQL front end: tokenizer, parser and the selection/filter AST.

pub mod orql;
