pub mod ast;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod source;
pub mod token;

pub use ast::{
    Assignment, Command, Expression, ForLoop, IfClause, List, Operator, Pipeline, Tick,
    WhileLoop, Word,
};
pub use error::ParseError;
pub use parser::{MAX_DEPTH, Parser, parse};
pub use scanner::{Scanner, tokenize};
pub use source::{CharSource, ReaderSource, StrSource};
pub use token::{Position, Token, TokenKind};
