//! Prism Script - parser for the extended shader scripting dialect
//!
//! Where `prism-shader` only skims function bodies, this crate parses them:
//! arithmetic with chained operands, relational and logical chains, control
//! flow, and `parallel` block groups, all stored in an index-based [`Ast`].
//!
//! ## Example
//!
//! ```rust
//! use prism_script::ScriptParser;
//!
//! let parser = ScriptParser::new();
//! let unit = parser.parse("fn main() { var y = 1 + 2; }").unwrap();
//! let (_, body) = unit.function("main").unwrap();
//! assert_eq!(unit.ast.render_statement(body), "(block (var y: _ (+ 1 2)))");
//!
//! let expr = parser.parse_expression("a + b - c").unwrap();
//! assert_eq!(expr.render(), "(+ a b -c)");
//! ```

pub mod arena;
pub mod ast;
pub mod config;
pub mod engine;
pub mod parser;

mod error;
mod render;

pub use arena::{Arena, Handle};
pub use ast::{
    Ast, DeclKind, Declaration, Rational, SourceUnit, Statement, StmtId, Term, TermId, TermKind,
};
pub use config::ParserConfig;
pub use engine::{ExpressionTree, ScriptParser, StatementList};
pub use error::ScriptError;
pub use parser::{parse_expression, parse_source, parse_source_with, parse_statements};
