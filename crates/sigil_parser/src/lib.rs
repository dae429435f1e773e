//! # sigil_parser
//!
//! Reference parser for the JS/JSX subset the sigil analyzer understands.
//!
//! The analysis core (`sigil_lint`) depends only on `sigil_ast` trees; this
//! crate exists so hosts and tests can feed it source text directly. The
//! grammar covers imports, `const`/`let`/`var` declarations with
//! destructuring, function declarations and expressions, arrow functions,
//! call/member chains with optional chaining, assignment/update/binary
//! expressions, object/array literals, and JSX elements, fragments,
//! attributes, and expression containers.
//!
//! Parsing is error-tolerant: problems are collected as [`ParseError`]s and
//! the parser produces as much tree as it can, the same recovery posture the
//! template parser in this family of tools takes.

mod lexer;
mod parser;

pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse, ParseError, Parser};
