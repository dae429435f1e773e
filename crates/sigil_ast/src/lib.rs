//! # sigil_ast
//!
//! Syntax tree for the sigil reactive-handle analyzer.
//!
//! Defines the typed node structs for the JS/JSX subset the analyzer
//! understands, a closed [`NodeKind`] discriminant, and a traversal driver
//! ([`visit`]) whose children accessors are written by hand per node kind.
//! There is no reflective walking: adding a field to a node without visiting
//! it shows up in review as a missing match arm, not as a silent hole in a
//! denylist.
//!
//! Trees are built by `sigil_parser` (or by hand in tests) and are owned,
//! immutable, and dropped whole at the end of one analysis run.

pub mod ast;
pub mod span;
pub mod visit;

pub use ast::*;
pub use span::Span;
pub use visit::{walk_program, Traversal, Visitor};
