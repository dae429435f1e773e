//! Error taxonomy for the analysis core.
//!
//! Three kinds of trouble, handled differently:
//! - recoverable configuration problems (bad regex) are logged at the point
//!   of use and degrade to "pattern matches nothing";
//! - the node budget is a soft limit reported on [`crate::LintResult`], not
//!   an error;
//! - internal faults mean the traversal contract was violated and always
//!   propagate.

use thiserror::Error;

/// Traversal contract violations. These indicate a bug in the engine or a
/// driver that delivered mismatched enter/exit callbacks, and are never
/// swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalFault {
    #[error("scope stack underflow while exiting {node_kind}")]
    ScopeUnderflow { node_kind: &'static str },

    #[error("scope frame mismatch: frame opened at {opened_start}..{opened_end} closed by node at {closed_start}..{closed_end}")]
    FrameMismatch {
        opened_start: u32,
        opened_end: u32,
        closed_start: u32,
        closed_end: u32,
    },

    #[error("markup depth underflow")]
    MarkupUnderflow,

    #[error("dependency array depth underflow")]
    DepArrayUnderflow,
}

/// Top-level error type for a lint run.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("internal fault: {0}")]
    Internal(#[from] InternalFault),
}
