//! # sigil_lint
//!
//! Static analysis for reactive-handle misuse in component UI source.
//!
//! The analyzer tracks where handle bindings come from (provenance),
//! classifies the lexical context of every use site (component render, hook
//! body, effect callback, markup subtree), and runs a set of independent
//! rules over the combination. Findings carry byte spans and, where a
//! rewrite is provably safe, an atomic auto-fix; rewrites that cannot be
//! proven safe are demoted to suggestions.
//!
//! ## Example
//!
//! ```
//! use sigil_lint::lint;
//!
//! let source = "const countSignal = signal(0);\n\
//!               function Counter() { countSignal.value = 1; }";
//! let result = lint(source, "counter.jsx").unwrap();
//! assert_eq!(result.error_count, 1);
//! ```

pub mod config;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod fixer;
pub mod linter;
pub mod output;
pub mod provenance;
pub mod rule;
pub mod rules;
pub mod scope;

pub use config::LintOptions;
pub use context::LintContext;
pub use diagnostic::{Fix, LintDiagnostic, LintSummary, Severity, TextEdit};
pub use error::{InternalFault, LintError};
pub use fixer::apply_fixes;
pub use linter::{LintResult, Linter};
pub use output::{OutputFormat, render};
pub use provenance::{Confidence, Handle, HandleOrigin, HandleTracker};
pub use rule::{AnalysisView, Rule, RuleMeta, RuleRegistry};
pub use scope::{ContextStack, FrameKind, ScopeKind};

/// Lint one file with the recommended rules and default options.
pub fn lint(source: &str, filename: &str) -> Result<LintResult, LintError> {
    Linter::new().lint_source(source, filename)
}
