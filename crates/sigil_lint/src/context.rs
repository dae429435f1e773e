//! Lint context for rule execution.

use compact_str::CompactString;
use sigil_ast::Span;

use crate::config::LintOptions;
use crate::diagnostic::{LintDiagnostic, Severity};

/// Context handed to rules during traversal. Collects diagnostics and
/// exposes source text and options.
pub struct LintContext<'a> {
    /// Source code being linted
    pub source: &'a str,
    /// Filename for diagnostics
    pub filename: &'a str,
    /// Run configuration
    pub options: &'a LintOptions,
    /// Collected diagnostics
    diagnostics: Vec<LintDiagnostic>,
    /// Current rule name (set by the engine before calling rule hooks)
    pub(crate) current_rule: &'static str,
    /// Effective severity of the current rule (config override applied)
    pub(crate) current_severity: Severity,
    error_count: usize,
    warning_count: usize,
}

impl<'a> LintContext<'a> {
    const INITIAL_DIAGNOSTICS_CAPACITY: usize = 16;

    pub fn new(source: &'a str, filename: &'a str, options: &'a LintOptions) -> Self {
        Self {
            source,
            filename,
            options,
            diagnostics: Vec::with_capacity(Self::INITIAL_DIAGNOSTICS_CAPACITY),
            current_rule: "",
            current_severity: Severity::Warn,
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Source text covered by a span
    #[inline]
    pub fn text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }

    /// Build a diagnostic for the current rule at its effective severity.
    /// The caller attaches help/fix/suggestions and passes it to [`report`].
    ///
    /// [`report`]: Self::report
    #[inline]
    pub fn diag(&self, message: impl Into<CompactString>, span: Span) -> LintDiagnostic {
        LintDiagnostic::new(
            self.current_rule,
            self.current_severity,
            message,
            span.start,
            span.end,
        )
    }

    /// Record a diagnostic
    pub fn report(&mut self, diagnostic: LintDiagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warn => self.warning_count += 1,
            // Off rules are filtered before dispatch and never report
            Severity::Off => return,
        }
        self.diagnostics.push(diagnostic);
    }

    /// Report a plain diagnostic at a span
    #[inline]
    pub fn report_at(&mut self, message: impl Into<CompactString>, span: Span) {
        let diag = self.diag(message, span);
        self.report(diag);
    }

    /// Report a diagnostic with a help message
    #[inline]
    pub fn report_with_help(
        &mut self,
        message: impl Into<CompactString>,
        span: Span,
        help: impl Into<CompactString>,
    ) {
        let diag = self.diag(message, span).with_help(help);
        self.report(diag);
    }

    #[inline]
    pub fn diagnostics(&self) -> &[LintDiagnostic] {
        &self.diagnostics
    }

    #[inline]
    pub fn into_diagnostics(self) -> Vec<LintDiagnostic> {
        self.diagnostics
    }

    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[inline]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }
}
