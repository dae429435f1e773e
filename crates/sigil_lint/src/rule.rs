//! Rule trait and registry.

use rustc_hash::FxHashSet;
use sigil_ast::{AssignExpr, CallExpr, Declarator, MemberExpr, Program, UpdateExpr};

use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::provenance::HandleTracker;
use crate::scope::ContextStack;

/// Rule metadata
pub struct RuleMeta {
    /// Rule name (e.g., "signals/no-render-mutation")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Whether the rule can emit a primary auto-fix
    pub fixable: bool,
    /// Default severity, overridable per rule in [`crate::LintOptions`]
    pub default_severity: Severity,
}

/// Read-only analysis state exposed to rules.
///
/// Rules consult provenance and context but never mutate them; mutation is
/// the engine's job.
pub struct AnalysisView<'r> {
    pub tracker: &'r HandleTracker,
    pub scopes: &'r ContextStack,
    /// Spans of expressions that are the target of a write (assignment or
    /// update) in the current traversal path
    pub write_targets: &'r FxHashSet<(u32, u32)>,
    pub program: &'r Program,
}

impl AnalysisView<'_> {
    /// Whether this expression span is currently a write target.
    #[inline]
    pub fn is_write_target(&self, start: u32, end: u32) -> bool {
        self.write_targets.contains(&(start, end))
    }
}

/// Rule trait for implementing lint rules.
///
/// Rules implement per-node hooks called by the engine during traversal.
/// Each hook receives the lint context for reporting and a read-only view
/// of tracker and stack state. Hooks for disabled rules are never called.
pub trait Rule: Send + Sync {
    /// Get rule metadata
    fn meta(&self) -> &'static RuleMeta;

    /// Called for each variable declarator
    #[allow(unused_variables)]
    fn check_declarator(&self, ctx: &mut LintContext, view: &AnalysisView, decl: &Declarator) {}

    /// Called for each call expression
    #[allow(unused_variables)]
    fn check_call(&self, ctx: &mut LintContext, view: &AnalysisView, call: &CallExpr) {}

    /// Called for each member expression
    #[allow(unused_variables)]
    fn check_member(&self, ctx: &mut LintContext, view: &AnalysisView, member: &MemberExpr) {}

    /// Called for each assignment expression
    #[allow(unused_variables)]
    fn check_assign(&self, ctx: &mut LintContext, view: &AnalysisView, assign: &AssignExpr) {}

    /// Called for each update expression
    #[allow(unused_variables)]
    fn check_update(&self, ctx: &mut LintContext, view: &AnalysisView, update: &UpdateExpr) {}
}

/// Registry holding all enabled lint rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Create registry with all built-in rules enabled.
    ///
    /// Severity defaults: correctness rules report errors, convention and
    /// accessor-hygiene rules report warnings.
    pub fn with_recommended() -> Self {
        let mut registry = Self::new();

        // Correctness (Error)
        registry.register(Box::new(crate::rules::NoRenderMutation));
        registry.register(Box::new(crate::rules::NoRenderCreation));

        // Accessor hygiene (Warn)
        registry.register(Box::new(crate::rules::PreferPeekInEffect));
        registry.register(Box::new(crate::rules::NoPeekInMarkup));
        registry.register(Box::new(crate::rules::NoValueInMarkup));

        // Conventions (Warn)
        registry.register(Box::new(crate::rules::HandleNaming));
        registry.register(Box::new(crate::rules::NoHandleAlias));

        registry
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_recommended()
    }
}
