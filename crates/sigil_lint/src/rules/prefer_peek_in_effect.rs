//! signals/prefer-peek-in-effect
//!
//! A `.value` read inside an effect callback subscribes the effect to that
//! handle and re-runs it on every change. Reads that are not meant as
//! dependencies should use the non-subscribing accessor. Reads inside a
//! dependency-array argument are exempt; enumeration is the point there.
//!
//! Fixable when the rewrite is provably safe. Optional chaining demotes the
//! fix to suggestions, because `a?.value` short-circuits in a way a bare
//! text replacement cannot be shown to preserve.

use sigil_ast::MemberExpr;

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::fixer;
use crate::rule::{AnalysisView, Rule, RuleMeta};
use crate::scope::ScopeKind;

static META: RuleMeta = RuleMeta {
    name: "signals/prefer-peek-in-effect",
    description: "Prefer the non-subscribing accessor for incidental reads in effect callbacks",
    fixable: true,
    default_severity: Severity::Warn,
};

/// Prefer `.peek()` over `.value` in effect callbacks
pub struct PreferPeekInEffect;

/// Pick the module to import `untracked` from: an already imported
/// recognized module if there is one, the first configured module otherwise.
fn untracked_module(ctx: &LintContext, view: &AnalysisView) -> String {
    for stmt in &view.program.body {
        if let sigil_ast::Stmt::Import(import) = stmt {
            if view.tracker.is_recognized_module(&import.source) {
                return import.source.to_string();
            }
        }
    }
    ctx.options.primary_module().to_string()
}

impl Rule for PreferPeekInEffect {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_member(&self, ctx: &mut LintContext, view: &AnalysisView, member: &MemberExpr) {
        if member.computed || member.property != "value" {
            return;
        }
        if view.scopes.current() != ScopeKind::EffectCallback || view.scopes.in_dep_array() {
            return;
        }
        // Writes are legitimate effect work, not subscriptions
        if view.is_write_target(member.span.start, member.span.end) {
            return;
        }
        let Some(handle) = view.tracker.resolve_expr(&member.object) else {
            return;
        };

        let message = format!(
            "reading `{}.value` subscribes this effect to `{0}`",
            handle.name
        );
        let peek_edit = TextEdit::replace(
            member.property_span.start,
            member.property_span.end,
            "peek()",
        );

        let optional = member.optional || member.object.has_optional_chain();
        if optional {
            // Evaluation order under `?.` cannot be preserved by a bare
            // replacement; offer alternatives instead of auto-fixing.
            let module = untracked_module(ctx, view);
            let mut wrap_edits = vec![
                TextEdit::insert(member.span.start, "untracked(() => "),
                TextEdit::insert(member.span.end, ")"),
            ];
            if let Some(import_edit) = fixer::ensure_import(view.program, &module, "untracked") {
                wrap_edits.push(import_edit);
            }
            let diag = ctx
                .diag(message, member.span)
                .with_help("use the non-subscribing accessor, or wrap the read in untracked()")
                .with_suggestion(Fix::new("replace `.value` with `.peek()`", peek_edit))
                .with_suggestion(Fix::with_edits("wrap the read in untracked()", wrap_edits));
            ctx.report(diag);
            return;
        }

        let diag = ctx
            .diag(message, member.span)
            .with_help("use `.peek()` to read without subscribing")
            .with_fix(Fix::new("replace `.value` with `.peek()`", peek_edit));
        ctx.report(diag);
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::LintDiagnostic;
    use crate::fixer::apply_fixes;
    use crate::linter::Linter;

    fn findings(source: &str) -> Vec<LintDiagnostic> {
        let result = Linter::new().lint_source(source, "test.jsx").unwrap();
        result
            .diagnostics
            .into_iter()
            .filter(|d| d.rule_name == "signals/prefer-peek-in-effect")
            .collect()
    }

    #[test]
    fn test_value_read_in_effect_gets_fix() {
        let source = "const countSignal = signal(0);\n\
                      effect(() => { console.log(countSignal.value); });";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].has_fix());

        let (fixed, applied) = apply_fixes(source, &diags);
        assert_eq!(applied, 1);
        assert!(fixed.contains("countSignal.peek()"));
    }

    #[test]
    fn test_optional_chain_gets_suggestions_only() {
        let source = "const countSignal = signal(0);\n\
                      effect(() => { console.log(countSignal?.value); });";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].has_fix());
        assert_eq!(diags[0].suggestions.len(), 2);
    }

    #[test]
    fn test_untracked_suggestion_merges_import() {
        let source = "import { signal } from 'signals';\n\
                      const countSignal = signal(0);\n\
                      effect(() => { console.log(countSignal?.value); });";
        let diags = findings(source);
        let wrap = &diags[0].suggestions[1];
        let fixed = wrap.apply(source);
        assert!(fixed.contains("import { signal, untracked } from 'signals';"));
        assert!(fixed.contains("untracked(() => countSignal?.value)"));
    }

    #[test]
    fn test_dep_array_read_is_exempt() {
        let source = "const countSignal = signal(0);\n\
                      useEffect(() => { run(); }, [countSignal.value]);";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_write_in_effect_is_exempt() {
        let source = "const countSignal = signal(0);\n\
                      effect(() => { countSignal.value = 1; });";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_value_read_outside_effect_is_quiet() {
        let source = "const countSignal = signal(0);\n\
                      const doubled = countSignal.value * 2;";
        assert!(findings(source).is_empty());
    }
}
