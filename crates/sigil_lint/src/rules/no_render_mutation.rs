//! signals/no-render-mutation
//!
//! Disallow writing to a reactive handle while in a component render body.
//! A write during render re-notifies subscribers mid-render and can loop.
//!
//! ## Examples
//!
//! ### Invalid
//! ```jsx
//! function Counter() {
//!   countSignal.value = 1;
//!   return <div>{countSignal}</div>;
//! }
//! ```
//!
//! ### Valid
//! ```jsx
//! function Counter() {
//!   return <button onClick={() => countSignal.value++}>+</button>;
//! }
//! ```

use sigil_ast::{AssignExpr, Expr, UpdateExpr};

use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::provenance::Handle;
use crate::rule::{AnalysisView, Rule, RuleMeta};
use crate::scope::ScopeKind;

static META: RuleMeta = RuleMeta {
    name: "signals/no-render-mutation",
    description: "Disallow writing to a reactive handle during component render",
    fixable: false,
    default_severity: Severity::Error,
};

/// Disallow handle writes at render time
pub struct NoRenderMutation;

fn written_handle(view: &AnalysisView, target: &Expr) -> Option<Handle> {
    match target.unwrap_parens() {
        // `handle.value = ...` and compound/update forms
        Expr::Member(member) if !member.computed && member.property == "value" => {
            view.tracker.resolve_expr(&member.object)
        }
        // Reassigning the binding itself detaches every other subscriber
        ident @ Expr::Ident(_) => view.tracker.resolve_expr(ident),
        _ => None,
    }
}

impl Rule for NoRenderMutation {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_assign(&self, ctx: &mut LintContext, view: &AnalysisView, assign: &AssignExpr) {
        if view.scopes.current() != ScopeKind::ComponentRender {
            return;
        }
        if let Some(handle) = written_handle(view, &assign.target) {
            ctx.report_with_help(
                format!(
                    "reactive handle `{}` is written during component render",
                    handle.name
                ),
                assign.span,
                "move the write into an event handler or an effect callback",
            );
        }
    }

    fn check_update(&self, ctx: &mut LintContext, view: &AnalysisView, update: &UpdateExpr) {
        if view.scopes.current() != ScopeKind::ComponentRender {
            return;
        }
        if let Some(handle) = written_handle(view, &update.arg) {
            ctx.report_with_help(
                format!(
                    "reactive handle `{}` is written during component render",
                    handle.name
                ),
                update.span,
                "move the write into an event handler or an effect callback",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::linter::Linter;

    fn findings(source: &str) -> usize {
        let result = Linter::new().lint_source(source, "test.jsx").unwrap();
        result
            .diagnostics
            .iter()
            .filter(|d| d.rule_name == "signals/no-render-mutation")
            .count()
    }

    #[test]
    fn test_mutation_in_render_is_flagged() {
        // The declaration itself must not be reported
        let count = findings(
            "const countSignal = signal(0);\n\
             function Foo() { countSignal.value = 1; }",
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_update_in_render_is_flagged() {
        let count = findings(
            "const countSignal = signal(0);\n\
             function Foo() { countSignal.value++; }",
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_module_level_write_is_allowed() {
        let count = findings("const countSignal = signal(0);\ncountSignal.value = 1;");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_event_handler_write_is_allowed() {
        let count = findings(
            "const countSignal = signal(0);\n\
             function Foo() { return <button onClick={() => { countSignal.value = 1; }}>go</button>; }",
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn test_effect_write_is_allowed() {
        let count = findings(
            "const countSignal = signal(0);\n\
             const otherSignal = signal(0);\n\
             effect(() => { otherSignal.value = countSignal.peek() + 1; });",
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn test_binding_reassignment_in_render_is_flagged() {
        let count = findings(
            "let countSignal = signal(0);\n\
             function Foo() { countSignal = signal(1); }",
        );
        assert_eq!(count, 1);
    }
}
