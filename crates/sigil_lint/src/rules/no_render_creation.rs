//! signals/no-render-creation
//!
//! Disallow calling a handle creator inside a component render body. A
//! fresh handle per render defeats subscription tracking; creation belongs
//! in module scope, a custom hook, or an effect.
//!
//! ## Examples
//!
//! ### Invalid
//! ```jsx
//! function Counter() {
//!   const countSignal = signal(0);
//!   return <div>{countSignal}</div>;
//! }
//! ```
//!
//! ### Valid
//! ```jsx
//! function useCounter() {
//!   return signal(0);
//! }
//! ```

use sigil_ast::CallExpr;

use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rule::{AnalysisView, Rule, RuleMeta};
use crate::scope::ScopeKind;

static META: RuleMeta = RuleMeta {
    name: "signals/no-render-creation",
    description: "Disallow creating a reactive handle during component render",
    fixable: false,
    default_severity: Severity::Error,
};

/// Disallow creator calls at render time
pub struct NoRenderCreation;

impl Rule for NoRenderCreation {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_call(&self, ctx: &mut LintContext, view: &AnalysisView, call: &CallExpr) {
        if view.scopes.current() != ScopeKind::ComponentRender {
            return;
        }
        let Some((base, _)) = view.tracker.creator_base(&call.callee) else {
            return;
        };
        ctx.report_with_help(
            format!("`{base}()` creates a new reactive handle on every render"),
            call.span,
            "create the handle in module scope or a custom hook instead",
        );
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
            .filter(|d| d.rule_name == "signals/no-render-creation")
            .count()
    }

    #[test]
    fn test_creation_in_component_is_flagged() {
        let count = findings("function Foo() { const countSignal = signal(0); }");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_creation_in_hook_is_allowed() {
        let count = findings("function useThing() { return signal(0); }");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_creation_at_module_scope_is_allowed() {
        let count = findings("const countSignal = signal(0);");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_aliased_creator_in_component_is_flagged() {
        let count = findings(
            "import { signal as s } from 'signals';\n\
             function Foo() { const xSignal = s(0); }",
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_namespace_creator_in_component_is_flagged() {
        let count = findings(
            "import * as signals from '@preact/signals';\n\
             function Foo() { const xSignal = signals.computed(f); }",
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_arrow_component_creation_is_flagged() {
        let count = findings("const Foo = () => { const xSignal = signal(0); return null; };");
        assert_eq!(count, 1);
    }
}
