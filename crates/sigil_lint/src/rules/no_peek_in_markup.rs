//! signals/no-peek-in-markup
//!
//! An explicit `.peek()` call inside a markup subtree opts out of the
//! subscription that embedding the handle would create, so the view stops
//! updating. Markup auto-unwraps handles; the bare handle is what is meant
//! almost every time.

use sigil_ast::CallExpr;

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::rule::{AnalysisView, Rule, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "signals/no-peek-in-markup",
    description: "Disallow explicit non-subscribing reads inside markup",
    fixable: true,
    default_severity: Severity::Warn,
};

/// Disallow `.peek()` inside markup subtrees
pub struct NoPeekInMarkup;

impl Rule for NoPeekInMarkup {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_call(&self, ctx: &mut LintContext, view: &AnalysisView, call: &CallExpr) {
        if !view.scopes.in_markup() {
            return;
        }
        let sigil_ast::Expr::Member(member) = call.callee.unwrap_parens() else {
            return;
        };
        if member.computed || member.property != "peek" {
            return;
        }
        let Some(handle) = view.tracker.resolve_expr(&member.object) else {
            return;
        };

        let message = format!(
            "`{}.peek()` inside markup reads once and never updates the view",
            handle.name
        );
        let object_text = ctx.text(member.object.span());
        let replace = TextEdit::replace(call.span.start, call.span.end, object_text);

        let optional = call.optional || member.optional || member.object.has_optional_chain();
        if optional {
            let diag = ctx
                .diag(message, call.span)
                .with_help("embed the handle directly; markup auto-unwraps it")
                .with_suggestion(Fix::new("replace the call with the bare handle", replace));
            ctx.report(diag);
            return;
        }

        let diag = ctx
            .diag(message, call.span)
            .with_help("embed the handle directly; markup auto-unwraps it")
            .with_fix(Fix::new("replace the call with the bare handle", replace));
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
            .filter(|d| d.rule_name == "signals/no-peek-in-markup")
            .collect()
    }

    #[test]
    fn test_peek_in_markup_is_rewritten() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <div>{countSignal.peek()}</div>; }";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);

        let (fixed, applied) = apply_fixes(source, &diags);
        assert_eq!(applied, 1);
        assert!(fixed.contains("<div>{countSignal}</div>"));
    }

    #[test]
    fn test_peek_outside_markup_is_allowed() {
        let source = "const countSignal = signal(0);\n\
                      effect(() => { console.log(countSignal.peek()); });";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_peek_in_event_handler_is_allowed() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <button onClick={() => use(countSignal.peek())}>go</button>; }";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_optional_peek_gets_suggestion_only() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <div>{countSignal?.peek()}</div>; }";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].has_fix());
        assert_eq!(diags[0].suggestions.len(), 1);
    }
}
