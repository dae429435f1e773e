//! signals/no-value-in-markup
//!
//! Markup auto-unwraps an embedded handle; spelling out `.value` is
//! redundant and creates a render-scoped subscription where the markup
//! binding would be more granular. The fix replaces the whole member
//! expression with its object.

use sigil_ast::MemberExpr;

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::rule::{AnalysisView, Rule, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "signals/no-value-in-markup",
    description: "Disallow explicit `.value` reads inside markup",
    fixable: true,
    default_severity: Severity::Warn,
};

/// Disallow `.value` inside markup subtrees
pub struct NoValueInMarkup;

impl Rule for NoValueInMarkup {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_member(&self, ctx: &mut LintContext, view: &AnalysisView, member: &MemberExpr) {
        if member.computed || member.property != "value" {
            return;
        }
        if !view.scopes.in_markup() {
            return;
        }
        // A write through markup is unusual but not this rule's business
        if view.is_write_target(member.span.start, member.span.end) {
            return;
        }
        let Some(handle) = view.tracker.resolve_expr(&member.object) else {
            return;
        };

        let message = format!("`.value` on `{}` is redundant inside markup", handle.name);
        let object_text = ctx.text(member.object.span());
        let replace = TextEdit::replace(member.span.start, member.span.end, object_text);

        if member.optional || member.object.has_optional_chain() {
            let diag = ctx
                .diag(message, member.span)
                .with_help("embed the handle directly; markup auto-unwraps it")
                .with_suggestion(Fix::new("drop the `.value` access", replace));
            ctx.report(diag);
            return;
        }

        let diag = ctx
            .diag(message, member.span)
            .with_help("embed the handle directly; markup auto-unwraps it")
            .with_fix(Fix::new("drop the `.value` access", replace));
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
            .filter(|d| d.rule_name == "signals/no-value-in-markup")
            .collect()
    }

    #[test]
    fn test_value_in_markup_is_rewritten() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <div>{countSignal.value}</div>; }";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);

        let (fixed, applied) = apply_fixes(source, &diags);
        assert_eq!(applied, 1);
        assert!(fixed.contains("<div>{countSignal}</div>"));
    }

    #[test]
    fn test_member_chain_in_markup_is_rewritten_whole() {
        // The replacement covers the whole member expression, not just the
        // trailing accessor
        let source = "const countSignal = signal(0);\n\
                      const box = { countSignal: countSignal };\n\
                      function Foo() { return <div>{box.countSignal.value}</div>; }";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);

        let (fixed, _) = apply_fixes(source, &diags);
        assert!(fixed.contains("<div>{box.countSignal}</div>"));
    }

    #[test]
    fn test_value_in_attribute_container_is_flagged() {
        let source = "const nameSignal = signal('x');\n\
                      function Foo() { return <input title={nameSignal.value} />; }";
        assert_eq!(findings(source).len(), 1);
    }

    #[test]
    fn test_value_in_event_handler_is_allowed() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <button onClick={() => use(countSignal.value)}>go</button>; }";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_value_outside_markup_is_allowed() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { const x = countSignal.value; return <div>{x}</div>; }";
        assert!(findings(source).is_empty());
    }

    #[test]
    fn test_optional_value_gets_suggestion_only() {
        let source = "const countSignal = signal(0);\n\
                      function Foo() { return <div>{countSignal?.value}</div>; }";
        let diags = findings(source);
        assert_eq!(diags.len(), 1);
        assert!(!diags[0].has_fix());
    }
}
