//! signals/no-handle-alias
//!
//! Rebinding a handle under a second name splits its identity: reads and
//! writes through the alias still hit the same handle, but provenance and
//! naming checks now see two unrelated bindings. Not auto-fixable; which
//! name should survive is an authorial decision.

use sigil_ast::{Declarator, Expr, Pattern};

use crate::context::LintContext;
use crate::diagnostic::Severity;
use crate::rule::{AnalysisView, Rule, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "signals/no-handle-alias",
    description: "Disallow rebinding an existing reactive handle under a new name",
    fixable: false,
    default_severity: Severity::Warn,
};

/// Disallow aliasing an existing handle
pub struct NoHandleAlias;

impl Rule for NoHandleAlias {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_declarator(&self, ctx: &mut LintContext, view: &AnalysisView, decl: &Declarator) {
        let Some(init) = &decl.init else {
            return;
        };
        match &decl.pattern {
            Pattern::Ident(ident) => {
                // Creator calls declare, they do not alias
                if matches!(init.unwrap_parens(), Expr::Call(_)) {
                    return;
                }
                let Some(source) = view.tracker.resolve_expr(init) else {
                    return;
                };
                if source.name == ident.name {
                    return;
                }
                ctx.report_with_help(
                    format!("`{}` aliases reactive handle `{}`", ident.name, source.name),
                    decl.span,
                    "use the original handle binding directly",
                );
            }
            Pattern::Object(pattern) => {
                let Expr::Ident(source) = init.unwrap_parens() else {
                    return;
                };
                for prop in &pattern.props {
                    if view.tracker.container_prop(&source.name, &prop.key) {
                        ctx.report_with_help(
                            format!(
                                "destructuring `{}` out of `{}` aliases a reactive handle",
                                prop.key, source.name
                            ),
                            prop.span,
                            "access the handle through the container instead",
                        );
                    }
                }
            }
            Pattern::Array(_) => {
                if view.tracker.resolve_expr(init).is_some() {
                    ctx.report_with_help(
                        "destructuring a reactive handle aliases its elements",
                        decl.span,
                        "access the handle through the original binding instead",
                    );
                }
            }
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
            .filter(|d| d.rule_name == "signals/no-handle-alias")
            .count()
    }

    #[test]
    fn test_alias_is_flagged() {
        let count = findings("const countSignal = signal(0);\nconst other = countSignal;");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_creator_call_is_not_an_alias() {
        assert_eq!(findings("const countSignal = signal(0);"), 0);
    }

    #[test]
    fn test_plain_value_copy_is_quiet() {
        assert_eq!(findings("const a = 1;\nconst b = a;"), 0);
    }

    #[test]
    fn test_container_member_alias_is_flagged() {
        let count = findings(
            "const countSignal = signal(0);\n\
             const box = { count: countSignal };\n\
             const c = box.count;",
        );
        assert_eq!(count, 1);
    }

    #[test]
    fn test_destructure_from_container_is_flagged() {
        let count = findings(
            "const countSignal = signal(0);\n\
             const box = { count: countSignal };\n\
             const { count } = box;",
        );
        assert_eq!(count, 1);
    }
}
