//! signals/handle-naming
//!
//! Require the configured suffix on bindings initialized from a creator
//! call. The suffix is what lets readers (and the suffix heuristic) tell a
//! handle from a plain value at the use site.
//!
//! The fix renames the declaration and every scope-resolved reference.
//! When a reference sits inside markup behind a `.value` access, renaming
//! alone would leave a redundant accessor, so the rule demotes to
//! suggestions: rename only, or rename plus dropping the markup accessors.

use sigil_ast::{Declarator, Pattern};

use crate::context::LintContext;
use crate::diagnostic::{Fix, Severity, TextEdit};
use crate::fixer;
use crate::rule::{AnalysisView, Rule, RuleMeta};

static META: RuleMeta = RuleMeta {
    name: "signals/handle-naming",
    description: "Require the handle suffix on bindings created from a creator call",
    fixable: true,
    default_severity: Severity::Warn,
};

/// Require the suffix on creator-initialized bindings
pub struct HandleNaming;

impl Rule for HandleNaming {
    fn meta(&self) -> &'static RuleMeta {
        &META
    }

    fn check_declarator(&self, ctx: &mut LintContext, view: &AnalysisView, decl: &Declarator) {
        if ctx.options.allow_bare_names {
            return;
        }
        let Pattern::Ident(ident) = &decl.pattern else {
            return;
        };
        let Some(init) = &decl.init else {
            return;
        };
        let sigil_ast::Expr::Call(call) = init.unwrap_parens() else {
            return;
        };
        if view.tracker.creator_base(&call.callee).is_none() {
            return;
        }
        // Effect-like creators return a disposer, not a handle
        if view.tracker.effect_base(&call.callee).is_some() {
            return;
        }
        let suffix = ctx.options.suffix.as_str();
        if ident.name.ends_with(suffix) {
            return;
        }

        let new_name = fixer::suffixed_name(&ident.name, suffix);
        let message = format!(
            "reactive handle `{}` should be named `{new_name}`",
            ident.name
        );
        let sites = fixer::collect_references(view.program, &ident.name);

        let mut rename = vec![TextEdit::replace(
            ident.span.start,
            ident.span.end,
            new_name.as_str(),
        )];
        rename.extend(fixer::rename_edits(&sites, &new_name));

        let needs_accessor_pass = sites
            .iter()
            .any(|site| site.in_markup && site.value_member.is_some());
        if needs_accessor_pass {
            // Renaming under markup `.value` reads is safe but leaves the
            // redundant accessor behind; let the host pick.
            let mut normalize = vec![TextEdit::replace(
                ident.span.start,
                ident.span.end,
                new_name.as_str(),
            )];
            for site in &sites {
                match site.value_member {
                    Some(member) if site.in_markup && !site.is_write => {
                        normalize.push(TextEdit::replace(
                            member.start,
                            member.end,
                            new_name.as_str(),
                        ));
                    }
                    _ => {
                        normalize.push(TextEdit::replace(
                            site.span.start,
                            site.span.end,
                            new_name.as_str(),
                        ));
                    }
                }
            }
            let diag = ctx
                .diag(message, ident.span)
                .with_help(format!("rename to `{new_name}`"))
                .with_suggestion(Fix::with_edits("rename the binding", rename))
                .with_suggestion(Fix::with_edits(
                    "rename the binding and drop markup `.value` accessors",
                    normalize,
                ));
            ctx.report(diag);
            return;
        }

        let diag = ctx
            .diag(message, ident.span)
            .with_help(format!("rename to `{new_name}`"))
            .with_fix(Fix::with_edits("rename the binding", rename));
        ctx.report(diag);
    }
}
