//! Fix composition and application.
//!
//! Fixes are atomic edit groups. Application accepts fixes greedily and
//! rejects any group with an edit overlapping an already accepted edit, so
//! the edits applied in one pass are pairwise non-overlapping. Suggestions
//! never pass through here automatically; hosts apply a chosen suggestion
//! via [`Fix::apply`].

use compact_str::CompactString;
use rustc_hash::FxHashSet;
use sigil_ast::{
    ArrowBody, BlockStmt, Expr, ImportSpecifier, Pattern, Program, Span, Stmt, Traversal, Visitor,
    walk_program,
};

use crate::diagnostic::{Fix, LintDiagnostic, TextEdit};

/// Apply all primary fixes from one pass of diagnostics.
///
/// Returns the rewritten source and the number of fixes applied. Fixes are
/// considered in source order; a fix whose edits would overlap an accepted
/// edit is skipped whole (its group stays atomic).
pub fn apply_fixes(source: &str, diagnostics: &[LintDiagnostic]) -> (String, usize) {
    let mut fixes: Vec<&Fix> = diagnostics.iter().filter_map(|d| d.fix.as_ref()).collect();
    fixes.sort_by_key(|f| f.edits.iter().map(|e| e.start).min().unwrap_or(0));

    let mut accepted: Vec<TextEdit> = Vec::new();
    let mut applied = 0usize;
    for fix in fixes {
        let conflicts = fix
            .edits
            .iter()
            .any(|edit| accepted.iter().any(|prior| prior.overlaps(edit)));
        if conflicts {
            continue;
        }
        accepted.extend(fix.edits.iter().cloned());
        applied += 1;
    }

    let combined = Fix::with_edits("combined", accepted);
    (combined.apply(source), applied)
}

/// Compose an edit that makes `name` importable from `module`.
///
/// Merges into an existing import of the same module instead of inserting a
/// duplicate statement; returns `None` when the name is already imported.
pub fn ensure_import(program: &Program, module: &str, name: &str) -> Option<TextEdit> {
    let mut last_import_end: Option<u32> = None;

    for stmt in &program.body {
        let Stmt::Import(import) = stmt else {
            continue;
        };
        last_import_end = Some(import.span.end);
        if import.source.as_str() != module {
            continue;
        }

        let mut last_named_end: Option<u32> = None;
        let mut default_end: Option<u32> = None;
        for spec in &import.specifiers {
            match spec {
                ImportSpecifier::Named {
                    imported, local, ..
                } => {
                    if imported == name || local == name {
                        return None;
                    }
                    last_named_end = Some(spec.span().end);
                }
                ImportSpecifier::Default { .. } => default_end = Some(spec.span().end),
                ImportSpecifier::Namespace { .. } => {}
            }
        }

        if let Some(end) = last_named_end {
            return Some(TextEdit::insert(end, format!(", {name}")));
        }
        if let Some(end) = default_end {
            return Some(TextEdit::insert(end, format!(", {{ {name} }}")));
        }
        // Namespace or side-effect import: a brace list cannot merge into
        // either shape, so add a sibling import after it.
        return Some(TextEdit::insert(
            import.span.end,
            format!("\nimport {{ {name} }} from '{module}';"),
        ));
    }

    match last_import_end {
        Some(end) => Some(TextEdit::insert(
            end,
            format!("\nimport {{ {name} }} from '{module}';"),
        )),
        None => Some(TextEdit::insert(
            0,
            format!("import {{ {name} }} from '{module}';\n"),
        )),
    }
}

/// One reference to a renamed binding, with the syntactic facts a rule
/// needs to decide that site's accessor.
#[derive(Debug, Clone)]
pub struct RefSite {
    /// Span of the identifier itself
    pub span: Span,
    /// Whether the reference sits in a markup subtree of its own function
    pub in_markup: bool,
    /// Span of a directly enclosing `.value` member expression, if any
    pub value_member: Option<Span>,
    /// Whether the reference (or its `.value` access) is a write target
    pub is_write: bool,
}

/// Collect every reference bound to the module-level binding `name`,
/// resolved by scope analysis rather than text matching: references under a
/// function whose parameters or own declarations rebind the name are not
/// included.
pub fn collect_references(program: &Program, name: &str) -> Vec<RefSite> {
    let mut collector = RefCollector {
        name,
        sites: Vec::new(),
        func_depth: 0,
        markup_stack: Vec::new(),
        shadow_stack: Vec::new(),
        skip_ident: None,
        write_spans: FxHashSet::default(),
    };
    walk_program(&mut collector, program);
    collector.sites
}

struct RefCollector<'n> {
    name: &'n str,
    sites: Vec<RefSite>,
    func_depth: u32,
    /// Function depth at each open markup subtree
    markup_stack: Vec<u32>,
    /// Per entered function: whether it rebinds the name
    shadow_stack: Vec<bool>,
    /// Identifier span already recorded through its `.value` member
    skip_ident: Option<(u32, u32)>,
    write_spans: FxHashSet<(u32, u32)>,
}

impl RefCollector<'_> {
    fn shadowed(&self) -> bool {
        self.shadow_stack.iter().any(|&s| s)
    }

    fn in_markup(&self) -> bool {
        self.markup_stack.last() == Some(&self.func_depth)
    }

    fn enter_function(&mut self, params: &[Pattern], body: Option<&BlockStmt>, self_name: Option<&str>) {
        let rebinds = self_name == Some(self.name)
            || params
                .iter()
                .any(|p| p.bound_names().iter().any(|n| *n == self.name))
            || body.is_some_and(|b| block_binds(b, self.name));
        self.func_depth += 1;
        self.shadow_stack.push(rebinds);
    }

    fn exit_function(&mut self) {
        self.shadow_stack.pop();
        self.func_depth -= 1;
    }

    fn note_write(&mut self, target: &Expr) {
        match target.unwrap_parens() {
            Expr::Ident(ident) if ident.name == self.name => {
                self.write_spans.insert((ident.span.start, ident.span.end));
            }
            Expr::Member(member) => {
                if let Expr::Ident(object) = member.object.unwrap_parens() {
                    if object.name == self.name {
                        self.write_spans.insert((member.span.start, member.span.end));
                    }
                }
            }
            _ => {}
        }
    }
}

impl Visitor for RefCollector<'_> {
    fn enter_stmt(&mut self, stmt: &Stmt) -> Traversal {
        if let Stmt::Func(func) = stmt {
            self.enter_function(&func.params, Some(&func.body), Some(&func.name.name));
        }
        Traversal::Continue
    }

    fn exit_stmt(&mut self, stmt: &Stmt) {
        if matches!(stmt, Stmt::Func(_)) {
            self.exit_function();
        }
    }

    fn enter_expr(&mut self, expr: &Expr) -> Traversal {
        match expr {
            Expr::Arrow(arrow) => {
                let body = match &arrow.body {
                    ArrowBody::Block(block) => Some(block),
                    ArrowBody::Expr(_) => None,
                };
                self.enter_function(&arrow.params, body, None);
            }
            Expr::Func(func) => {
                self.enter_function(
                    &func.params,
                    Some(&func.body),
                    func.name.as_ref().map(|n| n.name.as_str()),
                );
            }
            Expr::Assign(assign) => self.note_write(&assign.target),
            Expr::Update(update) => self.note_write(&update.arg),
            Expr::Member(member) if !member.computed && member.property == "value" => {
                if self.shadowed() {
                    return Traversal::Continue;
                }
                if let Expr::Ident(object) = member.object.unwrap_parens() {
                    if object.name == self.name {
                        let key = (member.span.start, member.span.end);
                        self.sites.push(RefSite {
                            span: object.span,
                            in_markup: self.in_markup(),
                            value_member: Some(member.span),
                            is_write: self.write_spans.contains(&key),
                        });
                        self.skip_ident = Some((object.span.start, object.span.end));
                    }
                }
            }
            Expr::Ident(ident) if ident.name == self.name => {
                let key = (ident.span.start, ident.span.end);
                if self.skip_ident.take() == Some(key) {
                    return Traversal::Continue;
                }
                if !self.shadowed() {
                    self.sites.push(RefSite {
                        span: ident.span,
                        in_markup: self.in_markup(),
                        value_member: None,
                        is_write: self.write_spans.contains(&key),
                    });
                }
            }
            _ => {}
        }
        Traversal::Continue
    }

    fn exit_expr(&mut self, expr: &Expr) {
        if matches!(expr, Expr::Arrow(_) | Expr::Func(_)) {
            self.exit_function();
        }
    }

    fn enter_jsx_element(&mut self, _el: &sigil_ast::JsxElement) -> Traversal {
        self.markup_stack.push(self.func_depth);
        Traversal::Continue
    }

    fn exit_jsx_element(&mut self, _el: &sigil_ast::JsxElement) {
        self.markup_stack.pop();
    }

    fn enter_jsx_fragment(&mut self, _frag: &sigil_ast::JsxFragment) -> Traversal {
        self.markup_stack.push(self.func_depth);
        Traversal::Continue
    }

    fn exit_jsx_fragment(&mut self, _frag: &sigil_ast::JsxFragment) {
        self.markup_stack.pop();
    }
}

/// Whether a block (without descending into nested functions) declares
/// `name`.
fn block_binds(block: &BlockStmt, name: &str) -> bool {
    block.body.iter().any(|stmt| stmt_binds(stmt, name))
}

fn stmt_binds(stmt: &Stmt, name: &str) -> bool {
    match stmt {
        Stmt::Var(var) => var.declarators.iter().any(|decl| {
            decl.pattern
                .bound_names()
                .iter()
                .any(|bound| *bound == name)
        }),
        Stmt::Func(func) => func.name.name == name,
        Stmt::Block(block) => block_binds(block, name),
        Stmt::If(if_stmt) => {
            stmt_binds(&if_stmt.consequent, name)
                || if_stmt
                    .alternate
                    .as_deref()
                    .is_some_and(|alt| stmt_binds(alt, name))
        }
        _ => false,
    }
}

/// Rename `name` to `new_name` across its scope-resolved references.
/// Returns the identifier edits only; accessor adjustments are the calling
/// rule's decision per site.
pub fn rename_edits(sites: &[RefSite], new_name: &str) -> Vec<TextEdit> {
    sites
        .iter()
        .map(|site| TextEdit::replace(site.span.start, site.span.end, new_name))
        .collect()
}

/// A short new name for display in messages.
pub fn suffixed_name(name: &str, suffix: &str) -> CompactString {
    let mut out = CompactString::new(name);
    out.push_str(suffix);
    out
}
