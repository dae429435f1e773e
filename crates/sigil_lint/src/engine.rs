//! Analysis engine.
//!
//! Runs three passes over one file's tree. An import pass seeds the
//! provenance tracker, a creator-evidence scan makes the suffix heuristic
//! independent of declaration order, and the main pass walks the tree with
//! the context stack synchronized to function, markup, and dependency-array
//! boundaries, dispatching rule hooks at each node of interest.
//!
//! The node budget is a soft stop: when exhausted the walk is abandoned and
//! everything reported so far is kept. Stack faults are hard stops and
//! surface as [`LintError::Internal`].

use compact_str::CompactString;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use sigil_ast::{
    AssignExpr, CallExpr, Declarator, Expr, ImportSpecifier, JsxAttr, JsxElement, JsxFragment,
    JsxText, MemberExpr, NodeKind, Pattern, Program, Span, Stmt, Traversal, UpdateExpr, Visitor,
    walk_program,
};

use crate::config::LintOptions;
use crate::context::LintContext;
use crate::diagnostic::{LintDiagnostic, Severity};
use crate::error::{InternalFault, LintError};
use crate::provenance::HandleTracker;
use crate::rule::{AnalysisView, Rule, RuleRegistry};
use crate::scope::{ContextStack, FrameKind};

/// Result of one engine run.
pub struct EngineOutput {
    pub diagnostics: Vec<LintDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    /// Whether the walk was abandoned because the node budget ran out
    pub budget_exhausted: bool,
    /// Per-kind visit counts for the nodes seen before any stop
    pub node_counts: [u32; NodeKind::COUNT],
}

/// Single-file analysis driver.
pub struct Engine<'a> {
    program: &'a Program,
    ctx: LintContext<'a>,
    tracker: HandleTracker,
    scopes: ContextStack,
    write_targets: FxHashSet<(u32, u32)>,
    /// Rules whose effective severity is not `off`, paired with it
    active: Vec<(&'a dyn Rule, Severity)>,
    hook_pattern: Option<Regex>,
    /// Span of an anonymous function expression -> name it is bound to
    fn_names: FxHashMap<(u32, u32), CompactString>,
    /// Spans of function arguments to effect-like calls
    effect_bodies: FxHashSet<(u32, u32)>,
    /// Spans of dependency-array arguments to effect-like calls
    dep_arrays: FxHashSet<(u32, u32)>,
    node_counts: [u32; NodeKind::COUNT],
    nodes_seen: u32,
    max_nodes: u32,
    budget_exhausted: bool,
    fault: Option<InternalFault>,
}

impl<'a> Engine<'a> {
    pub fn new(
        program: &'a Program,
        source: &'a str,
        filename: &'a str,
        options: &'a LintOptions,
        registry: &'a RuleRegistry,
    ) -> Self {
        let active = registry
            .rules()
            .iter()
            .filter_map(|rule| {
                let meta = rule.meta();
                let severity = options.severity_for(meta.name, meta.default_severity);
                (severity != Severity::Off).then(|| (rule.as_ref(), severity))
            })
            .collect();

        Self {
            program,
            ctx: LintContext::new(source, filename, options),
            tracker: HandleTracker::new(options),
            scopes: ContextStack::new(),
            write_targets: FxHashSet::default(),
            active,
            hook_pattern: options.compile_hook_pattern(),
            fn_names: FxHashMap::default(),
            effect_bodies: FxHashSet::default(),
            dep_arrays: FxHashSet::default(),
            node_counts: [0; NodeKind::COUNT],
            nodes_seen: 0,
            max_nodes: options.max_nodes,
            budget_exhausted: false,
            fault: None,
        }
    }

    pub fn run(mut self) -> Result<EngineOutput, LintError> {
        self.scan_imports();
        self.scan_creator_evidence();

        self.node_counts[NodeKind::Program as usize] = 1;
        self.nodes_seen = 1;
        let program = self.program;
        walk_program(&mut self, program);

        if let Some(fault) = self.fault {
            return Err(LintError::Internal(fault));
        }

        tracing::debug!(
            nodes = self.nodes_seen,
            diagnostics = self.ctx.diagnostics().len(),
            budget_exhausted = self.budget_exhausted,
            "analysis pass finished"
        );

        let error_count = self.ctx.error_count();
        let warning_count = self.ctx.warning_count();
        Ok(EngineOutput {
            error_count,
            warning_count,
            budget_exhausted: self.budget_exhausted,
            node_counts: self.node_counts,
            diagnostics: self.ctx.into_diagnostics(),
        })
    }

    fn scan_imports(&mut self) {
        let program = self.program;
        for stmt in &program.body {
            let Stmt::Import(import) = stmt else {
                continue;
            };
            if !self.tracker.is_recognized_module(&import.source) {
                continue;
            }
            for spec in &import.specifiers {
                match spec {
                    ImportSpecifier::Named {
                        imported, local, ..
                    } => self.tracker.record_creator_import(local, imported),
                    ImportSpecifier::Namespace { local, .. } => {
                        self.tracker.record_namespace_import(local);
                    }
                    ImportSpecifier::Default { .. } => {}
                }
            }
        }
    }

    /// Look for any creator call before the main pass, so a suffix-named
    /// binding declared above the file's first creator call still resolves.
    fn scan_creator_evidence(&mut self) {
        if self.tracker.has_creator_evidence() {
            return;
        }
        let program = self.program;
        let mut scan = EvidenceScan {
            tracker: &self.tracker,
            found: false,
        };
        walk_program(&mut scan, program);
        if scan.found {
            self.tracker.mark_creator_evidence();
        }
    }

    /// Count a node against the budget.
    fn note(&mut self, kind: NodeKind) -> Traversal {
        if self.fault.is_some() {
            return Traversal::Stop;
        }
        self.node_counts[kind as usize] += 1;
        self.nodes_seen += 1;
        if self.nodes_seen > self.max_nodes {
            if !self.budget_exhausted {
                self.budget_exhausted = true;
                tracing::debug!(
                    max_nodes = self.max_nodes,
                    "node budget exhausted; abandoning traversal"
                );
            }
            return Traversal::Stop;
        }
        Traversal::Continue
    }

    fn keep<T>(&mut self, result: Result<T, InternalFault>) {
        if let Err(fault) = result {
            if self.fault.is_none() {
                self.fault = Some(fault);
            }
        }
    }

    fn classify_function(&self, span: Span, name: Option<&str>) -> FrameKind {
        if self.effect_bodies.contains(&(span.start, span.end)) {
            return FrameKind::EffectCallback;
        }
        let key = (span.start, span.end);
        let bound = self.fn_names.get(&key).map(CompactString::as_str);
        match name.or(bound) {
            Some(n) if self.hook_pattern.as_ref().is_some_and(|re| re.is_match(n)) => {
                FrameKind::HookBody
            }
            Some(n) if n.starts_with(|c: char| c.is_ascii_uppercase()) => {
                FrameKind::ComponentRender
            }
            _ => FrameKind::Plain,
        }
    }

    /// Register the callback body and dependency array of an effect-like
    /// call before its arguments are walked.
    fn note_effect_call(&mut self, call: &CallExpr) {
        if self.tracker.effect_base(&call.callee).is_none() {
            return;
        }
        if let Some(arg) = call.args.first() {
            let func = arg.unwrap_parens();
            if matches!(func, Expr::Arrow(_) | Expr::Func(_)) {
                let span = func.span();
                self.effect_bodies.insert((span.start, span.end));
            }
        }
        if let Some(arg) = call.args.get(1) {
            if let Expr::Array(array) = arg.unwrap_parens() {
                self.dep_arrays.insert((array.span.start, array.span.end));
            }
        }
    }

    fn dispatch_declarator(&mut self, decl: &Declarator) {
        let view = AnalysisView {
            tracker: &self.tracker,
            scopes: &self.scopes,
            write_targets: &self.write_targets,
            program: self.program,
        };
        for (rule, severity) in &self.active {
            self.ctx.current_rule = rule.meta().name;
            self.ctx.current_severity = *severity;
            rule.check_declarator(&mut self.ctx, &view, decl);
        }
    }

    fn dispatch_call(&mut self, call: &CallExpr) {
        let view = AnalysisView {
            tracker: &self.tracker,
            scopes: &self.scopes,
            write_targets: &self.write_targets,
            program: self.program,
        };
        for (rule, severity) in &self.active {
            self.ctx.current_rule = rule.meta().name;
            self.ctx.current_severity = *severity;
            rule.check_call(&mut self.ctx, &view, call);
        }
    }

    fn dispatch_member(&mut self, member: &MemberExpr) {
        let view = AnalysisView {
            tracker: &self.tracker,
            scopes: &self.scopes,
            write_targets: &self.write_targets,
            program: self.program,
        };
        for (rule, severity) in &self.active {
            self.ctx.current_rule = rule.meta().name;
            self.ctx.current_severity = *severity;
            rule.check_member(&mut self.ctx, &view, member);
        }
    }

    fn dispatch_assign(&mut self, assign: &AssignExpr) {
        let view = AnalysisView {
            tracker: &self.tracker,
            scopes: &self.scopes,
            write_targets: &self.write_targets,
            program: self.program,
        };
        for (rule, severity) in &self.active {
            self.ctx.current_rule = rule.meta().name;
            self.ctx.current_severity = *severity;
            rule.check_assign(&mut self.ctx, &view, assign);
        }
    }

    fn dispatch_update(&mut self, update: &UpdateExpr) {
        let view = AnalysisView {
            tracker: &self.tracker,
            scopes: &self.scopes,
            write_targets: &self.write_targets,
            program: self.program,
        };
        for (rule, severity) in &self.active {
            self.ctx.current_rule = rule.meta().name;
            self.ctx.current_severity = *severity;
            rule.check_update(&mut self.ctx, &view, update);
        }
    }
}

impl Visitor for Engine<'_> {
    fn enter_stmt(&mut self, stmt: &Stmt) -> Traversal {
        if let Traversal::Stop = self.note(stmt.kind()) {
            return Traversal::Stop;
        }
        if let Stmt::Func(func) = stmt {
            let kind = self.classify_function(func.span, Some(func.name.name.as_str()));
            self.scopes.push(kind, func.span);
        }
        Traversal::Continue
    }

    fn exit_stmt(&mut self, stmt: &Stmt) {
        if let Stmt::Func(func) = stmt {
            let popped = self.scopes.pop(func.span, "function declaration");
            self.keep(popped);
        }
    }

    fn enter_declarator(&mut self, decl: &Declarator) -> Traversal {
        if let Traversal::Stop = self.note(NodeKind::Declarator) {
            return Traversal::Stop;
        }
        // Name anonymous functions after the binding they initialize, so
        // `const Foo = () => ...` classifies like `function Foo()`.
        if let (Pattern::Ident(ident), Some(init)) = (&decl.pattern, &decl.init) {
            match init.unwrap_parens() {
                Expr::Arrow(arrow) => {
                    self.fn_names
                        .insert((arrow.span.start, arrow.span.end), ident.name.clone());
                }
                Expr::Func(func) if func.name.is_none() => {
                    self.fn_names
                        .insert((func.span.start, func.span.end), ident.name.clone());
                }
                _ => {}
            }
        }
        self.tracker.record_declarator(decl);
        self.dispatch_declarator(decl);
        Traversal::Continue
    }

    fn enter_expr(&mut self, expr: &Expr) -> Traversal {
        if let Traversal::Stop = self.note(expr.kind()) {
            return Traversal::Stop;
        }
        match expr {
            Expr::Arrow(arrow) => {
                let kind = self.classify_function(arrow.span, None);
                self.scopes.push(kind, arrow.span);
            }
            Expr::Func(func) => {
                let kind =
                    self.classify_function(func.span, func.name.as_ref().map(|n| n.name.as_str()));
                self.scopes.push(kind, func.span);
            }
            Expr::Call(call) => {
                self.note_effect_call(call);
                self.dispatch_call(call);
            }
            Expr::Member(member) => self.dispatch_member(member),
            Expr::Assign(assign) => {
                let target = assign.target.unwrap_parens();
                // An assignment binds a name to anonymous functions the same
                // way a declarator does: `Foo = () => ...` classifies like
                // `function Foo()`.
                if let Expr::Ident(ident) = target {
                    match assign.value.unwrap_parens() {
                        Expr::Arrow(arrow) => {
                            self.fn_names
                                .insert((arrow.span.start, arrow.span.end), ident.name.clone());
                        }
                        Expr::Func(func) if func.name.is_none() => {
                            self.fn_names
                                .insert((func.span.start, func.span.end), ident.name.clone());
                        }
                        _ => {}
                    }
                }
                let span = target.span();
                self.write_targets.insert((span.start, span.end));
                self.dispatch_assign(assign);
            }
            Expr::Update(update) => {
                let target = update.arg.unwrap_parens().span();
                self.write_targets.insert((target.start, target.end));
                self.dispatch_update(update);
            }
            Expr::Array(array) => {
                if self.dep_arrays.contains(&(array.span.start, array.span.end)) {
                    self.scopes.enter_dep_array();
                }
            }
            _ => {}
        }
        Traversal::Continue
    }

    fn exit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Arrow(arrow) => {
                let popped = self.scopes.pop(arrow.span, "arrow function");
                self.keep(popped);
            }
            Expr::Func(func) => {
                let popped = self.scopes.pop(func.span, "function expression");
                self.keep(popped);
            }
            Expr::Array(array) => {
                if self.dep_arrays.contains(&(array.span.start, array.span.end)) {
                    let left = self.scopes.exit_dep_array();
                    self.keep(left);
                }
            }
            _ => {}
        }
    }

    fn enter_jsx_element(&mut self, _el: &JsxElement) -> Traversal {
        if let Traversal::Stop = self.note(NodeKind::JsxElement) {
            return Traversal::Stop;
        }
        self.scopes.enter_markup();
        Traversal::Continue
    }

    fn exit_jsx_element(&mut self, _el: &JsxElement) {
        let left = self.scopes.exit_markup();
        self.keep(left);
    }

    fn enter_jsx_fragment(&mut self, _frag: &JsxFragment) -> Traversal {
        if let Traversal::Stop = self.note(NodeKind::JsxFragment) {
            return Traversal::Stop;
        }
        self.scopes.enter_markup();
        Traversal::Continue
    }

    fn exit_jsx_fragment(&mut self, _frag: &JsxFragment) {
        let left = self.scopes.exit_markup();
        self.keep(left);
    }

    fn enter_jsx_attr(&mut self, _attr: &JsxAttr) -> Traversal {
        self.note(NodeKind::JsxAttr)
    }

    fn visit_jsx_text(&mut self, _text: &JsxText) -> Traversal {
        self.note(NodeKind::JsxText)
    }
}

struct EvidenceScan<'t> {
    tracker: &'t HandleTracker,
    found: bool,
}

impl Visitor for EvidenceScan<'_> {
    fn enter_expr(&mut self, expr: &Expr) -> Traversal {
        if let Expr::Call(call) = expr {
            if self.tracker.creator_base(&call.callee).is_some() {
                self.found = true;
                return Traversal::Stop;
            }
        }
        Traversal::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_parser::parse;

    fn run(source: &str, options: &LintOptions) -> EngineOutput {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "{errors:?}");
        let registry = RuleRegistry::with_recommended();
        Engine::new(&program, source, "test.jsx", options, &registry)
            .run()
            .unwrap()
    }

    #[test]
    fn test_node_counts_are_recorded() {
        let options = LintOptions::default();
        let output = run("const countSignal = signal(0);", &options);
        assert_eq!(output.node_counts[NodeKind::Program as usize], 1);
        assert_eq!(output.node_counts[NodeKind::Declarator as usize], 1);
        assert_eq!(output.node_counts[NodeKind::Call as usize], 1);
        assert!(!output.budget_exhausted);
    }

    #[test]
    fn test_budget_stop_keeps_findings() {
        let options = LintOptions {
            max_nodes: 12,
            ..LintOptions::default()
        };
        // The mutation sits inside the budget; later statements do not
        let source = "const countSignal = signal(0);\n\
                      function Foo() { countSignal.value = 1; }\n\
                      const a = 1; const b = 2; const c = 3; const d = 4;";
        let output = run(source, &options);
        assert!(output.budget_exhausted);
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.rule_name == "signals/no-render-mutation")
        );
    }

    #[test]
    fn test_off_severity_skips_rule() {
        let mut options = LintOptions::default();
        options
            .severity
            .insert("signals/no-render-mutation".to_string(), Severity::Off);
        let source = "const countSignal = signal(0);\n\
                      function Foo() { countSignal.value = 1; }";
        let output = run(source, &options);
        assert!(
            output
                .diagnostics
                .iter()
                .all(|d| d.rule_name != "signals/no-render-mutation")
        );
    }

    #[test]
    fn test_assignment_bound_component_classifies_as_render() {
        // The component is named by an assignment, not a declarator
        let source = "let Counter;\n\
                      Counter = () => {\n\
                        const countSignal = signal(0);\n\
                        countSignal.value = 1;\n\
                        return null;\n\
                      };";
        let output = run(source, &LintOptions::default());
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.rule_name == "signals/no-render-creation")
        );
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.rule_name == "signals/no-render-mutation")
        );
    }

    #[test]
    fn test_suffix_resolution_is_order_independent() {
        // The suffix-named binding appears before the file's only creator
        // call; the evidence scan must still enable the heuristic for it.
        let source = "function Foo() { otherSignal.value = 1; }\n\
                      const countSignal = signal(0);";
        let output = run(source, &LintOptions::default());
        assert!(
            output
                .diagnostics
                .iter()
                .any(|d| d.rule_name == "signals/no-render-mutation"
                    && d.message.contains("otherSignal"))
        );
    }

    #[test]
    fn test_severity_override_applies_to_reports() {
        let mut options = LintOptions::default();
        options
            .severity
            .insert("signals/no-render-mutation".to_string(), Severity::Warn);
        let source = "const countSignal = signal(0);\n\
                      function Foo() { countSignal.value = 1; }";
        let output = run(source, &options);
        let diag = output
            .diagnostics
            .iter()
            .find(|d| d.rule_name == "signals/no-render-mutation")
            .unwrap();
        assert_eq!(diag.severity, Severity::Warn);
        assert_eq!(output.error_count, 0);
        assert!(output.warning_count >= 1);
    }
}
