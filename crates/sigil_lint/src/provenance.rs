//! Provenance tracking for reactive handles.
//!
//! Decides, without type information, whether an identifier denotes a
//! reactive handle. Evidence sources in priority order: creator call, import
//! alias, propagation (aliasing, container literals, one-level member
//! access), then the gated suffix heuristic. First match wins.
//!
//! All state is per-run. The contains-handle cache in particular must never
//! outlive one file's analysis.

use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use sigil_ast::{Declarator, Expr, ObjectProp, Pattern, Span};
use smallvec::SmallVec;

use crate::config::LintOptions;

/// How a handle's provenance was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOrigin {
    /// Initializer is a call to a creator by its base name
    CreatorCall,
    /// Initializer is a call through an aliased creator import
    ImportAlias,
    /// Initializer is a call through a namespace import
    NamespaceQualified,
    /// Name matched the configured suffix under the evidence gate
    SuffixHeuristic,
    /// Derived from another known handle
    Propagated,
}

/// Confidence tier for a handle classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Definite,
    Heuristic,
}

/// A tracked reactive handle binding.
#[derive(Debug, Clone)]
pub struct Handle {
    pub name: CompactString,
    pub origin: HandleOrigin,
    pub confidence: Confidence,
    /// Declaration site, when known
    pub span: Span,
}

/// Per-file handle resolution state.
///
/// Handles are never removed during a run; the lifetime of everything here
/// is one file's analysis.
pub struct HandleTracker {
    creator_names: FxHashSet<CompactString>,
    effect_names: FxHashSet<CompactString>,
    modules: FxHashSet<CompactString>,
    suffix: CompactString,
    enable_suffix_heuristic: bool,
    /// Local name -> creator base name, from named imports
    aliases: FxHashMap<CompactString, CompactString>,
    /// Locals bound by namespace imports of recognized modules
    namespaces: FxHashSet<CompactString>,
    handles: FxHashMap<CompactString, Handle>,
    /// Container binding -> property names that are handles
    containers: FxHashMap<CompactString, SmallVec<[CompactString; 4]>>,
    /// Whether the file shows any creator import or creator-producing
    /// declaration; gates the suffix heuristic
    creator_evidence: bool,
    /// Memoized contains-handle answers keyed by subtree span
    contains_cache: FxHashMap<(u32, u32), bool>,
}

impl HandleTracker {
    pub fn new(options: &LintOptions) -> Self {
        Self {
            creator_names: options.creator_names.iter().cloned().collect(),
            effect_names: options.effect_names.iter().cloned().collect(),
            modules: options.modules.iter().cloned().collect(),
            suffix: options.suffix.clone(),
            enable_suffix_heuristic: options.enable_suffix_heuristic,
            aliases: FxHashMap::default(),
            namespaces: FxHashSet::default(),
            handles: FxHashMap::default(),
            containers: FxHashMap::default(),
            creator_evidence: false,
            contains_cache: FxHashMap::default(),
        }
    }

    /// Whether a module specifier is recognized as exporting creators.
    #[inline]
    pub fn is_recognized_module(&self, specifier: &str) -> bool {
        self.modules.contains(specifier)
    }

    /// Record `import { imported as local }` of a recognized module.
    pub fn record_creator_import(&mut self, local: &str, imported: &str) {
        if self.creator_names.contains(imported) {
            self.aliases
                .insert(CompactString::new(local), CompactString::new(imported));
            self.creator_evidence = true;
        }
    }

    /// Record `import * as local` of a recognized module.
    pub fn record_namespace_import(&mut self, local: &str) {
        self.namespaces.insert(CompactString::new(local));
        self.creator_evidence = true;
    }

    #[inline]
    pub fn mark_creator_evidence(&mut self) {
        self.creator_evidence = true;
    }

    #[inline]
    pub fn has_creator_evidence(&self) -> bool {
        self.creator_evidence
    }

    /// Resolve a callee expression to a creator base name.
    ///
    /// Recognizes bare creator names, aliased imports, and
    /// `namespace.creator` through a namespace import.
    pub fn creator_base(&self, callee: &Expr) -> Option<(CompactString, HandleOrigin)> {
        match callee.unwrap_parens() {
            Expr::Ident(ident) => {
                if let Some(base) = self.aliases.get(ident.name.as_str()) {
                    return Some((base.clone(), HandleOrigin::ImportAlias));
                }
                if self.creator_names.contains(ident.name.as_str()) {
                    return Some((ident.name.clone(), HandleOrigin::CreatorCall));
                }
                None
            }
            Expr::Member(member) if !member.computed => {
                let Expr::Ident(object) = member.object.unwrap_parens() else {
                    return None;
                };
                if self.namespaces.contains(object.name.as_str())
                    && self.creator_names.contains(member.property.as_str())
                {
                    return Some((member.property.clone(), HandleOrigin::NamespaceQualified));
                }
                None
            }
            _ => None,
        }
    }

    /// Resolve a callee expression to an effect-like base name.
    pub fn effect_base(&self, callee: &Expr) -> Option<CompactString> {
        match callee.unwrap_parens() {
            Expr::Ident(ident) => {
                let base = self
                    .aliases
                    .get(ident.name.as_str())
                    .map(CompactString::as_str)
                    .unwrap_or(ident.name.as_str());
                self.effect_names.get(base).cloned()
            }
            Expr::Member(member) if !member.computed => {
                let Expr::Ident(object) = member.object.unwrap_parens() else {
                    return None;
                };
                if self.namespaces.contains(object.name.as_str()) {
                    return self.effect_names.get(member.property.as_str()).cloned();
                }
                None
            }
            _ => None,
        }
    }

    /// Whether a name qualifies for the suffix heuristic. The heuristic is
    /// gated: without creator evidence elsewhere in the file it never fires.
    #[inline]
    pub fn suffix_matches(&self, name: &str) -> bool {
        self.enable_suffix_heuristic
            && self.creator_evidence
            && name.len() > self.suffix.len()
            && name.ends_with(self.suffix.as_str())
    }

    /// Look up a handle by identifier name, falling back to the gated
    /// suffix heuristic for names that were never declared in this file.
    pub fn resolve(&self, name: &str) -> Option<Handle> {
        if let Some(handle) = self.handles.get(name) {
            return Some(handle.clone());
        }
        if self.suffix_matches(name) {
            return Some(Handle {
                name: CompactString::new(name),
                origin: HandleOrigin::SuffixHeuristic,
                confidence: Confidence::Heuristic,
                span: Span::EMPTY,
            });
        }
        None
    }

    /// Resolve an expression to a handle: a bare identifier, or one level
    /// of non-computed member access into a known container of handles.
    pub fn resolve_expr(&self, expr: &Expr) -> Option<Handle> {
        match expr.unwrap_parens() {
            Expr::Ident(ident) => self.resolve(&ident.name),
            Expr::Member(member) if !member.computed => {
                if let Expr::Ident(object) = member.object.unwrap_parens() {
                    if let Some(props) = self.containers.get(object.name.as_str()) {
                        if props.contains(&member.property) {
                            return Some(Handle {
                                name: member.property.clone(),
                                origin: HandleOrigin::Propagated,
                                confidence: Confidence::Definite,
                                span: member.property_span,
                            });
                        }
                    }
                }
                // Property name alone can still carry the suffix signal
                if self.suffix_matches(&member.property) {
                    return Some(Handle {
                        name: member.property.clone(),
                        origin: HandleOrigin::SuffixHeuristic,
                        confidence: Confidence::Heuristic,
                        span: member.property_span,
                    });
                }
                None
            }
            _ => None,
        }
    }

    /// Record one variable declarator, classifying its binding.
    pub fn record_declarator(&mut self, decl: &Declarator) {
        let Some(init) = &decl.init else {
            return;
        };
        match &decl.pattern {
            Pattern::Ident(ident) => {
                self.record_declaration(&ident.name, ident.span, init);
            }
            Pattern::Object(pattern) => {
                // Destructuring out of a known container propagates the
                // matched properties.
                if let Expr::Ident(source) = init.unwrap_parens() {
                    let matched: Vec<(CompactString, Span)> = self
                        .containers
                        .get(source.name.as_str())
                        .map(|props| {
                            pattern
                                .props
                                .iter()
                                .filter(|p| props.contains(&p.key))
                                .map(|p| (p.value.clone(), p.span))
                                .collect()
                        })
                        .unwrap_or_default();
                    for (local, span) in matched {
                        self.insert_handle(Handle {
                            name: local,
                            origin: HandleOrigin::Propagated,
                            confidence: Confidence::Definite,
                            span,
                        });
                    }
                }
            }
            Pattern::Array(pattern) => {
                // Destructuring a handle-bearing array propagates every
                // bound element.
                if self.contains_handle_ref(init) {
                    let elements: Vec<(CompactString, Span)> = pattern
                        .elements
                        .iter()
                        .flatten()
                        .map(|ident| (ident.name.clone(), ident.span))
                        .collect();
                    for (name, span) in elements {
                        self.insert_handle(Handle {
                            name,
                            origin: HandleOrigin::Propagated,
                            confidence: Confidence::Heuristic,
                            span,
                        });
                    }
                }
            }
        }
    }

    /// Classify a single-name declaration. Priority order: creator call,
    /// propagation, container literal, then the suffix heuristic.
    pub fn record_declaration(&mut self, name: &str, span: Span, init: &Expr) {
        let init = init.unwrap_parens();

        if let Expr::Call(call) = init {
            if let Some((_, origin)) = self.creator_base(&call.callee) {
                self.creator_evidence = true;
                self.insert_handle(Handle {
                    name: CompactString::new(name),
                    origin,
                    confidence: Confidence::Definite,
                    span,
                });
                return;
            }
        }

        if let Some(source) = self.resolve_expr(init) {
            self.insert_handle(Handle {
                name: CompactString::new(name),
                origin: HandleOrigin::Propagated,
                confidence: source.confidence,
                span,
            });
            return;
        }

        if let Expr::Object(object) = init {
            let handle_props: SmallVec<[CompactString; 4]> = object
                .props
                .iter()
                .filter_map(|prop| match prop {
                    ObjectProp::KeyValue { key, value, .. } => {
                        self.resolve_expr(value).map(|_| key.clone())
                    }
                    ObjectProp::Shorthand(ident) => {
                        self.resolve(&ident.name).map(|_| ident.name.clone())
                    }
                    ObjectProp::Spread { .. } => None,
                })
                .collect();
            if !handle_props.is_empty() {
                self.containers
                    .insert(CompactString::new(name), handle_props);
                self.insert_handle(Handle {
                    name: CompactString::new(name),
                    origin: HandleOrigin::Propagated,
                    confidence: Confidence::Definite,
                    span,
                });
                return;
            }
        }

        if matches!(init, Expr::Array(_)) && self.contains_handle_ref(init) {
            self.insert_handle(Handle {
                name: CompactString::new(name),
                origin: HandleOrigin::Propagated,
                confidence: Confidence::Definite,
                span,
            });
            return;
        }

        if self.suffix_matches(name) {
            self.insert_handle(Handle {
                name: CompactString::new(name),
                origin: HandleOrigin::SuffixHeuristic,
                confidence: Confidence::Heuristic,
                span,
            });
        }
    }

    #[inline]
    pub fn insert_handle(&mut self, handle: Handle) {
        self.handles.insert(handle.name.clone(), handle);
    }

    /// Whether a known container binding exposes this property as a handle.
    #[inline]
    pub fn container_prop(&self, container: &str, prop: &str) -> bool {
        self.containers
            .get(container)
            .is_some_and(|props| props.iter().any(|p| p == prop))
    }

    /// Memoized "does this subtree reference any handle" check.
    ///
    /// The cache is keyed by subtree span and is only valid within this run.
    /// Recursion through identifier names is guarded by a visited set.
    pub fn contains_handle_ref(&mut self, expr: &Expr) -> bool {
        let span = expr.span();
        let key = (span.start, span.end);
        if let Some(&hit) = self.contains_cache.get(&key) {
            return hit;
        }
        let mut visited = FxHashSet::default();
        let hit = self.contains_inner(expr, &mut visited);
        self.contains_cache.insert(key, hit);
        hit
    }

    fn contains_inner(&self, expr: &Expr, visited: &mut FxHashSet<CompactString>) -> bool {
        match expr.unwrap_parens() {
            Expr::Ident(ident) => {
                if !visited.insert(ident.name.clone()) {
                    return false;
                }
                self.resolve(&ident.name).is_some()
            }
            Expr::Object(object) => object.props.iter().any(|prop| match prop {
                ObjectProp::KeyValue { value, .. } => self.contains_inner(value, visited),
                ObjectProp::Shorthand(ident) => {
                    visited.insert(ident.name.clone()) && self.resolve(&ident.name).is_some()
                }
                ObjectProp::Spread { expr, .. } => self.contains_inner(expr, visited),
            }),
            Expr::Array(array) => array
                .elements
                .iter()
                .any(|el| self.contains_inner(el, visited)),
            member @ Expr::Member(_) => self.resolve_expr(member).is_some(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_parser::parse;

    fn tracker() -> HandleTracker {
        HandleTracker::new(&LintOptions::default())
    }

    fn first_declarator(source: &str) -> (sigil_ast::Program, usize) {
        let (program, errors) = parse(source);
        assert!(errors.is_empty());
        (program, 0)
    }

    fn record_all(tracker: &mut HandleTracker, program: &sigil_ast::Program) {
        for stmt in &program.body {
            if let sigil_ast::Stmt::Var(var) = stmt {
                for decl in &var.declarators {
                    tracker.record_declarator(decl);
                }
            }
        }
    }

    #[test]
    fn test_creator_call_is_definite() {
        let (program, _) = first_declarator("const countSignal = signal(0);");
        let mut t = tracker();
        record_all(&mut t, &program);
        let handle = t.resolve("countSignal").unwrap();
        assert_eq!(handle.confidence, Confidence::Definite);
        assert_eq!(handle.origin, HandleOrigin::CreatorCall);
    }

    #[test]
    fn test_import_alias_resolution() {
        let (program, _) = first_declarator("const x = s(0);");
        let mut t = tracker();
        t.record_creator_import("s", "signal");
        record_all(&mut t, &program);
        let handle = t.resolve("x").unwrap();
        assert_eq!(handle.confidence, Confidence::Definite);
        assert_eq!(handle.origin, HandleOrigin::ImportAlias);
    }

    #[test]
    fn test_namespace_qualified_creator() {
        let (program, _) = first_declarator("const x = signals.computed(f);");
        let mut t = tracker();
        t.record_namespace_import("signals");
        record_all(&mut t, &program);
        let handle = t.resolve("x").unwrap();
        assert_eq!(handle.origin, HandleOrigin::NamespaceQualified);
    }

    #[test]
    fn test_suffix_heuristic_requires_evidence() {
        let t = tracker();
        // No creator evidence anywhere: suffix alone never classifies
        assert!(t.resolve("countSignal").is_none());

        let mut t = tracker();
        t.mark_creator_evidence();
        let handle = t.resolve("countSignal").unwrap();
        assert_eq!(handle.confidence, Confidence::Heuristic);
        assert_eq!(handle.origin, HandleOrigin::SuffixHeuristic);
        // A bare suffix match with no stem never fires
        assert!(t.resolve("Signal").is_none());
    }

    #[test]
    fn test_alias_propagation() {
        let (program, _) =
            first_declarator("const countSignal = signal(0); const other = countSignal;");
        let mut t = tracker();
        record_all(&mut t, &program);
        let handle = t.resolve("other").unwrap();
        assert_eq!(handle.origin, HandleOrigin::Propagated);
        assert_eq!(handle.confidence, Confidence::Definite);
    }

    #[test]
    fn test_container_literal_and_member_access() {
        let (program, _) =
            first_declarator("const countSignal = signal(0); const box = { count: countSignal };");
        let mut t = tracker();
        record_all(&mut t, &program);
        assert!(t.container_prop("box", "count"));

        let (expr_program, _) = first_declarator("box.count;");
        let sigil_ast::Stmt::Expr(stmt) = &expr_program.body[0] else {
            panic!("expected expr stmt");
        };
        assert!(t.resolve_expr(&stmt.expr).is_some());
    }

    #[test]
    fn test_destructure_propagates_from_container() {
        let (program, _) = first_declarator(
            "const countSignal = signal(0); const box = { count: countSignal }; const { count } = box;",
        );
        let mut t = tracker();
        record_all(&mut t, &program);
        assert!(t.resolve("count").is_some());
    }

    #[test]
    fn test_contains_handle_ref_memoized() {
        let (program, _) =
            first_declarator("const countSignal = signal(0); const all = [1, { a: countSignal }];");
        let mut t = tracker();
        record_all(&mut t, &program);
        assert!(t.resolve("all").is_some());
    }
}
