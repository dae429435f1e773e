//! Lexical context classification.
//!
//! A traversal-synchronized stack of function frames plus two additive
//! counters (markup depth, dependency-array depth). Function frames and
//! markup nesting are tracked separately: markup never contains a function
//! boundary that would need out-of-order unwinding, so a counter is enough.
//!
//! Mismatched pops are internal faults, not recoverable conditions.

use sigil_ast::Span;

use crate::error::InternalFault;

/// Lexical region classification for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ScopeKind {
    Module = 0,
    ComponentRender = 1,
    HookBody = 2,
    EffectCallback = 3,
    MarkupSubtree = 4,
}

impl ScopeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::ComponentRender => "component render",
            Self::HookBody => "hook body",
            Self::EffectCallback => "effect callback",
            Self::MarkupSubtree => "markup",
        }
    }
}

/// What a pushed function frame was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    ComponentRender,
    HookBody,
    EffectCallback,
    /// A function with no qualifying name. Masks the enclosing render/hook
    /// classification back to Module while on top of the stack.
    Plain,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Span of the function node that pushed this frame; exits must match
    span: Span,
    /// Markup depth when the frame was entered. Markup opened outside a
    /// function does not count as markup inside it.
    markup_at_entry: u32,
}

/// Per-run context stack.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
    markup_depth: u32,
    dep_array_depth: u32,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a function frame on node entry.
    pub fn push(&mut self, kind: FrameKind, span: Span) {
        self.frames.push(Frame {
            kind,
            span,
            markup_at_entry: self.markup_depth,
        });
    }

    /// Pop the frame pushed for the function at `span`.
    pub fn pop(&mut self, span: Span, node_kind: &'static str) -> Result<FrameKind, InternalFault> {
        let Some(frame) = self.frames.pop() else {
            return Err(InternalFault::ScopeUnderflow { node_kind });
        };
        if frame.span != span {
            return Err(InternalFault::FrameMismatch {
                opened_start: frame.span.start,
                opened_end: frame.span.end,
                closed_start: span.start,
                closed_end: span.end,
            });
        }
        Ok(frame.kind)
    }

    /// Whether the function at `span` is the frame currently on top.
    #[inline]
    pub fn top_is(&self, span: Span) -> bool {
        self.frames.last().is_some_and(|f| f.span == span)
    }

    /// Effective function-context classification.
    ///
    /// The top frame decides; a plain function masks everything beneath it
    /// back to Module. EffectCallback precedence over ComponentRender and
    /// HookBody falls out of top-of-stack ordering.
    pub fn current(&self) -> ScopeKind {
        match self.frames.last().map(|f| f.kind) {
            None | Some(FrameKind::Plain) => ScopeKind::Module,
            Some(FrameKind::ComponentRender) => ScopeKind::ComponentRender,
            Some(FrameKind::HookBody) => ScopeKind::HookBody,
            Some(FrameKind::EffectCallback) => ScopeKind::EffectCallback,
        }
    }

    /// Whether the current node sits inside a markup subtree opened within
    /// the innermost function. An event-handler function nested inside
    /// markup is not itself "in markup".
    pub fn in_markup(&self) -> bool {
        let base = self.frames.last().map(|f| f.markup_at_entry).unwrap_or(0);
        self.markup_depth > base
    }

    /// Whether the current node is inside a dependency-array argument.
    #[inline]
    pub fn in_dep_array(&self) -> bool {
        self.dep_array_depth > 0
    }

    pub fn enter_markup(&mut self) {
        self.markup_depth += 1;
    }

    pub fn exit_markup(&mut self) -> Result<(), InternalFault> {
        if self.markup_depth == 0 {
            return Err(InternalFault::MarkupUnderflow);
        }
        self.markup_depth -= 1;
        Ok(())
    }

    pub fn enter_dep_array(&mut self) {
        self.dep_array_depth += 1;
    }

    pub fn exit_dep_array(&mut self) -> Result<(), InternalFault> {
        if self.dep_array_depth == 0 {
            return Err(InternalFault::DepArrayUnderflow);
        }
        self.dep_array_depth -= 1;
        Ok(())
    }

    /// Current frame depth (module scope is depth 0).
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32) -> Span {
        Span::new(start, end)
    }

    #[test]
    fn test_plain_function_masks_render() {
        let mut stack = ContextStack::new();
        stack.push(FrameKind::ComponentRender, span(0, 100));
        assert_eq!(stack.current(), ScopeKind::ComponentRender);

        stack.push(FrameKind::Plain, span(10, 40));
        assert_eq!(stack.current(), ScopeKind::Module);

        // Exiting the nested plain function restores the render frame
        assert_eq!(
            stack.pop(span(10, 40), "arrow").unwrap(),
            FrameKind::Plain
        );
        assert_eq!(stack.current(), ScopeKind::ComponentRender);
    }

    #[test]
    fn test_effect_takes_precedence_over_render() {
        let mut stack = ContextStack::new();
        stack.push(FrameKind::ComponentRender, span(0, 100));
        stack.push(FrameKind::EffectCallback, span(20, 60));
        assert_eq!(stack.current(), ScopeKind::EffectCallback);
    }

    #[test]
    fn test_markup_is_scoped_to_innermost_function() {
        let mut stack = ContextStack::new();
        stack.push(FrameKind::ComponentRender, span(0, 100));
        stack.enter_markup();
        assert!(stack.in_markup());

        // An event handler inside markup is not itself in markup
        stack.push(FrameKind::Plain, span(30, 50));
        assert!(!stack.in_markup());
        stack.pop(span(30, 50), "arrow").unwrap();
        assert!(stack.in_markup());

        stack.exit_markup().unwrap();
        assert!(!stack.in_markup());
    }

    #[test]
    fn test_pop_underflow_is_fault() {
        let mut stack = ContextStack::new();
        assert!(matches!(
            stack.pop(span(0, 1), "function"),
            Err(InternalFault::ScopeUnderflow { .. })
        ));
    }

    #[test]
    fn test_pop_mismatch_is_fault() {
        let mut stack = ContextStack::new();
        stack.push(FrameKind::HookBody, span(0, 10));
        assert!(matches!(
            stack.pop(span(5, 10), "function"),
            Err(InternalFault::FrameMismatch { .. })
        ));
    }

    #[test]
    fn test_dep_array_depth() {
        let mut stack = ContextStack::new();
        assert!(!stack.in_dep_array());
        stack.enter_dep_array();
        assert!(stack.in_dep_array());
        stack.exit_dep_array().unwrap();
        assert!(!stack.in_dep_array());
        assert!(stack.exit_dep_array().is_err());
    }
}
