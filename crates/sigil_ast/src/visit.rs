//! Traversal driver.
//!
//! Depth-first walk with one `enter_*` and one matching `exit_*` callback per
//! node, in strict nesting order. Children accessors are hand-written per
//! node kind, so the walk is exhaustive and compiler-checked.
//!
//! Returning [`Traversal::Stop`] from any enter callback abandons the rest of
//! the walk immediately; no further callbacks (including exits) are
//! delivered. Callers that abandon a walk must not rely on their own stack
//! state afterwards.

use crate::ast::*;

/// Flow control for the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    Continue,
    Stop,
}

macro_rules! walk {
    ($e:expr) => {
        if let Traversal::Stop = $e {
            return Traversal::Stop;
        }
    };
}

/// Visitor callbacks. Exit variants are optional; defaults do nothing.
pub trait Visitor {
    fn enter_stmt(&mut self, _stmt: &Stmt) -> Traversal {
        Traversal::Continue
    }
    fn exit_stmt(&mut self, _stmt: &Stmt) {}

    fn enter_declarator(&mut self, _decl: &Declarator) -> Traversal {
        Traversal::Continue
    }
    fn exit_declarator(&mut self, _decl: &Declarator) {}

    fn enter_expr(&mut self, _expr: &Expr) -> Traversal {
        Traversal::Continue
    }
    fn exit_expr(&mut self, _expr: &Expr) {}

    fn enter_jsx_element(&mut self, _el: &JsxElement) -> Traversal {
        Traversal::Continue
    }
    fn exit_jsx_element(&mut self, _el: &JsxElement) {}

    fn enter_jsx_fragment(&mut self, _frag: &JsxFragment) -> Traversal {
        Traversal::Continue
    }
    fn exit_jsx_fragment(&mut self, _frag: &JsxFragment) {}

    fn enter_jsx_attr(&mut self, _attr: &JsxAttr) -> Traversal {
        Traversal::Continue
    }

    fn visit_jsx_text(&mut self, _text: &JsxText) -> Traversal {
        Traversal::Continue
    }
}

/// Walk a whole program
pub fn walk_program<V: Visitor>(v: &mut V, program: &Program) -> Traversal {
    for stmt in &program.body {
        walk!(walk_stmt(v, stmt));
    }
    Traversal::Continue
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) -> Traversal {
    walk!(v.enter_stmt(stmt));
    match stmt {
        Stmt::Import(_) => {
            // Specifiers are leaves; consumers read them off the node.
        }
        Stmt::Var(var) => {
            for decl in &var.declarators {
                walk!(walk_declarator(v, decl));
            }
        }
        Stmt::Func(func) => {
            for inner in &func.body.body {
                walk!(walk_stmt(v, inner));
            }
        }
        Stmt::Block(block) => {
            for inner in &block.body {
                walk!(walk_stmt(v, inner));
            }
        }
        Stmt::Return(ret) => {
            if let Some(arg) = &ret.arg {
                walk!(walk_expr(v, arg));
            }
        }
        Stmt::Expr(expr_stmt) => {
            walk!(walk_expr(v, &expr_stmt.expr));
        }
        Stmt::If(if_stmt) => {
            walk!(walk_expr(v, &if_stmt.test));
            walk!(walk_stmt(v, &if_stmt.consequent));
            if let Some(alt) = &if_stmt.alternate {
                walk!(walk_stmt(v, alt));
            }
        }
    }
    v.exit_stmt(stmt);
    Traversal::Continue
}

pub fn walk_declarator<V: Visitor>(v: &mut V, decl: &Declarator) -> Traversal {
    walk!(v.enter_declarator(decl));
    if let Some(init) = &decl.init {
        walk!(walk_expr(v, init));
    }
    v.exit_declarator(decl);
    Traversal::Continue
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) -> Traversal {
    // JSX subtrees get their own callback family; everything else goes
    // through enter_expr/exit_expr.
    match expr {
        Expr::Jsx(el) => return walk_jsx_element(v, el),
        Expr::JsxFragment(frag) => return walk_jsx_fragment(v, frag),
        _ => {}
    }

    walk!(v.enter_expr(expr));
    match expr {
        Expr::Ident(_)
        | Expr::Number(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Null(_) => {}
        Expr::Array(arr) => {
            for el in &arr.elements {
                walk!(walk_expr(v, el));
            }
        }
        Expr::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    ObjectProp::KeyValue { value, .. } => walk!(walk_expr(v, value)),
                    ObjectProp::Spread { expr, .. } => walk!(walk_expr(v, expr)),
                    ObjectProp::Shorthand(_) => {}
                }
            }
        }
        Expr::Call(call) => {
            walk!(walk_expr(v, &call.callee));
            for arg in &call.args {
                walk!(walk_expr(v, arg));
            }
        }
        Expr::Member(member) => {
            walk!(walk_expr(v, &member.object));
            if let Some(index) = &member.computed_index {
                walk!(walk_expr(v, index));
            }
        }
        Expr::Assign(assign) => {
            walk!(walk_expr(v, &assign.target));
            walk!(walk_expr(v, &assign.value));
        }
        Expr::Update(update) => {
            walk!(walk_expr(v, &update.arg));
        }
        Expr::Unary(unary) => {
            walk!(walk_expr(v, &unary.arg));
        }
        Expr::Binary(binary) => {
            walk!(walk_expr(v, &binary.left));
            walk!(walk_expr(v, &binary.right));
        }
        Expr::Cond(cond) => {
            walk!(walk_expr(v, &cond.test));
            walk!(walk_expr(v, &cond.consequent));
            walk!(walk_expr(v, &cond.alternate));
        }
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(body) => walk!(walk_expr(v, body)),
            ArrowBody::Block(block) => {
                for stmt in &block.body {
                    walk!(walk_stmt(v, stmt));
                }
            }
        },
        Expr::Func(func) => {
            for stmt in &func.body.body {
                walk!(walk_stmt(v, stmt));
            }
        }
        Expr::Paren(paren) => {
            walk!(walk_expr(v, &paren.expr));
        }
        Expr::Jsx(_) | Expr::JsxFragment(_) => unreachable!("handled above"),
    }
    v.exit_expr(expr);
    Traversal::Continue
}

pub fn walk_jsx_element<V: Visitor>(v: &mut V, el: &JsxElement) -> Traversal {
    walk!(v.enter_jsx_element(el));
    for attr in &el.attrs {
        walk!(v.enter_jsx_attr(attr));
        if let Some(JsxAttrValue::Expr(container)) = &attr.value {
            walk!(walk_expr(v, &container.expr));
        }
    }
    for child in &el.children {
        walk!(walk_jsx_child(v, child));
    }
    v.exit_jsx_element(el);
    Traversal::Continue
}

pub fn walk_jsx_fragment<V: Visitor>(v: &mut V, frag: &JsxFragment) -> Traversal {
    walk!(v.enter_jsx_fragment(frag));
    for child in &frag.children {
        walk!(walk_jsx_child(v, child));
    }
    v.exit_jsx_fragment(frag);
    Traversal::Continue
}

pub fn walk_jsx_child<V: Visitor>(v: &mut V, child: &JsxChild) -> Traversal {
    match child {
        JsxChild::Element(el) => walk_jsx_element(v, el),
        JsxChild::Fragment(frag) => walk_jsx_fragment(v, frag),
        JsxChild::Expr(container) => walk_expr(v, &container.expr),
        JsxChild::Text(text) => v.visit_jsx_text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    struct Counter {
        enters: usize,
        exits: usize,
        stop_at: Option<usize>,
    }

    impl Visitor for Counter {
        fn enter_expr(&mut self, _expr: &Expr) -> Traversal {
            self.enters += 1;
            if Some(self.enters) == self.stop_at {
                return Traversal::Stop;
            }
            Traversal::Continue
        }
        fn exit_expr(&mut self, _expr: &Expr) {
            self.exits += 1;
        }
    }

    fn sample_program() -> Program {
        // x + (y)
        let expr = Expr::Binary(Box::new(BinaryExpr {
            op: BinaryOp::Add,
            left: Expr::Ident(Ident::new("x", Span::new(0, 1))),
            right: Expr::Paren(Box::new(ParenExpr {
                expr: Expr::Ident(Ident::new("y", Span::new(5, 6))),
                span: Span::new(4, 7),
            })),
            span: Span::new(0, 7),
        }));
        Program {
            body: vec![Stmt::Expr(ExprStmt {
                expr,
                span: Span::new(0, 7),
            })],
            span: Span::new(0, 7),
        }
    }

    #[test]
    fn test_enter_exit_balance() {
        let mut counter = Counter {
            enters: 0,
            exits: 0,
            stop_at: None,
        };
        let result = walk_program(&mut counter, &sample_program());
        assert_eq!(result, Traversal::Continue);
        assert_eq!(counter.enters, 4);
        assert_eq!(counter.exits, 4);
    }

    #[test]
    fn test_stop_abandons_walk() {
        let mut counter = Counter {
            enters: 0,
            exits: 0,
            stop_at: Some(2),
        };
        let result = walk_program(&mut counter, &sample_program());
        assert_eq!(result, Traversal::Stop);
        assert_eq!(counter.enters, 2);
        // No exits after abandonment
        assert_eq!(counter.exits, 0);
    }
}
