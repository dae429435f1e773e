//! Node types for the analyzed JS/JSX subset.
//!
//! The shape intentionally covers only what reactive-handle analysis needs:
//! imports, declarations, functions and arrows, call/member chains with
//! optional chaining, assignment and update expressions, literals, and JSX.

use crate::span::Span;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Node kind discriminant.
///
/// Closed enum: every node struct maps to exactly one kind, and per-kind
/// bookkeeping (visit counters, budgets) indexes fixed tables with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeKind {
    Program = 0,
    ImportDecl = 1,
    VarDecl = 2,
    Declarator = 3,
    FuncDecl = 4,
    BlockStmt = 5,
    ReturnStmt = 6,
    ExprStmt = 7,
    IfStmt = 8,
    Ident = 9,
    NumberLit = 10,
    StringLit = 11,
    BoolLit = 12,
    NullLit = 13,
    ArrayLit = 14,
    ObjectLit = 15,
    Call = 16,
    Member = 17,
    Assign = 18,
    Update = 19,
    Unary = 20,
    Binary = 21,
    Cond = 22,
    Arrow = 23,
    FuncExpr = 24,
    Paren = 25,
    JsxElement = 26,
    JsxFragment = 27,
    JsxAttr = 28,
    JsxExprContainer = 29,
    JsxText = 30,
}

impl NodeKind {
    /// Number of kinds, for fixed-size per-kind tables
    pub const COUNT: usize = 31;

    /// Stable display name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Program => "Program",
            Self::ImportDecl => "ImportDecl",
            Self::VarDecl => "VarDecl",
            Self::Declarator => "Declarator",
            Self::FuncDecl => "FuncDecl",
            Self::BlockStmt => "BlockStmt",
            Self::ReturnStmt => "ReturnStmt",
            Self::ExprStmt => "ExprStmt",
            Self::IfStmt => "IfStmt",
            Self::Ident => "Ident",
            Self::NumberLit => "NumberLit",
            Self::StringLit => "StringLit",
            Self::BoolLit => "BoolLit",
            Self::NullLit => "NullLit",
            Self::ArrayLit => "ArrayLit",
            Self::ObjectLit => "ObjectLit",
            Self::Call => "Call",
            Self::Member => "Member",
            Self::Assign => "Assign",
            Self::Update => "Update",
            Self::Unary => "Unary",
            Self::Binary => "Binary",
            Self::Cond => "Cond",
            Self::Arrow => "Arrow",
            Self::FuncExpr => "FuncExpr",
            Self::Paren => "Paren",
            Self::JsxElement => "JsxElement",
            Self::JsxFragment => "JsxFragment",
            Self::JsxAttr => "JsxAttr",
            Self::JsxExprContainer => "JsxExprContainer",
            Self::JsxText => "JsxText",
        }
    }
}

/// Root node of one analyzed file
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Statement-level nodes
#[derive(Debug, Clone)]
pub enum Stmt {
    Import(ImportDecl),
    Var(VarDecl),
    Func(FuncDecl),
    Block(BlockStmt),
    Return(ReturnStmt),
    Expr(ExprStmt),
    If(IfStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Import(n) => n.span,
            Self::Var(n) => n.span,
            Self::Func(n) => n.span,
            Self::Block(n) => n.span,
            Self::Return(n) => n.span,
            Self::Expr(n) => n.span,
            Self::If(n) => n.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Import(_) => NodeKind::ImportDecl,
            Self::Var(_) => NodeKind::VarDecl,
            Self::Func(_) => NodeKind::FuncDecl,
            Self::Block(_) => NodeKind::BlockStmt,
            Self::Return(_) => NodeKind::ReturnStmt,
            Self::Expr(_) => NodeKind::ExprStmt,
            Self::If(_) => NodeKind::IfStmt,
        }
    }
}

/// `import ... from 'module'`
#[derive(Debug, Clone)]
pub struct ImportDecl {
    /// Module specifier, without quotes
    pub source: CompactString,
    pub specifiers: Vec<ImportSpecifier>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ImportSpecifier {
    /// `import { imported as local }` (local == imported when not aliased)
    Named {
        imported: CompactString,
        local: CompactString,
        span: Span,
    },
    /// `import local from ...`
    Default { local: CompactString, span: Span },
    /// `import * as local from ...`
    Namespace { local: CompactString, span: Span },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            Self::Named { local, .. } | Self::Default { local, .. } | Self::Namespace { local, .. } => {
                local.as_str()
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Named { span, .. } | Self::Default { span, .. } | Self::Namespace { span, .. } => {
                *span
            }
        }
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VarKind {
    Const = 0,
    Let = 1,
    Var = 2,
}

impl VarKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::Let => "let",
            Self::Var => "var",
        }
    }
}

/// `const`/`let`/`var` statement, possibly multi-declarator
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

/// One `pattern = init` inside a declaration
#[derive(Debug, Clone)]
pub struct Declarator {
    pub pattern: Pattern,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Binding pattern
#[derive(Debug, Clone)]
pub enum Pattern {
    Ident(Ident),
    Object(ObjectPattern),
    Array(ArrayPattern),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(n) => n.span,
            Self::Object(n) => n.span,
            Self::Array(n) => n.span,
        }
    }

    /// Names bound by this pattern, in source order
    pub fn bound_names(&self) -> Vec<&str> {
        match self {
            Self::Ident(id) => vec![id.name.as_str()],
            Self::Object(obj) => obj.props.iter().map(|p| p.value.as_str()).collect(),
            Self::Array(arr) => arr
                .elements
                .iter()
                .flatten()
                .map(|id| id.name.as_str())
                .collect(),
        }
    }
}

/// `{ key, other: local }` destructuring pattern
#[derive(Debug, Clone)]
pub struct ObjectPattern {
    pub props: Vec<ObjectPatternProp>,
    pub span: Span,
}

/// One property of an object pattern; `key == value` for shorthand
#[derive(Debug, Clone)]
pub struct ObjectPatternProp {
    pub key: CompactString,
    /// Local binding name
    pub value: CompactString,
    pub span: Span,
}

/// `[a, , b]` destructuring pattern
#[derive(Debug, Clone)]
pub struct ArrayPattern {
    pub elements: Vec<Option<Ident>>,
    pub span: Span,
}

/// Identifier reference or binding
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: CompactString,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<CompactString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `function name(params) { ... }`
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Pattern>,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub arg: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Box<Stmt>,
    pub alternate: Option<Box<Stmt>>,
    pub span: Span,
}

/// Expression-level nodes
#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    Number(NumberLit),
    Str(StringLit),
    Bool(BoolLit),
    Null(Span),
    Array(ArrayLit),
    Object(ObjectLit),
    Call(Box<CallExpr>),
    Member(Box<MemberExpr>),
    Assign(Box<AssignExpr>),
    Update(Box<UpdateExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Cond(Box<CondExpr>),
    Arrow(Box<ArrowExpr>),
    Func(Box<FuncExpr>),
    Paren(Box<ParenExpr>),
    Jsx(Box<JsxElement>),
    JsxFragment(Box<JsxFragment>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(n) => n.span,
            Self::Number(n) => n.span,
            Self::Str(n) => n.span,
            Self::Bool(n) => n.span,
            Self::Null(span) => *span,
            Self::Array(n) => n.span,
            Self::Object(n) => n.span,
            Self::Call(n) => n.span,
            Self::Member(n) => n.span,
            Self::Assign(n) => n.span,
            Self::Update(n) => n.span,
            Self::Unary(n) => n.span,
            Self::Binary(n) => n.span,
            Self::Cond(n) => n.span,
            Self::Arrow(n) => n.span,
            Self::Func(n) => n.span,
            Self::Paren(n) => n.span,
            Self::Jsx(n) => n.span,
            Self::JsxFragment(n) => n.span,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Ident(_) => NodeKind::Ident,
            Self::Number(_) => NodeKind::NumberLit,
            Self::Str(_) => NodeKind::StringLit,
            Self::Bool(_) => NodeKind::BoolLit,
            Self::Null(_) => NodeKind::NullLit,
            Self::Array(_) => NodeKind::ArrayLit,
            Self::Object(_) => NodeKind::ObjectLit,
            Self::Call(_) => NodeKind::Call,
            Self::Member(_) => NodeKind::Member,
            Self::Assign(_) => NodeKind::Assign,
            Self::Update(_) => NodeKind::Update,
            Self::Unary(_) => NodeKind::Unary,
            Self::Binary(_) => NodeKind::Binary,
            Self::Cond(_) => NodeKind::Cond,
            Self::Arrow(_) => NodeKind::Arrow,
            Self::Func(_) => NodeKind::FuncExpr,
            Self::Paren(_) => NodeKind::Paren,
            Self::Jsx(_) => NodeKind::JsxElement,
            Self::JsxFragment(_) => NodeKind::JsxFragment,
        }
    }

    /// Strip parenthesization
    pub fn unwrap_parens(&self) -> &Expr {
        let mut e = self;
        while let Expr::Paren(p) = e {
            e = &p.expr;
        }
        e
    }

    /// Whether any step of this call/member chain uses `?.`
    pub fn has_optional_chain(&self) -> bool {
        match self.unwrap_parens() {
            Expr::Member(m) => m.optional || m.object.has_optional_chain(),
            Expr::Call(c) => c.optional || c.callee.has_optional_chain(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumberLit {
    pub value: f64,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct StringLit {
    /// Unquoted value
    pub value: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLit {
    pub elements: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectLit {
    pub props: Vec<ObjectProp>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ObjectProp {
    /// `key: value`
    KeyValue {
        key: CompactString,
        value: Expr,
        span: Span,
    },
    /// `{ name }`
    Shorthand(Ident),
    /// `{ ...expr }`
    Spread { expr: Expr, span: Span },
}

impl ObjectProp {
    pub fn span(&self) -> Span {
        match self {
            Self::KeyValue { span, .. } | Self::Spread { span, .. } => *span,
            Self::Shorthand(id) => id.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    /// `callee?.(...)`
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Expr,
    /// Property name; empty for computed access
    pub property: CompactString,
    pub property_span: Span,
    /// `object?.property`
    pub optional: bool,
    /// `object[expr]` — the index expression is kept in `computed_index`
    pub computed: bool,
    pub computed_index: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
}

impl AssignOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

#[derive(Debug, Clone)]
pub struct UpdateExpr {
    pub arg: Expr,
    pub op: UpdateOp,
    pub prefix: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    TypeOf,
    Void,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    StrictEq,
    Neq,
    StrictNeq,
    Lt,
    Gt,
    Le,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Nullish,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CondExpr {
    pub test: Expr,
    pub consequent: Expr,
    pub alternate: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Expr(Expr),
    Block(BlockStmt),
}

#[derive(Debug, Clone)]
pub struct ArrowExpr {
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncExpr {
    pub name: Option<Ident>,
    pub params: Vec<Pattern>,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub expr: Expr,
    pub span: Span,
}

/// `<Name attr="..." other={expr}>children</Name>`
#[derive(Debug, Clone)]
pub struct JsxElement {
    pub name: CompactString,
    pub name_span: Span,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

/// `<>children</>`
#[derive(Debug, Clone)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct JsxAttr {
    pub name: CompactString,
    pub value: Option<JsxAttrValue>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum JsxAttrValue {
    Str(StringLit),
    Expr(JsxExprContainer),
}

#[derive(Debug, Clone)]
pub struct JsxExprContainer {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum JsxChild {
    Element(JsxElement),
    Fragment(JsxFragment),
    Expr(JsxExprContainer),
    Text(JsxText),
}

#[derive(Debug, Clone)]
pub struct JsxText {
    pub value: CompactString,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_names() {
        assert_eq!(NodeKind::Program.name(), "Program");
        assert_eq!(NodeKind::JsxText.name(), "JsxText");
    }

    #[test]
    fn test_pattern_bound_names() {
        let pat = Pattern::Object(ObjectPattern {
            props: vec![
                ObjectPatternProp {
                    key: "a".into(),
                    value: "a".into(),
                    span: Span::EMPTY,
                },
                ObjectPatternProp {
                    key: "b".into(),
                    value: "c".into(),
                    span: Span::EMPTY,
                },
            ],
            span: Span::EMPTY,
        });
        assert_eq!(pat.bound_names(), vec!["a", "c"]);
    }

    #[test]
    fn test_optional_chain_detection() {
        let base = Expr::Ident(Ident::new("x", Span::new(0, 1)));
        let member = Expr::Member(Box::new(MemberExpr {
            object: base,
            property: "value".into(),
            property_span: Span::new(2, 7),
            optional: true,
            computed: false,
            computed_index: None,
            span: Span::new(0, 7),
        }));
        assert!(member.has_optional_chain());
    }
}
