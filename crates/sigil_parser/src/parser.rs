//! Recursive-descent parser.
//!
//! Token mode handles all JS constructs; JSX children are read at the
//! character level (text is not tokenizable) and the parser repositions the
//! lexer when it re-enters token mode. Errors are collected, not thrown:
//! the parser always produces a tree.

use compact_str::CompactString;
use sigil_ast::*;

use crate::lexer::{Lexer, Token, TokenKind};

/// A recoverable parse problem
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: CompactString,
    pub span: Span,
}

/// Parse a whole source file
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    Parser::new(source).parse_program()
}

pub struct Parser<'s> {
    lexer: Lexer<'s>,
    current: Token,
    prev_span: Span,
    errors: Vec<ParseError>,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            prev_span: Span::EMPTY,
            errors: Vec::new(),
        }
    }

    // ---- token helpers -------------------------------------------------

    fn bump(&mut self) -> Token {
        let next = self.lexer.next_token();
        let old = std::mem::replace(&mut self.current, next);
        self.prev_span = old.span;
        old
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current.kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Span {
        if self.current.kind == kind {
            self.bump().span
        } else {
            self.error(format!("expected {what}"), self.current.span);
            self.current.span
        }
    }

    fn expect_ident(&mut self, what: &str) -> Ident {
        if let TokenKind::Ident(name) = &self.current.kind {
            let ident = Ident::new(name.clone(), self.current.span);
            self.bump();
            ident
        } else {
            self.error(format!("expected {what}"), self.current.span);
            Ident::new("", self.current.span)
        }
    }

    fn at_contextual(&self, word: &str) -> bool {
        self.current.kind.ident() == Some(word)
    }

    fn error(&mut self, message: impl Into<CompactString>, span: Span) {
        self.errors.push(ParseError {
            message: message.into(),
            span,
        });
    }

    /// Peek at the token after `current` without consuming anything
    fn next_kind(&self) -> TokenKind {
        let mut probe = self.lexer.clone();
        probe.next_token().kind
    }

    // ---- program & statements ------------------------------------------

    pub fn parse_program(mut self) -> (Program, Vec<ParseError>) {
        let mut body = Vec::new();
        while !self.at(&TokenKind::Eof) {
            if self.at(&TokenKind::Semi) {
                self.bump();
                continue;
            }
            let before = self.current.span.start;
            body.push(self.parse_stmt());
            // Guard against a stuck parser on malformed input
            if self.current.span.start == before && !self.at(&TokenKind::Eof) {
                self.bump();
            }
        }
        let end = self.current.span.end;
        (
            Program {
                body,
                span: Span::new(0, end),
            },
            self.errors,
        )
    }

    fn parse_stmt(&mut self) -> Stmt {
        match &self.current.kind {
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => {
                let span = self.bump().span;
                self.eat(TokenKind::Default);
                if self.at(&TokenKind::LBrace) {
                    // `export { ... } [from '...']` re-export list; nothing
                    // to analyze, skim past it.
                    self.bump();
                    while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                        self.bump();
                    }
                    self.eat(TokenKind::RBrace);
                    if self.at_contextual("from") {
                        self.bump();
                        if matches!(self.current.kind, TokenKind::Str(_)) {
                            self.bump();
                        }
                    }
                    self.eat(TokenKind::Semi);
                    return Stmt::Expr(ExprStmt {
                        expr: Expr::Null(span),
                        span: Span::new(span.start, self.prev_span.end),
                    });
                }
                self.parse_stmt()
            }
            TokenKind::Const | TokenKind::Let | TokenKind::Var => self.parse_var_decl(),
            TokenKind::Function => self.parse_func_decl(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::LBrace => Stmt::Block(self.parse_block()),
            _ => {
                let expr = self.parse_expr();
                let start = expr.span().start;
                let mut end = expr.span().end;
                if self.eat(TokenKind::Semi) {
                    end = self.prev_span.end;
                }
                Stmt::Expr(ExprStmt {
                    expr,
                    span: Span::new(start, end),
                })
            }
        }
    }

    fn parse_import(&mut self) -> Stmt {
        let start = self.bump().span.start;
        let mut specifiers = Vec::new();

        if !matches!(self.current.kind, TokenKind::Str(_)) {
            // Default specifier
            if let TokenKind::Ident(name) = &self.current.kind {
                specifiers.push(ImportSpecifier::Default {
                    local: name.clone(),
                    span: self.current.span,
                });
                self.bump();
                self.eat(TokenKind::Comma);
            }
            if self.at(&TokenKind::Star) {
                let star_span = self.bump().span;
                if self.at_contextual("as") {
                    self.bump();
                    let local = self.expect_ident("namespace alias");
                    specifiers.push(ImportSpecifier::Namespace {
                        local: local.name,
                        span: Span::new(star_span.start, local.span.end),
                    });
                } else {
                    self.error("expected `as` after `*`", star_span);
                }
            } else if self.eat(TokenKind::LBrace) {
                while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                    let imported = self.expect_ident("import name");
                    let (local, end) = if self.at_contextual("as") {
                        self.bump();
                        let alias = self.expect_ident("import alias");
                        (alias.name, alias.span.end)
                    } else {
                        (imported.name.clone(), imported.span.end)
                    };
                    specifiers.push(ImportSpecifier::Named {
                        imported: imported.name,
                        local,
                        span: Span::new(imported.span.start, end),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "`}` after import list");
            }
            if self.at_contextual("from") {
                self.bump();
            } else {
                self.error("expected `from` in import", self.current.span);
            }
        }

        let source = if let TokenKind::Str(value) = &self.current.kind {
            let value = value.clone();
            self.bump();
            value
        } else {
            self.error("expected module specifier string", self.current.span);
            CompactString::new("")
        };
        self.eat(TokenKind::Semi);

        Stmt::Import(ImportDecl {
            source,
            specifiers,
            span: Span::new(start, self.prev_span.end),
        })
    }

    fn parse_var_decl(&mut self) -> Stmt {
        let kind = match self.current.kind {
            TokenKind::Const => VarKind::Const,
            TokenKind::Let => VarKind::Let,
            _ => VarKind::Var,
        };
        let start = self.bump().span.start;
        let mut declarators = Vec::new();
        loop {
            let pattern = self.parse_pattern();
            let init = if self.eat(TokenKind::Eq) {
                Some(self.parse_assign())
            } else {
                None
            };
            let end = init
                .as_ref()
                .map(|e| e.span().end)
                .unwrap_or(pattern.span().end);
            declarators.push(Declarator {
                span: Span::new(pattern.span().start, end),
                pattern,
                init,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.eat(TokenKind::Semi);
        Stmt::Var(VarDecl {
            kind,
            declarators,
            span: Span::new(start, self.prev_span.end),
        })
    }

    fn parse_pattern(&mut self) -> Pattern {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.current.span);
                self.bump();
                Pattern::Ident(ident)
            }
            TokenKind::LBrace => {
                let start = self.bump().span.start;
                let mut props = Vec::new();
                while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
                    let key = self.expect_ident("property name");
                    let (value, end) = if self.eat(TokenKind::Colon) {
                        let local = self.expect_ident("binding name");
                        (local.name, local.span.end)
                    } else {
                        (key.name.clone(), key.span.end)
                    };
                    props.push(ObjectPatternProp {
                        key: key.name,
                        value,
                        span: Span::new(key.span.start, end),
                    });
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(TokenKind::RBrace, "`}` after pattern").end;
                Pattern::Object(ObjectPattern {
                    props,
                    span: Span::new(start, end),
                })
            }
            TokenKind::LBracket => {
                let start = self.bump().span.start;
                let mut elements = Vec::new();
                while !self.at(&TokenKind::RBracket) && !self.at(&TokenKind::Eof) {
                    if self.at(&TokenKind::Comma) {
                        elements.push(None);
                        self.bump();
                        continue;
                    }
                    let ident = self.expect_ident("binding name");
                    elements.push(Some(ident));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                let end = self.expect(TokenKind::RBracket, "`]` after pattern").end;
                Pattern::Array(ArrayPattern {
                    elements,
                    span: Span::new(start, end),
                })
            }
            _ => {
                self.error("expected binding pattern", self.current.span);
                Pattern::Ident(Ident::new("", self.current.span))
            }
        }
    }

    fn parse_func_decl(&mut self) -> Stmt {
        let start = self.bump().span.start;
        let name = self.expect_ident("function name");
        let params = self.parse_params();
        let body = self.parse_block();
        let end = body.span.end;
        Stmt::Func(FuncDecl {
            name,
            params,
            body,
            span: Span::new(start, end),
        })
    }

    fn parse_params(&mut self) -> Vec<Pattern> {
        self.expect(TokenKind::LParen, "`(`");
        let mut params = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            params.push(self.parse_pattern());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "`)` after parameters");
        params
    }

    fn parse_block(&mut self) -> BlockStmt {
        let start = self.expect(TokenKind::LBrace, "`{`").start;
        let mut body = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            if self.at(&TokenKind::Semi) {
                self.bump();
                continue;
            }
            let before = self.current.span.start;
            body.push(self.parse_stmt());
            if self.current.span.start == before && !self.at(&TokenKind::RBrace) {
                self.bump();
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` after block").end;
        BlockStmt {
            body,
            span: Span::new(start, end),
        }
    }

    fn parse_return(&mut self) -> Stmt {
        let start = self.bump().span.start;
        let arg = if self.at(&TokenKind::Semi)
            || self.at(&TokenKind::RBrace)
            || self.at(&TokenKind::Eof)
            || self.current.newline_before
        {
            None
        } else {
            Some(self.parse_expr())
        };
        self.eat(TokenKind::Semi);
        Stmt::Return(ReturnStmt {
            arg,
            span: Span::new(start, self.prev_span.end),
        })
    }

    fn parse_if(&mut self) -> Stmt {
        let start = self.bump().span.start;
        self.expect(TokenKind::LParen, "`(` after `if`");
        let test = self.parse_expr();
        self.expect(TokenKind::RParen, "`)` after condition");
        let consequent = Box::new(self.parse_stmt());
        let alternate = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()))
        } else {
            None
        };
        let end = alternate
            .as_ref()
            .map(|s| s.span().end)
            .unwrap_or(consequent.span().end);
        Stmt::If(IfStmt {
            test,
            consequent,
            alternate,
            span: Span::new(start, end),
        })
    }

    // ---- expressions ---------------------------------------------------

    pub fn parse_expr(&mut self) -> Expr {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Expr {
        let target = self.parse_cond();
        let op = match self.current.kind {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            _ => return target,
        };
        self.bump();
        let value = self.parse_assign();
        let span = Span::new(target.span().start, value.span().end);
        Expr::Assign(Box::new(AssignExpr {
            target,
            op,
            value,
            span,
        }))
    }

    fn parse_cond(&mut self) -> Expr {
        let test = self.parse_nullish();
        if !self.at(&TokenKind::Question) {
            return test;
        }
        self.bump();
        let consequent = self.parse_assign();
        self.expect(TokenKind::Colon, "`:` in conditional");
        let alternate = self.parse_assign();
        let span = Span::new(test.span().start, alternate.span().end);
        Expr::Cond(Box::new(CondExpr {
            test,
            consequent,
            alternate,
            span,
        }))
    }

    fn binary(left: Expr, op: BinaryOp, right: Expr) -> Expr {
        let span = Span::new(left.span().start, right.span().end);
        Expr::Binary(Box::new(BinaryExpr {
            op,
            left,
            right,
            span,
        }))
    }

    fn parse_nullish(&mut self) -> Expr {
        let mut left = self.parse_or();
        while self.eat(TokenKind::QuestionQuestion) {
            let right = self.parse_or();
            left = Self::binary(left, BinaryOp::Nullish, right);
        }
        left
    }

    fn parse_or(&mut self) -> Expr {
        let mut left = self.parse_and();
        while self.eat(TokenKind::PipePipe) {
            let right = self.parse_and();
            left = Self::binary(left, BinaryOp::Or, right);
        }
        left
    }

    fn parse_and(&mut self) -> Expr {
        let mut left = self.parse_equality();
        while self.eat(TokenKind::AmpAmp) {
            let right = self.parse_equality();
            left = Self::binary(left, BinaryOp::And, right);
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_relational();
        loop {
            let op = match self.current.kind {
                TokenKind::EqEqEq => BinaryOp::StrictEq,
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NeqEq => BinaryOp::StrictNeq,
                TokenKind::Neq => BinaryOp::Neq,
                _ => break,
            };
            self.bump();
            let right = self.parse_relational();
            left = Self::binary(left, op, right);
        }
        left
    }

    fn parse_relational(&mut self) -> Expr {
        let mut left = self.parse_additive();
        loop {
            let op = match self.current.kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Le => BinaryOp::Le,
                TokenKind::Ge => BinaryOp::Ge,
                _ => break,
            };
            self.bump();
            let right = self.parse_additive();
            left = Self::binary(left, op, right);
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.bump();
            let right = self.parse_multiplicative();
            left = Self::binary(left, op, right);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => break,
            };
            self.bump();
            let right = self.parse_unary();
            left = Self::binary(left, op, right);
        }
        left
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.current.kind {
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::TypeOf => Some(UnaryOp::TypeOf),
            TokenKind::Void => Some(UnaryOp::Void),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.bump().span.start;
            let arg = self.parse_unary();
            let span = Span::new(start, arg.span().end);
            return Expr::Unary(Box::new(UnaryExpr { op, arg, span }));
        }
        let update = match self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(op) = update {
            let start = self.bump().span.start;
            let arg = self.parse_unary();
            let span = Span::new(start, arg.span().end);
            return Expr::Update(Box::new(UpdateExpr {
                arg,
                op,
                prefix: true,
                span,
            }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_call_member();
        loop {
            let op = match self.current.kind {
                TokenKind::PlusPlus => UpdateOp::Increment,
                TokenKind::MinusMinus => UpdateOp::Decrement,
                _ => break,
            };
            if self.current.newline_before {
                break;
            }
            let end = self.bump().span.end;
            let span = Span::new(expr.span().start, end);
            expr = Expr::Update(Box::new(UpdateExpr {
                arg: expr,
                op,
                prefix: false,
                span,
            }));
        }
        expr
    }

    fn parse_call_member(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.bump();
                    let property = self.expect_ident("property name");
                    let span = Span::new(expr.span().start, property.span.end);
                    expr = Expr::Member(Box::new(MemberExpr {
                        object: expr,
                        property: property.name,
                        property_span: property.span,
                        optional: false,
                        computed: false,
                        computed_index: None,
                        span,
                    }));
                }
                TokenKind::QuestionDot => {
                    self.bump();
                    if self.at(&TokenKind::LParen) {
                        expr = self.parse_call_args(expr, true);
                    } else if self.at(&TokenKind::LBracket) {
                        expr = self.parse_computed_member(expr, true);
                    } else {
                        let property = self.expect_ident("property name");
                        let span = Span::new(expr.span().start, property.span.end);
                        expr = Expr::Member(Box::new(MemberExpr {
                            object: expr,
                            property: property.name,
                            property_span: property.span,
                            optional: true,
                            computed: false,
                            computed_index: None,
                            span,
                        }));
                    }
                }
                TokenKind::LParen => {
                    expr = self.parse_call_args(expr, false);
                }
                TokenKind::LBracket => {
                    expr = self.parse_computed_member(expr, false);
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_call_args(&mut self, callee: Expr, optional: bool) -> Expr {
        self.bump();
        let mut args = Vec::new();
        while !self.at(&TokenKind::RParen) && !self.at(&TokenKind::Eof) {
            args.push(self.parse_assign());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RParen, "`)` after arguments").end;
        let span = Span::new(callee.span().start, end);
        Expr::Call(Box::new(CallExpr {
            callee,
            args,
            optional,
            span,
        }))
    }

    fn parse_computed_member(&mut self, object: Expr, optional: bool) -> Expr {
        self.bump();
        let index = self.parse_expr();
        let end = self.expect(TokenKind::RBracket, "`]` after index").end;
        let span = Span::new(object.span().start, end);
        Expr::Member(Box::new(MemberExpr {
            object,
            property: CompactString::new(""),
            property_span: Span::new(end, end),
            optional,
            computed: true,
            computed_index: Some(index),
            span,
        }))
    }

    fn parse_primary(&mut self) -> Expr {
        match &self.current.kind {
            TokenKind::Ident(name) => {
                if self.next_kind() == TokenKind::Arrow {
                    return self.parse_arrow_from_ident();
                }
                let ident = Ident::new(name.clone(), self.current.span);
                self.bump();
                Expr::Ident(ident)
            }
            TokenKind::Number(value) => {
                let lit = NumberLit {
                    value: *value,
                    span: self.current.span,
                };
                self.bump();
                Expr::Number(lit)
            }
            TokenKind::Str(value) => {
                let lit = StringLit {
                    value: value.clone(),
                    span: self.current.span,
                };
                self.bump();
                Expr::Str(lit)
            }
            TokenKind::True | TokenKind::False => {
                let lit = BoolLit {
                    value: self.current.kind == TokenKind::True,
                    span: self.current.span,
                };
                self.bump();
                Expr::Bool(lit)
            }
            TokenKind::Null => {
                let span = self.bump().span;
                Expr::Null(span)
            }
            TokenKind::LParen => {
                if self.paren_starts_arrow() {
                    self.parse_arrow_from_paren()
                } else {
                    let start = self.bump().span.start;
                    let inner = self.parse_expr();
                    let end = self.expect(TokenKind::RParen, "`)`").end;
                    Expr::Paren(Box::new(ParenExpr {
                        expr: inner,
                        span: Span::new(start, end),
                    }))
                }
            }
            TokenKind::Function => {
                let start = self.bump().span.start;
                let name = if matches!(self.current.kind, TokenKind::Ident(_)) {
                    Some(self.expect_ident("function name"))
                } else {
                    None
                };
                let params = self.parse_params();
                let body = self.parse_block();
                let span = Span::new(start, body.span.end);
                Expr::Func(Box::new(FuncExpr {
                    name,
                    params,
                    body,
                    span,
                }))
            }
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::Lt => self.parse_jsx_expr(),
            _ => {
                let span = self.current.span;
                self.error("unexpected token in expression", span);
                self.bump();
                Expr::Null(span)
            }
        }
    }

    fn parse_object_literal(&mut self) -> Expr {
        let start = self.bump().span.start;
        let mut props = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at(&TokenKind::Eof) {
            if self.at(&TokenKind::Ellipsis) {
                let spread_start = self.bump().span.start;
                let expr = self.parse_assign();
                let span = Span::new(spread_start, expr.span().end);
                props.push(ObjectProp::Spread { expr, span });
            } else {
                let key = self.expect_ident("property key");
                if self.eat(TokenKind::Colon) {
                    let value = self.parse_assign();
                    let span = Span::new(key.span.start, value.span().end);
                    props.push(ObjectProp::KeyValue {
                        key: key.name,
                        value,
                        span,
                    });
                } else {
                    props.push(ObjectProp::Shorthand(key));
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "`}` after object").end;
        Expr::Object(ObjectLit {
            props,
            span: Span::new(start, end),
        })
    }

    fn parse_array_literal(&mut self) -> Expr {
        let start = self.bump().span.start;
        let mut elements = Vec::new();
        while !self.at(&TokenKind::RBracket) && !self.at(&TokenKind::Eof) {
            elements.push(self.parse_assign());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket, "`]` after array").end;
        Expr::Array(ArrayLit {
            elements,
            span: Span::new(start, end),
        })
    }

    // ---- arrows --------------------------------------------------------

    fn parse_arrow_from_ident(&mut self) -> Expr {
        let param = self.expect_ident("parameter");
        let start = param.span.start;
        self.expect(TokenKind::Arrow, "`=>`");
        let (body, end) = self.parse_arrow_body();
        Expr::Arrow(Box::new(ArrowExpr {
            params: vec![Pattern::Ident(param)],
            body,
            span: Span::new(start, end),
        }))
    }

    fn parse_arrow_from_paren(&mut self) -> Expr {
        let start = self.current.span.start;
        let params = self.parse_params();
        self.expect(TokenKind::Arrow, "`=>`");
        let (body, end) = self.parse_arrow_body();
        Expr::Arrow(Box::new(ArrowExpr {
            params,
            body,
            span: Span::new(start, end),
        }))
    }

    fn parse_arrow_body(&mut self) -> (ArrowBody, u32) {
        if self.at(&TokenKind::LBrace) {
            let block = self.parse_block();
            let end = block.span.end;
            (ArrowBody::Block(block), end)
        } else {
            let expr = self.parse_assign();
            let end = expr.span().end;
            (ArrowBody::Expr(expr), end)
        }
    }

    /// Whether the `(` at `current` opens arrow parameters.
    ///
    /// Scans ahead for the matching `)` and checks for `=>`; cheap because
    /// the probe lexer is just a cursor over the same source.
    fn paren_starts_arrow(&self) -> bool {
        let mut probe = self.lexer.clone();
        let mut depth = 1usize;
        loop {
            let tok = probe.next_token();
            match tok.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return probe.next_token().kind == TokenKind::Arrow;
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
        }
    }

    // ---- JSX -----------------------------------------------------------

    /// Parse a JSX element or fragment appearing in expression position.
    /// `current` must be `<`.
    fn parse_jsx_expr(&mut self) -> Expr {
        let (node, end) = self.parse_jsx_node();
        // Re-enter token mode after the subtree
        self.lexer.set_pos(end);
        self.bump();
        match node {
            JsxChild::Element(el) => Expr::Jsx(Box::new(el)),
            JsxChild::Fragment(frag) => Expr::JsxFragment(Box::new(frag)),
            // parse_jsx_node only produces elements and fragments
            _ => Expr::Null(Span::new(end as u32, end as u32)),
        }
    }

    /// Parse one JSX element/fragment starting at `current == Lt`.
    ///
    /// Returns the node and the byte offset just past it. The token stream
    /// is stale on return; callers must reposition the lexer.
    fn parse_jsx_node(&mut self) -> (JsxChild, usize) {
        let start = self.bump().span.start; // past `<`

        if self.at(&TokenKind::Gt) {
            // Fragment: <>children</>
            let children_start = self.current.span.end as usize;
            let (children, end) = self.parse_jsx_children(children_start, None);
            return (
                JsxChild::Fragment(JsxFragment {
                    children,
                    span: Span::new(start, end as u32),
                }),
                end,
            );
        }

        let name = self.expect_ident("JSX element name");
        let mut attrs = Vec::new();

        loop {
            match &self.current.kind {
                TokenKind::Ident(attr_name) => {
                    let attr_start = self.current.span.start;
                    let attr_name = attr_name.clone();
                    let name_end = self.current.span.end;
                    self.bump();
                    let (value, attr_end) = if self.eat(TokenKind::Eq) {
                        match &self.current.kind {
                            TokenKind::Str(text) => {
                                let lit = StringLit {
                                    value: text.clone(),
                                    span: self.current.span,
                                };
                                let end = self.current.span.end;
                                self.bump();
                                (Some(JsxAttrValue::Str(lit)), end)
                            }
                            TokenKind::LBrace => {
                                let brace_start = self.bump().span.start;
                                let expr = self.parse_assign();
                                let end = if self.at(&TokenKind::RBrace) {
                                    let end = self.current.span.end;
                                    self.bump();
                                    end
                                } else {
                                    self.error(
                                        "expected `}` after attribute expression",
                                        self.current.span,
                                    );
                                    expr.span().end
                                };
                                (
                                    Some(JsxAttrValue::Expr(JsxExprContainer {
                                        expr,
                                        span: Span::new(brace_start, end),
                                    })),
                                    end,
                                )
                            }
                            _ => {
                                self.error("expected JSX attribute value", self.current.span);
                                (None, name_end)
                            }
                        }
                    } else {
                        (None, name_end)
                    };
                    attrs.push(JsxAttr {
                        name: attr_name,
                        value,
                        span: Span::new(attr_start, attr_end),
                    });
                }
                TokenKind::Slash => {
                    self.bump();
                    let end = self.expect(TokenKind::Gt, "`>` after `/`").end;
                    return (
                        JsxChild::Element(JsxElement {
                            name: name.name,
                            name_span: name.span,
                            attrs,
                            children: Vec::new(),
                            self_closing: true,
                            span: Span::new(start, end),
                        }),
                        end as usize,
                    );
                }
                TokenKind::Gt => {
                    let children_start = self.current.span.end as usize;
                    let (children, end) =
                        self.parse_jsx_children(children_start, Some(name.name.as_str()));
                    return (
                        JsxChild::Element(JsxElement {
                            name: name.name.clone(),
                            name_span: name.span,
                            attrs,
                            children,
                            self_closing: false,
                            span: Span::new(start, end as u32),
                        }),
                        end,
                    );
                }
                _ => {
                    self.error("unexpected token in JSX element", self.current.span);
                    let end = self.current.span.end;
                    return (
                        JsxChild::Element(JsxElement {
                            name: name.name,
                            name_span: name.span,
                            attrs,
                            children: Vec::new(),
                            self_closing: true,
                            span: Span::new(start, end),
                        }),
                        end as usize,
                    );
                }
            }
        }
    }

    /// Character-level scan of JSX children starting at `pos`.
    ///
    /// `closing` is the expected element name, or `None` for a fragment.
    /// Returns the children and the offset just past the closing tag.
    fn parse_jsx_children(&mut self, mut pos: usize, closing: Option<&str>) -> (Vec<JsxChild>, usize) {
        let source = self.lexer.source();
        let mut children = Vec::new();

        loop {
            if pos >= source.len() {
                self.error(
                    "unterminated JSX element",
                    Span::new(pos as u32, pos as u32),
                );
                return (children, source.len());
            }
            let rest = &source[pos..];

            if rest.starts_with("</") {
                let mut p = skip_jsx_ws(source, pos + 2);
                let (name_end, name) = scan_jsx_name(source, p);
                p = skip_jsx_ws(source, name_end);
                if source[p..].starts_with('>') {
                    p += 1;
                } else {
                    self.error("expected `>` in closing tag", Span::new(p as u32, p as u32));
                }
                let expected = closing.unwrap_or("");
                if name != expected {
                    self.error(
                        format!("mismatched closing tag `</{name}>`"),
                        Span::new(pos as u32, p as u32),
                    );
                }
                return (children, p);
            }

            if rest.starts_with('<') {
                self.lexer.set_pos(pos);
                self.bump();
                let (child, end) = self.parse_jsx_node();
                children.push(child);
                pos = end;
                continue;
            }

            if rest.starts_with('{') {
                self.lexer.set_pos(pos + 1);
                self.bump();
                let expr = self.parse_assign();
                let end = if self.at(&TokenKind::RBrace) {
                    self.current.span.end as usize
                } else {
                    self.error("expected `}` in JSX expression", self.current.span);
                    expr.span().end as usize
                };
                children.push(JsxChild::Expr(JsxExprContainer {
                    span: Span::new(pos as u32, end as u32),
                    expr,
                }));
                pos = end;
                continue;
            }

            // Text run up to the next `<` or `{`
            let stop = rest
                .char_indices()
                .find(|&(_, ch)| ch == '<' || ch == '{')
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            let text = &rest[..stop];
            if !text.trim().is_empty() {
                children.push(JsxChild::Text(JsxText {
                    value: CompactString::new(text),
                    span: Span::new(pos as u32, (pos + stop) as u32),
                }));
            }
            pos += stop;
        }
    }
}

fn skip_jsx_ws(source: &str, mut pos: usize) -> usize {
    while pos < source.len() && source.as_bytes()[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn scan_jsx_name(source: &str, pos: usize) -> (usize, &str) {
    let mut end = pos;
    let bytes = source.as_bytes();
    while end < source.len()
        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'$')
    {
        end += 1;
    }
    (end, &source[pos..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Program {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        program
    }

    #[test]
    fn test_parse_creator_declaration() {
        let program = parse_ok("const countSignal = signal(0);");
        assert_eq!(program.body.len(), 1);
        let Stmt::Var(var) = &program.body[0] else {
            panic!("expected var decl");
        };
        assert_eq!(var.kind, VarKind::Const);
        let decl = &var.declarators[0];
        assert_eq!(decl.pattern.bound_names(), vec!["countSignal"]);
        let Some(Expr::Call(call)) = &decl.init else {
            panic!("expected call initializer");
        };
        let Expr::Ident(callee) = &call.callee else {
            panic!("expected ident callee");
        };
        assert_eq!(callee.name.as_str(), "signal");
    }

    #[test]
    fn test_parse_import_forms() {
        let program = parse_ok(
            "import { signal as s, computed } from '@preact/signals';\n\
             import * as signals from '@preact/signals-core';\n\
             import preact from 'preact';\n\
             import 'side-effect';",
        );
        assert_eq!(program.body.len(), 4);
        let Stmt::Import(first) = &program.body[0] else {
            panic!("expected import");
        };
        assert_eq!(first.source.as_str(), "@preact/signals");
        assert_eq!(first.specifiers.len(), 2);
        assert!(matches!(
            &first.specifiers[0],
            ImportSpecifier::Named { imported, local, .. }
                if imported.as_str() == "signal" && local.as_str() == "s"
        ));
        let Stmt::Import(second) = &program.body[1] else {
            panic!("expected import");
        };
        assert!(matches!(
            &second.specifiers[0],
            ImportSpecifier::Namespace { local, .. } if local.as_str() == "signals"
        ));
    }

    #[test]
    fn test_parse_member_assignment() {
        let program = parse_ok("countSignal.value = 1;");
        let Stmt::Expr(stmt) = &program.body[0] else {
            panic!("expected expr stmt");
        };
        let Expr::Assign(assign) = &stmt.expr else {
            panic!("expected assignment");
        };
        let Expr::Member(member) = &assign.target else {
            panic!("expected member target");
        };
        assert_eq!(member.property.as_str(), "value");
        assert!(!member.optional);
    }

    #[test]
    fn test_parse_optional_chain() {
        let program = parse_ok("x?.value;");
        let Stmt::Expr(stmt) = &program.body[0] else {
            panic!("expected expr stmt");
        };
        let Expr::Member(member) = &stmt.expr else {
            panic!("expected member");
        };
        assert!(member.optional);
    }

    #[test]
    fn test_parse_function_and_return() {
        let program = parse_ok("function useThing() { return signal(0); }");
        let Stmt::Func(func) = &program.body[0] else {
            panic!("expected function");
        };
        assert_eq!(func.name.name.as_str(), "useThing");
        assert!(matches!(func.body.body[0], Stmt::Return(_)));
    }

    #[test]
    fn test_parse_arrow_forms() {
        let program = parse_ok("const f = () => 1; const g = x => x + 1; const h = (a, b) => { return a; };");
        assert_eq!(program.body.len(), 3);
        for stmt in &program.body {
            let Stmt::Var(var) = stmt else {
                panic!("expected var");
            };
            assert!(matches!(var.declarators[0].init, Some(Expr::Arrow(_))));
        }
    }

    #[test]
    fn test_parse_effect_callback() {
        let program = parse_ok("effect(() => { countSignal.value; });");
        let Stmt::Expr(stmt) = &program.body[0] else {
            panic!("expected expr stmt");
        };
        let Expr::Call(call) = &stmt.expr else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 1);
        assert!(matches!(call.args[0], Expr::Arrow(_)));
    }

    #[test]
    fn test_parse_jsx_element() {
        let program = parse_ok(
            "function App() { return <div class=\"box\" title={name.value}>Count: {count}</div>; }",
        );
        let Stmt::Func(func) = &program.body[0] else {
            panic!("expected function");
        };
        let Stmt::Return(ret) = &func.body.body[0] else {
            panic!("expected return");
        };
        let Some(Expr::Jsx(el)) = &ret.arg else {
            panic!("expected JSX, got {:?}", ret.arg);
        };
        assert_eq!(el.name.as_str(), "div");
        assert_eq!(el.attrs.len(), 2);
        assert!(matches!(el.attrs[0].value, Some(JsxAttrValue::Str(_))));
        assert!(matches!(el.attrs[1].value, Some(JsxAttrValue::Expr(_))));
        // Text child plus expression container
        assert_eq!(el.children.len(), 2);
        assert!(matches!(el.children[0], JsxChild::Text(_)));
        assert!(matches!(el.children[1], JsxChild::Expr(_)));
    }

    #[test]
    fn test_parse_nested_jsx() {
        let program = parse_ok("const view = <ul>{items}<li>first</li><Badge count={n} /></ul>;");
        let Stmt::Var(var) = &program.body[0] else {
            panic!("expected var");
        };
        let Some(Expr::Jsx(el)) = &var.declarators[0].init else {
            panic!("expected JSX");
        };
        assert_eq!(el.children.len(), 3);
        assert!(matches!(&el.children[1], JsxChild::Element(li) if li.name.as_str() == "li"));
        assert!(
            matches!(&el.children[2], JsxChild::Element(badge) if badge.self_closing && badge.name.as_str() == "Badge")
        );
    }

    #[test]
    fn test_parse_jsx_fragment() {
        let program = parse_ok("const view = <>{a}{b}</>;");
        let Stmt::Var(var) = &program.body[0] else {
            panic!("expected var");
        };
        assert!(matches!(
            var.declarators[0].init,
            Some(Expr::JsxFragment(_))
        ));
    }

    #[test]
    fn test_parse_destructuring() {
        let program = parse_ok("const { a, b: c } = box; const [x, y] = pair;");
        let Stmt::Var(first) = &program.body[0] else {
            panic!("expected var");
        };
        assert_eq!(first.declarators[0].pattern.bound_names(), vec!["a", "c"]);
        let Stmt::Var(second) = &program.body[1] else {
            panic!("expected var");
        };
        assert_eq!(second.declarators[0].pattern.bound_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_parse_object_literal_with_spread() {
        let program = parse_ok("const all = { count: countSignal, ...rest, flag };");
        let Stmt::Var(var) = &program.body[0] else {
            panic!("expected var");
        };
        let Some(Expr::Object(obj)) = &var.declarators[0].init else {
            panic!("expected object literal");
        };
        assert_eq!(obj.props.len(), 3);
        assert!(matches!(obj.props[1], ObjectProp::Spread { .. }));
        assert!(matches!(obj.props[2], ObjectProp::Shorthand(_)));
    }

    #[test]
    fn test_parse_update_expressions() {
        let program = parse_ok("count.value++; --n;");
        let Stmt::Expr(first) = &program.body[0] else {
            panic!("expected expr");
        };
        assert!(matches!(&first.expr, Expr::Update(u) if !u.prefix));
        let Stmt::Expr(second) = &program.body[1] else {
            panic!("expected expr");
        };
        assert!(matches!(&second.expr, Expr::Update(u) if u.prefix));
    }

    #[test]
    fn test_parse_export_default_function() {
        let program = parse_ok("export default function App() { return null; }");
        assert!(matches!(program.body[0], Stmt::Func(_)));
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let (_, errors) = parse("const = 1;");
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_relational_lt_is_not_jsx() {
        let program = parse_ok("const ok = a < b;");
        let Stmt::Var(var) = &program.body[0] else {
            panic!("expected var");
        };
        assert!(matches!(
            var.declarators[0].init,
            Some(Expr::Binary(ref b)) if b.op == BinaryOp::Lt
        ));
    }
}
