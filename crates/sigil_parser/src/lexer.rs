//! Hand-written lexer.
//!
//! On-demand: the parser pulls one token at a time and can reposition the
//! lexer to an absolute byte offset, which is how JSX text (lexed at the
//! character level by the parser) hands control back to token mode.

use compact_str::CompactString;
use sigil_ast::Span;

/// A single token with its source span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Whether a line terminator appeared between the previous token and
    /// this one (used for `return` / postfix-update handling)
    pub newline_before: bool,
}

impl Token {
    pub fn eof(offset: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(offset, offset),
            newline_before: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(CompactString),
    Number(f64),
    Str(CompactString),

    // Keywords
    Const,
    Let,
    Var,
    Function,
    Return,
    Import,
    Export,
    Default,
    If,
    Else,
    True,
    False,
    Null,
    TypeOf,
    Void,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Colon,
    Dot,
    Ellipsis,
    Arrow,
    Question,
    QuestionDot,
    QuestionQuestion,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    EqEq,
    EqEqEq,
    Neq,
    NeqEq,
    Plus,
    PlusPlus,
    PlusEq,
    Minus,
    MinusMinus,
    MinusEq,
    Star,
    StarEq,
    Slash,
    SlashEq,
    Percent,
    AmpAmp,
    PipePipe,
    Bang,

    /// Unrecognized character; the parser records an error for it
    Unknown(char),
    Eof,
}

impl TokenKind {
    /// Identifier text, when this token is an identifier
    pub fn ident(&self) -> Option<&str> {
        match self {
            Self::Ident(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Byte-oriented lexer over the full source
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset (start of the next unlexed token's scan)
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Reposition; used by the parser to re-enter token mode after reading
    /// JSX text at the character level
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.source.len());
    }

    #[inline]
    pub fn source(&self) -> &'s str {
        self.source
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(ahead)
    }

    #[inline]
    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    /// Skip whitespace and comments, reporting whether a newline was crossed
    fn skip_trivia(&mut self) -> bool {
        let mut newline = false;
        loop {
            match self.peek_char() {
                Some(ch) if ch.is_whitespace() => {
                    if ch == '\n' {
                        newline = true;
                    }
                    self.advance(ch);
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(ch) = self.peek_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance(ch);
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.pos += 2;
                    while self.pos < self.source.len() {
                        if self.source[self.pos..].starts_with("*/") {
                            self.pos += 2;
                            break;
                        }
                        if self.source[self.pos..].starts_with('\n') {
                            newline = true;
                        }
                        let ch = self.peek_char().unwrap();
                        self.advance(ch);
                    }
                }
                _ => break,
            }
        }
        newline
    }

    /// Lex the next token
    pub fn next_token(&mut self) -> Token {
        let newline_before = self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.peek_char() else {
            let mut tok = Token::eof(start as u32);
            tok.newline_before = newline_before;
            return tok;
        };

        let kind = if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' {
            self.lex_ident()
        } else if ch.is_ascii_digit() {
            self.lex_number()
        } else if ch == '"' || ch == '\'' {
            self.lex_string(ch)
        } else {
            self.lex_punct(ch)
        };

        Token {
            kind,
            span: Span::new(start as u32, self.pos as u32),
            newline_before,
        }
    }

    fn lex_ident(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                self.advance(ch);
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        match text {
            "const" => TokenKind::Const,
            "let" => TokenKind::Let,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "default" => TokenKind::Default,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "typeof" => TokenKind::TypeOf,
            "void" => TokenKind::Void,
            _ => TokenKind::Ident(CompactString::new(text)),
        }
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                self.advance(ch);
            } else {
                break;
            }
        }
        if self.peek_char() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance('.');
            while let Some(ch) = self.peek_char() {
                if ch.is_ascii_digit() {
                    self.advance(ch);
                } else {
                    break;
                }
            }
        }
        let text = &self.source[start..self.pos];
        TokenKind::Number(text.parse().unwrap_or(0.0))
    }

    fn lex_string(&mut self, quote: char) -> TokenKind {
        self.advance(quote);
        let mut value = String::new();
        while let Some(ch) = self.peek_char() {
            if ch == quote {
                self.advance(ch);
                break;
            }
            if ch == '\\' {
                self.advance(ch);
                if let Some(escaped) = self.peek_char() {
                    self.advance(escaped);
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        other => value.push(other),
                    }
                }
                continue;
            }
            value.push(ch);
            self.advance(ch);
        }
        TokenKind::Str(CompactString::new(&value))
    }

    fn lex_punct(&mut self, ch: char) -> TokenKind {
        let rest = &self.source[self.pos..];

        macro_rules! multi {
            ($text:literal, $kind:expr) => {
                if rest.starts_with($text) {
                    self.pos += $text.len();
                    return $kind;
                }
            };
        }

        multi!("...", TokenKind::Ellipsis);
        multi!("===", TokenKind::EqEqEq);
        multi!("!==", TokenKind::NeqEq);
        multi!("=>", TokenKind::Arrow);
        multi!("==", TokenKind::EqEq);
        multi!("!=", TokenKind::Neq);
        multi!("<=", TokenKind::Le);
        multi!(">=", TokenKind::Ge);
        multi!("&&", TokenKind::AmpAmp);
        multi!("||", TokenKind::PipePipe);
        multi!("??", TokenKind::QuestionQuestion);
        multi!("?.", TokenKind::QuestionDot);
        multi!("++", TokenKind::PlusPlus);
        multi!("--", TokenKind::MinusMinus);
        multi!("+=", TokenKind::PlusEq);
        multi!("-=", TokenKind::MinusEq);
        multi!("*=", TokenKind::StarEq);
        multi!("/=", TokenKind::SlashEq);

        self.advance(ch);
        match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '?' => TokenKind::Question,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '=' => TokenKind::Eq,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '!' => TokenKind::Bang,
            other => TokenKind::Unknown(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("const countSignal = signal(0)"),
            vec![
                TokenKind::Const,
                TokenKind::Ident("countSignal".into()),
                TokenKind::Eq,
                TokenKind::Ident("signal".into()),
                TokenKind::LParen,
                TokenKind::Number(0.0),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_optional_chain_tokens() {
        assert_eq!(
            kinds("a?.value ?? b"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::QuestionDot,
                TokenKind::Ident("value".into()),
                TokenKind::QuestionQuestion,
                TokenKind::Ident("b".into()),
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#"'a\'b'"#),
            vec![TokenKind::Str("a'b".into())]
        );
    }

    #[test]
    fn test_comments_and_newline_flag() {
        let mut lexer = Lexer::new("a // trailing\nb /* block */ c");
        let a = lexer.next_token();
        let b = lexer.next_token();
        let c = lexer.next_token();
        assert_eq!(a.kind, TokenKind::Ident("a".into()));
        assert!(!a.newline_before);
        assert_eq!(b.kind, TokenKind::Ident("b".into()));
        assert!(b.newline_before);
        assert_eq!(c.kind, TokenKind::Ident("c".into()));
        assert!(!c.newline_before);
    }

    #[test]
    fn test_set_pos_reenters_stream() {
        let mut lexer = Lexer::new("x + y");
        let _ = lexer.next_token();
        lexer.set_pos(0);
        assert_eq!(lexer.next_token().kind, TokenKind::Ident("x".into()));
    }
}
