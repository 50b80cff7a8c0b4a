//! Tokens of the Groovy and Kotlin build-script subset.
//!
//! Both dialects share one token set; the parser decides what is legal
//! where. Whitespace and comments are skipped, newlines are kept because
//! they end statements.

use std::ops::Range;

use logos::Logos;

use super::diagnostics::DiagnosticCollector;
use crate::base::range_of;

#[derive(Logos, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"\\\r?\n")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum TokenKind {
    #[token("\n")]
    Newline,
    #[token(";")]
    Semicolon,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[regex(r"[+\-*/%<>!&|?^~]+")]
    Operator,

    #[token("def")]
    Def,
    #[token("val")]
    Val,
    #[token("var")]
    Var,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[regex(r"[0-9][0-9_]*[lL]?")]
    Integer,
    #[regex(r"[0-9][0-9_]*\.[0-9]+([eE][+-]?[0-9]+)?[fFdD]?")]
    Decimal,
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleString,
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleString,
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    #[regex(r"`[^`\n]+`")]
    Ident,
}

impl TokenKind {
    /// Tokens that end a statement.
    pub fn is_separator(self) -> bool {
        matches!(self, TokenKind::Newline | TokenKind::Semicolon)
    }

    pub fn opens(self) -> bool {
        matches!(self, TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket)
    }

    pub fn closes(self) -> bool {
        matches!(self, TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Splits `text` into tokens. Unrecognised characters are reported and
/// dropped.
pub fn tokenize(text: &str, diagnostics: &mut DiagnosticCollector) -> Vec<Token> {
    let mut lexer = TokenKind::lexer(text);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let span = lexer.span();
        match kind {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => diagnostics.invalid_token(range_of(span.clone()), &text[span]),
        }
    }
    tokens
}
