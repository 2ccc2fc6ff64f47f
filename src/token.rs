//! Token kinds, payloads, and the fixed keyword table.

use crate::source::SourceLocation;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// A tagged token kind together with any payload it carries (spec §3.2).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Structural
    Eof,
    Error(String),

    // Literals
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
    CharLiteral(char),
    True,
    False,

    Identifier(String),

    // Keywords
    Package,
    Import,
    As,
    Pub,
    Priv,
    Fn,
    Struct,
    Enum,
    Extern,
    Let,
    Const,
    Mut,
    If,
    Else,
    For,
    In,
    Return,
    Break,
    Continue,
    Match,
    Spawn,
    Unsafe,
    Sizeof,
    Impl,
    KwSelf,
    SpawnWithHandle,
    Await,
    /// Reserved; type aliases are not yet implemented (spec §6).
    Type,

    // Type keywords
    TyInt,
    TyFloat,
    TyBool,
    TyString,
    TyVoid,
    TyNone,
    TyUsize,
    TyIsize,
    TyU8,
    TyU16,
    TyU32,
    TyU64,
    TyI8,
    TyI16,
    TyI32,
    TyI64,
    TyU128,
    TyI128,
    TyF32,
    TyF64,
    TyResult,
    TyOption,
    TyTaskHandle,
    TyNever,

    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    AmpAmp,
    PipePipe,
    Pipe,
    Caret,
    Amp,
    Bang,
    Tilde,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LtLt,
    GtGt,
    Eq,
    Arrow,
    FatArrow,
    Dot,
    ColonColon,
    Colon,
    Semicolon,
    Comma,
    Ellipsis,
    Hash,
    At,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A single lexed token: its kind and the location of its first byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.kind, self.location)
    }
}

/// Fixed keyword table, built once per process. Lookup is exact
/// length+bytes match against identifier text, performed by the lexer
/// after it has already scanned a full identifier-shaped run.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    let mut m = HashMap::new();
    m.insert("package", Package);
    m.insert("import", Import);
    m.insert("as", As);
    m.insert("pub", Pub);
    m.insert("priv", Priv);
    m.insert("fn", Fn);
    m.insert("struct", Struct);
    m.insert("enum", Enum);
    m.insert("extern", Extern);
    m.insert("let", Let);
    m.insert("const", Const);
    m.insert("mut", Mut);
    m.insert("if", If);
    m.insert("else", Else);
    m.insert("for", For);
    m.insert("in", In);
    m.insert("return", Return);
    m.insert("break", Break);
    m.insert("continue", Continue);
    m.insert("match", Match);
    m.insert("spawn", Spawn);
    m.insert("unsafe", Unsafe);
    m.insert("sizeof", Sizeof);
    m.insert("impl", Impl);
    m.insert("self", KwSelf);
    m.insert("true", True);
    m.insert("false", False);
    m.insert("spawn_with_handle", SpawnWithHandle);
    m.insert("await", Await);
    m.insert("type", Type);

    m.insert("int", TyInt);
    m.insert("float", TyFloat);
    m.insert("bool", TyBool);
    m.insert("string", TyString);
    m.insert("void", TyVoid);
    m.insert("none", TyNone);
    m.insert("usize", TyUsize);
    m.insert("isize", TyIsize);
    m.insert("u8", TyU8);
    m.insert("u16", TyU16);
    m.insert("u32", TyU32);
    m.insert("u64", TyU64);
    m.insert("i8", TyI8);
    m.insert("i16", TyI16);
    m.insert("i32", TyI32);
    m.insert("i64", TyI64);
    m.insert("u128", TyU128);
    m.insert("i128", TyI128);
    m.insert("f32", TyF32);
    m.insert("f64", TyF64);
    m.insert("Result", TyResult);
    m.insert("Option", TyOption);
    m.insert("TaskHandle", TyTaskHandle);
    m.insert("Never", TyNever);
    m
});

/// Look up a scanned identifier against the keyword table. Returns the
/// matching keyword `TokenKind`, or `None` if `text` is an ordinary
/// identifier.
pub fn lookup_keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS.get(text).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_keyword() {
        assert_eq!(lookup_keyword("fn"), Some(TokenKind::Fn));
    }

    #[test]
    fn none_is_distinct_from_void() {
        assert_eq!(lookup_keyword("none"), Some(TokenKind::TyNone));
        assert_eq!(lookup_keyword("void"), Some(TokenKind::TyVoid));
        assert_ne!(lookup_keyword("none"), lookup_keyword("void"));
    }

    #[test]
    fn ordinary_identifier_is_not_a_keyword() {
        assert_eq!(lookup_keyword("foobar"), None);
    }
}
