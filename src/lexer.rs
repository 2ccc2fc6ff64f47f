//! Byte-level scanner: turns a source buffer into a stream of [`Token`]s.
//!
//! Single-threaded, no suspension (spec §5). The lexer owns no resources
//! beyond the source buffer it borrows and the owned payload bytes of
//! whichever token it most recently produced.

use crate::source::{SourceBuffer, SourceId, SourceLocation};
use crate::token::{lookup_keyword, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugLevel {
    None,
    Verbose,
}

/// Scans UTF-8 source bytes into tokens with one-token lookahead.
///
/// Mirrors the teacher's `Code`/`Tokenizer` split: the byte buffer is
/// borrowed (never owned, never freed here), and line/column resolution
/// is delegated to [`SourceBuffer`].
pub struct Lexer<'src> {
    buffer: SourceBuffer<'src>,
    pos: usize,
    peeked: Option<Token>,
    debug: DebugLevel,
}

impl<'src> Lexer<'src> {
    pub fn new(file: impl Into<String>, source: &'src [u8]) -> Self {
        Self {
            buffer: SourceBuffer::new(SourceId::new(file.into()), source),
            pos: 0,
            peeked: None,
            debug: DebugLevel::None,
        }
    }

    pub fn with_debug(mut self, level: DebugLevel) -> Self {
        self.debug = level;
        self
    }

    fn bytes(&self) -> &'src [u8] {
        self.buffer.bytes
    }

    fn loc_at(&self, offset: usize) -> SourceLocation {
        self.buffer.locate(offset)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn peek_byte_at(&self, delta: usize) -> Option<u8> {
        self.bytes().get(self.pos + delta).copied()
    }

    fn advance_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b) if b == b' ' || b == b'\t' || b == b'\r' || b == b'\n' => {
                    self.pos += 1;
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    self.pos += 2;
                    while !(self.peek_byte() == Some(b'*') && self.peek_byte_at(1) == Some(b'/')) {
                        if self.peek_byte().is_none() {
                            break;
                        }
                        self.pos += 1;
                    }
                    if self.peek_byte().is_some() {
                        self.pos += 2;
                    }
                }
                _ => break,
            }
        }
    }

    /// Return the next token without consuming it.
    pub fn peek(&mut self) -> Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.scan());
        }
        self.peeked.clone().unwrap()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> Token {
        if let Some(tok) = self.peeked.take() {
            if self.debug == DebugLevel::Verbose {
                println!("lexer: {tok}");
            }
            return tok;
        }
        let tok = self.scan();
        if self.debug == DebugLevel::Verbose {
            println!("lexer: {tok}");
        }
        tok
    }

    /// Save the current scan position so the parser can restore it later
    /// (spec §9, generic-argument backtracking checkpoints).
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: self.pos,
            peeked: self.peeked.clone(),
        }
    }

    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.pos = checkpoint.pos;
        self.peeked = checkpoint.peeked;
    }

    fn scan(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let start_loc = self.loc_at(start);
        let Some(b) = self.peek_byte() else {
            return Token::new(TokenKind::Eof, start_loc);
        };

        // Checked ahead of `is_ident_start`: 'r' is itself a valid identifier
        // start byte, so the raw-string prefix must be special-cased here or
        // it is never reached (spec §4.1, raw multi-line strings).
        if b == b'r'
            && self.peek_byte_at(1) == Some(b'"')
            && self.peek_byte_at(2) == Some(b'"')
            && self.peek_byte_at(3) == Some(b'"')
        {
            self.pos += 1;
            return self.scan_raw_multiline_string(start, start_loc);
        }
        if is_ident_start(b) {
            return self.scan_identifier_or_keyword(start, start_loc);
        }
        if b.is_ascii_digit() {
            return self.scan_number(start, start_loc);
        }
        match b {
            b'"' => self.scan_string(start, start_loc),
            b'\'' => self.scan_char(start, start_loc),
            _ => self.scan_operator(start, start_loc),
        }
    }

    fn scan_identifier_or_keyword(&mut self, start: usize, loc: SourceLocation) -> Token {
        while self.peek_byte().map_or(false, is_ident_continue) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.bytes()[start..self.pos]).unwrap();
        let kind = lookup_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token::new(kind, loc)
    }

    fn scan_number(&mut self, start: usize, loc: SourceLocation) -> Token {
        if self.peek_byte() == Some(b'0') {
            match self.peek_byte_at(1) {
                Some(b'x') | Some(b'X') => return self.scan_radix_int(start, loc, 16, 2),
                Some(b'o') | Some(b'O') => return self.scan_radix_int(start, loc, 8, 2),
                Some(b'b') | Some(b'B') => return self.scan_radix_int(start, loc, 2, 2),
                _ => {}
            }
        }
        while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek_byte() == Some(b'.') && self.peek_byte_at(1).map_or(false, |b| b.is_ascii_digit()) {
            is_float = true;
            self.pos += 1;
            while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
                is_float = true;
                while self.peek_byte().map_or(false, |b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = save;
            }
        }
        let text = std::str::from_utf8(&self.bytes()[start..self.pos]).unwrap();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => Token::new(TokenKind::FloatLiteral(v), loc),
                Err(_) => Token::new(TokenKind::Error(format!("bad float literal '{text}'")), loc),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => Token::new(TokenKind::IntegerLiteral(v), loc),
                Err(_) => Token::new(TokenKind::Error(format!("integer literal '{text}' out of range")), loc),
            }
        }
    }

    fn scan_radix_int(&mut self, start: usize, loc: SourceLocation, radix: u32, prefix_len: usize) -> Token {
        self.pos += prefix_len;
        let digits_start = self.pos;
        while self.peek_byte().map_or(false, |b| (b as char).is_digit(radix)) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            return Token::new(TokenKind::Error("malformed numeric literal".into()), loc);
        }
        let text = std::str::from_utf8(&self.bytes()[digits_start..self.pos]).unwrap();
        match i64::from_str_radix(text, radix) {
            Ok(v) => Token::new(TokenKind::IntegerLiteral(v), loc),
            Err(_) => {
                let _ = start;
                Token::new(TokenKind::Error(format!("integer literal '{text}' out of range")), loc)
            }
        }
    }

    fn scan_string(&mut self, start: usize, loc: SourceLocation) -> Token {
        // Triple-quote forms (regular-escaped multi-line) vs single regular string.
        if self.peek_byte_at(1) == Some(b'"') && self.peek_byte_at(2) == Some(b'"') {
            self.pos += 3;
            return self.scan_multiline_string(start, loc, true);
        }
        self.pos += 1; // opening quote
        let mut out = String::new();
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    return Token::new(TokenKind::Error("unterminated string literal".into()), loc);
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => match self.scan_escape() {
                    Ok(c) => out.push(c),
                    Err(msg) => return Token::new(TokenKind::Error(msg), loc),
                },
                Some(_) => {
                    let ch_start = self.pos;
                    let ch = self.next_char();
                    let _ = ch_start;
                    out.push(ch);
                }
            }
        }
        let _ = start;
        Token::new(TokenKind::StringLiteral(out), loc)
    }

    fn scan_multiline_string(&mut self, start: usize, loc: SourceLocation, process_escapes: bool) -> Token {
        let mut out = String::new();
        loop {
            if self.peek_byte() == Some(b'"') && self.peek_byte_at(1) == Some(b'"') && self.peek_byte_at(2) == Some(b'"') {
                self.pos += 3;
                let _ = start;
                return Token::new(TokenKind::StringLiteral(out), loc);
            }
            match self.peek_byte() {
                None => return Token::new(TokenKind::Error("unterminated string literal".into()), loc),
                Some(b'\\') if process_escapes => match self.scan_escape() {
                    Ok(c) => out.push(c),
                    Err(msg) => return Token::new(TokenKind::Error(msg), loc),
                },
                Some(_) => out.push(self.next_char()),
            }
        }
    }

    fn scan_raw_multiline_string(&mut self, start: usize, loc: SourceLocation) -> Token {
        self.pos += 3; // past opening """; the leading `r` was already consumed by caller
        let mut out = String::new();
        loop {
            if self.peek_byte() == Some(b'"') && self.peek_byte_at(1) == Some(b'"') && self.peek_byte_at(2) == Some(b'"') {
                self.pos += 3;
                let _ = start;
                return Token::new(TokenKind::StringLiteral(out), loc);
            }
            match self.peek_byte() {
                None => return Token::new(TokenKind::Error("unterminated raw string literal".into()), loc),
                Some(_) => out.push(self.next_char()),
            }
        }
    }

    fn scan_char(&mut self, start: usize, loc: SourceLocation) -> Token {
        self.pos += 1; // opening quote
        let c = match self.peek_byte() {
            Some(b'\\') => match self.scan_escape() {
                Ok(c) => c,
                Err(msg) => return Token::new(TokenKind::Error(msg), loc),
            },
            Some(_) => self.next_char(),
            None => return Token::new(TokenKind::Error("unterminated char literal".into()), loc),
        };
        if self.peek_byte() != Some(b'\'') {
            return Token::new(TokenKind::Error("unterminated char literal".into()), loc);
        }
        self.pos += 1;
        let _ = start;
        Token::new(TokenKind::CharLiteral(c), loc)
    }

    /// Consume `\` plus its escape body, returning the decoded character.
    fn scan_escape(&mut self) -> Result<char, String> {
        self.pos += 1; // backslash
        match self.advance_byte() {
            Some(b'n') => Ok('\n'),
            Some(b't') => Ok('\t'),
            Some(b'r') => Ok('\r'),
            Some(b'\\') => Ok('\\'),
            Some(b'"') => Ok('"'),
            Some(b'\'') => Ok('\''),
            Some(b'0') => Ok('\0'),
            Some(b'u') => {
                if self.peek_byte() != Some(b'{') {
                    return Err("bad unicode escape: expected '{'".into());
                }
                self.pos += 1;
                let digits_start = self.pos;
                while self.peek_byte().map_or(false, |b| (b as char).is_ascii_hexdigit()) {
                    self.pos += 1;
                }
                if self.peek_byte() != Some(b'}') {
                    return Err("bad unicode escape: expected '}'".into());
                }
                let text = std::str::from_utf8(&self.bytes()[digits_start..self.pos]).unwrap();
                self.pos += 1;
                let code = u32::from_str_radix(text, 16).map_err(|_| "bad unicode escape digits".to_string())?;
                char::from_u32(code).ok_or_else(|| "bad unicode escape: not a scalar value".to_string())
            }
            Some(other) => Err(format!("bad escape sequence '\\{}'", other as char)),
            None => Err("unterminated escape sequence".into()),
        }
    }

    /// Decode and consume one UTF-8 scalar value at the current position.
    fn next_char(&mut self) -> char {
        let rest = &self.bytes()[self.pos..];
        let s = std::str::from_utf8(rest).unwrap_or("\u{FFFD}");
        let c = s.chars().next().unwrap_or('\u{FFFD}');
        self.pos += c.len_utf8();
        c
    }

    fn scan_operator(&mut self, start: usize, loc: SourceLocation) -> Token {
        use TokenKind::*;
        let first = self.advance_byte().unwrap();
        let kind = match first {
            b'+' => Plus,
            b'-' => {
                if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    Arrow
                } else {
                    Minus
                }
            }
            b'*' => Star,
            b'/' => Slash,
            b'%' => Percent,
            b'&' => {
                if self.peek_byte() == Some(b'&') {
                    self.pos += 1;
                    AmpAmp
                } else {
                    Amp
                }
            }
            b'|' => {
                if self.peek_byte() == Some(b'|') {
                    self.pos += 1;
                    PipePipe
                } else {
                    Pipe
                }
            }
            b'^' => Caret,
            b'!' => {
                if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    BangEq
                } else {
                    Bang
                }
            }
            b'~' => Tilde,
            b'=' => {
                if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    EqEq
                } else if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    FatArrow
                } else {
                    Eq
                }
            }
            b'<' => {
                if self.peek_byte() == Some(b'<') {
                    self.pos += 1;
                    LtLt
                } else if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    LtEq
                } else {
                    Lt
                }
            }
            b'>' => {
                if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    GtGt
                } else if self.peek_byte() == Some(b'=') {
                    self.pos += 1;
                    GtEq
                } else {
                    Gt
                }
            }
            b'.' => {
                if self.peek_byte() == Some(b'.') && self.peek_byte_at(1) == Some(b'.') {
                    self.pos += 2;
                    Ellipsis
                } else {
                    Dot
                }
            }
            b':' => {
                if self.peek_byte() == Some(b':') {
                    self.pos += 1;
                    ColonColon
                } else {
                    Colon
                }
            }
            b';' => Semicolon,
            b',' => Comma,
            b'#' => Hash,
            b'@' => At,
            b'(' => LParen,
            b')' => RParen,
            b'[' => LBracket,
            b']' => RBracket,
            b'{' => LBrace,
            b'}' => RBrace,
            other => return Token::new(TokenKind::Error(format!("invalid byte 0x{other:02x}")), loc),
        };
        let _ = start;
        Token::new(kind, loc)
    }
}

#[derive(Debug, Clone)]
pub struct LexerCheckpoint {
    pos: usize,
    peeked: Option<Token>,
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_continue(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new("t.asthra", src.as_bytes());
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token();
            let done = tok.is_eof();
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_keywords_and_identifiers() {
        assert_eq!(
            kinds("pub fn main"),
            vec![TokenKind::Pub, TokenKind::Fn, TokenKind::Identifier("main".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn true_false_are_keywords_not_identifiers() {
        assert_eq!(kinds("true"), vec![TokenKind::True, TokenKind::Eof]);
        assert_eq!(kinds("false"), vec![TokenKind::False, TokenKind::Eof]);
    }

    #[test]
    fn lexes_hex_octal_binary_integers() {
        assert_eq!(kinds("0xFF"), vec![TokenKind::IntegerLiteral(255), TokenKind::Eof]);
        assert_eq!(kinds("0o17"), vec![TokenKind::IntegerLiteral(15), TokenKind::Eof]);
        assert_eq!(kinds("0b101"), vec![TokenKind::IntegerLiteral(5), TokenKind::Eof]);
    }

    #[test]
    fn lexes_float_with_exponent() {
        assert_eq!(kinds("1.5e2"), vec![TokenKind::FloatLiteral(150.0), TokenKind::Eof]);
    }

    #[test]
    fn lexes_regular_string_with_escapes() {
        assert_eq!(
            kinds(r#""hi\n""#),
            vec![TokenKind::StringLiteral("hi\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_unicode_escape() {
        assert_eq!(
            kinds(r#""\u{41}""#),
            vec![TokenKind::StringLiteral("A".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn unterminated_string_is_error_token() {
        let k = kinds("\"abc");
        assert!(matches!(k[0], TokenKind::Error(_)));
    }

    #[test]
    fn lexes_raw_multiline_string_without_escapes() {
        assert_eq!(
            kinds(r####"r"""a\nb""""####),
            vec![TokenKind::StringLiteral("a\\nb".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn lexes_char_literal() {
        assert_eq!(kinds("'a'"), vec![TokenKind::CharLiteral('a'), TokenKind::Eof]);
    }

    #[test]
    fn lexes_operators_longest_match_first() {
        assert_eq!(
            kinds("-> => == != <= >= << >> && || ::"),
            vec![
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::LtLt,
                TokenKind::GtGt,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::ColonColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            kinds("fn // comment\n/* block */ main"),
            vec![TokenKind::Fn, TokenKind::Identifier("main".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("t.asthra", b"fn main");
        let p1 = lexer.peek();
        let p2 = lexer.peek();
        assert_eq!(p1.kind, p2.kind);
        let n1 = lexer.next_token();
        assert_eq!(n1.kind, p1.kind);
        assert_eq!(lexer.next_token().kind, TokenKind::Identifier("main".into()));
    }

    #[test]
    fn checkpoint_restores_position() {
        let mut lexer = Lexer::new("t.asthra", b"fn main");
        let cp = lexer.checkpoint();
        let _ = lexer.next_token();
        let _ = lexer.next_token();
        lexer.restore(cp);
        assert_eq!(lexer.next_token().kind, TokenKind::Fn);
    }
}
