//! Recursive-descent parser with Pratt-style precedence climbing for
//! expressions (spec §4.2). Consumes a [`Lexer`] and builds an [`ast::Node`]
//! tree, collecting diagnostics rather than raising exceptions.

mod annotations;
mod decls;
mod expr;
mod pattern;
mod stmt;
mod types;

use crate::ast::Node;
use crate::diagnostics::{Diagnostic, DiagnosticSink, RecoveryMode};
use crate::lexer::{DebugLevel, Lexer, LexerCheckpoint};
use crate::source::SourceLocation;
use crate::token::{Token, TokenKind};

/// Tokens after which permissive-mode recovery resumes parsing (spec
/// §4.2.8, §9 "Synchronization point").
const SYNC_TOKENS: &[fn(&TokenKind) -> bool] = &[
    |k| matches!(k, TokenKind::Pub),
    |k| matches!(k, TokenKind::Priv),
    |k| matches!(k, TokenKind::Impl),
    |k| matches!(k, TokenKind::Fn),
    |k| matches!(k, TokenKind::Struct),
    |k| matches!(k, TokenKind::Enum),
    |k| matches!(k, TokenKind::Extern),
    |k| matches!(k, TokenKind::Const),
    |k| matches!(k, TokenKind::Semicolon),
    |k| matches!(k, TokenKind::RBrace),
];

/// Caller-supplied configuration for a single parse (spec §6, "the core
/// exposes a callable"). There is no environment-variable or file-based
/// configuration layer; options are passed explicitly at the call site.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub file_name: String,
    pub recovery: RecoveryMode,
    pub debug: DebugLevel,
}

impl ParseOptions {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            recovery: RecoveryMode::Permissive,
            debug: DebugLevel::None,
        }
    }

    pub fn with_recovery(mut self, recovery: RecoveryMode) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_debug(mut self, debug: DebugLevel) -> Self {
        self.debug = debug;
        self
    }
}

/// Parse a complete source buffer into a program node plus whatever
/// diagnostics were collected. Returns `Err` only when strict mode
/// aborted before a program node could be produced at all.
pub fn parse_program(source: &str, options: ParseOptions) -> (Option<Node>, DiagnosticSink) {
    let mut parser = Parser::new(source, options);
    let program = parser.parse_program();
    (program, parser.sink)
}

/// Parser state: current/lookahead token, the sink, and the recovery
/// mode (spec §5, "a parser owns its lexer, a growing AST under
/// construction, and a diagnostics sink").
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    sink: DiagnosticSink,
    recovery: RecoveryMode,
    /// False while parsing the condition of `if`/`if let`/`match`'s
    /// scrutinee/`for`'s iterable, where a bare `{` must start the
    /// following block rather than a struct literal. Parenthesised or
    /// bracketed subexpressions reset it to `true`.
    struct_literal_allowed: bool,
}

/// A snapshot of both lexer and parser-visible cursor state, for the
/// sole bounded-lookahead ambiguity in the grammar (spec §4.2.5
/// "Generic type ambiguity", §9).
pub struct ParserCheckpoint {
    lexer: LexerCheckpoint,
    current: Token,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        let mut lexer = Lexer::new(options.file_name, source.as_bytes()).with_debug(options.debug);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            sink: DiagnosticSink::new(options.recovery),
            recovery: options.recovery,
            struct_literal_allowed: true,
        }
    }

    /// Parse `f` with struct-literal parsing temporarily allowed or
    /// suppressed, restoring the prior setting on the way out.
    fn with_struct_literal_allowed<T>(
        &mut self,
        allowed: bool,
        f: impl FnOnce(&mut Self) -> Result<T, ()>,
    ) -> Result<T, ()> {
        let prev = self.struct_literal_allowed;
        self.struct_literal_allowed = allowed;
        let result = f(self);
        self.struct_literal_allowed = prev;
        result
    }

    fn loc(&self) -> SourceLocation {
        self.current.location.clone()
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    fn advance(&mut self) -> Token {
        let next = self.lexer.next_token();
        std::mem::replace(&mut self.current, next)
    }

    /// Consume `current` if it matches `kind`, else report a fatal error.
    fn expect(&mut self, kind: TokenKind, what: &str, diag_kind: &'static str) -> Result<Token, ()> {
        if self.current.kind == kind {
            Ok(self.advance())
        } else {
            self.fatal(diag_kind, format!("expected {what}, found {:?}", self.current.kind));
            Err(())
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String, ()> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            other => {
                self.fatal("expected-identifier", format!("expected {what}, found {other:?}"));
                Err(())
            }
        }
    }

    /// Like [`Self::expect_identifier`], but also accepts the built-in
    /// generic type keywords (`Option`, `Result`, `TaskHandle`) as a
    /// declared name. A user program is free to declare its own `enum
    /// Option<T> { … }`; the keyword only has special meaning in *type*
    /// position (spec §8 scenario 8).
    fn expect_declarable_name(&mut self, what: &str) -> Result<String, ()> {
        match self.peek_kind() {
            TokenKind::TyOption => {
                self.advance();
                Ok("Option".to_string())
            }
            TokenKind::TyResult => {
                self.advance();
                Ok("Result".to_string())
            }
            TokenKind::TyTaskHandle => {
                self.advance();
                Ok("TaskHandle".to_string())
            }
            _ => self.expect_identifier(what),
        }
    }

    fn fatal(&mut self, kind: &'static str, message: impl Into<String>) {
        self.sink.push(Diagnostic::error(self.loc(), kind, message));
    }

    fn constraint_error(&mut self, kind: &'static str, message: impl Into<String>) {
        self.sink.push(Diagnostic::error(self.loc(), kind, message));
    }

    fn should_abort(&self) -> bool {
        self.recovery == RecoveryMode::Strict && self.sink.has_errors()
    }

    /// Advance past tokens until a synchronization point (spec §4.2.8,
    /// §9). Consumes the sync token itself when it is a closing `;`/`}`
    /// so the next declaration starts cleanly; leaves a keyword sync
    /// token unconsumed so the caller's dispatch loop sees it.
    fn synchronize(&mut self) {
        loop {
            if self.at(&TokenKind::Eof) {
                return;
            }
            if matches!(self.current.kind, TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if matches!(self.current.kind, TokenKind::RBrace) {
                self.advance();
                return;
            }
            if SYNC_TOKENS.iter().any(|matches_kind| matches_kind(&self.current.kind)) {
                return;
            }
            self.advance();
        }
    }

    fn checkpoint(&self) -> ParserCheckpoint {
        ParserCheckpoint {
            lexer: self.lexer.checkpoint(),
            current: self.current.clone(),
        }
    }

    fn restore(&mut self, checkpoint: ParserCheckpoint) {
        self.lexer.restore(checkpoint.lexer);
        self.current = checkpoint.current;
    }

    /// Top-level entry point (spec §4.2.1): one package declaration,
    /// zero-or-more imports, then zero-or-more declarations until EOF.
    pub fn parse_program(&mut self) -> Option<Node> {
        let start_loc = self.loc();
        let package = match self.parse_package_decl() {
            Ok(node) => node,
            Err(()) => return None,
        };

        let mut imports = Vec::new();
        while self.at(&TokenKind::Import) {
            if self.should_abort() {
                return None;
            }
            match self.parse_import_decl() {
                Ok(node) => imports.push(node),
                Err(()) => {
                    if self.should_abort() {
                        return None;
                    }
                    self.synchronize();
                }
            }
        }

        let mut declarations = Vec::new();
        while !self.at(&TokenKind::Eof) {
            if self.should_abort() {
                return None;
            }
            match self.parse_top_level_decl() {
                Ok(node) => declarations.push(node),
                Err(()) => {
                    if self.should_abort() {
                        return None;
                    }
                    self.synchronize();
                }
            }
        }

        Some(Node::new(
            crate::ast::NodeKind::Program {
                package: package.boxed(),
                imports,
                declarations,
            },
            start_loc,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    fn parse(src: &str) -> (Option<Node>, DiagnosticSink) {
        parse_program(src, ParseOptions::new("t.asthra"))
    }

    #[test]
    fn parses_minimal_program() {
        let (program, sink) = parse("package test; pub fn main(none) -> i32 { return 42; }");
        assert!(sink.is_empty(), "unexpected diagnostics: {:?}", sink.into_vec());
        let program = program.expect("program should parse");
        match &program.kind {
            NodeKind::Program { declarations, .. } => assert_eq!(declarations.len(), 1),
            other => panic!("expected program, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_is_reported() {
        let (_, sink) = parse(r#"package main; pub fn main(none) -> void { log("Missing semicolon") return (); }"#);
        assert!(sink.iter().any(|d| d.message.contains("expected ';'")));
    }

    #[test]
    fn missing_visibility_is_reported() {
        let (_, sink) = parse("package test; fn helper(none) -> void { return (); } pub fn main(none) -> void { helper(); return (); }");
        assert!(sink.iter().any(|d| d.message.contains("expected visibility modifier")));
    }

    #[test]
    fn strict_mode_stops_at_first_error() {
        let options = ParseOptions::new("t.asthra").with_recovery(RecoveryMode::Strict);
        let (program, sink) = parse_program("package test; fn bad(none) -> void { return (); }", options);
        assert!(program.is_none());
        assert_eq!(sink.len(), 1);
    }
}
