//! Lexer, recursive-descent parser, and AST core for the Asthra
//! systems language front-end.
//!
//! The pipeline is: bytes -> [`lexer::Lexer`] -> [`token::Token`]s ->
//! [`parser::Parser`] -> [`ast::Node`] tree. Diagnostics are collected
//! into a [`diagnostics::DiagnosticSink`] rather than raised as
//! exceptions, so a single parse can report more than one error.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod source;
pub mod token;

pub use ast::Node;
pub use diagnostics::{Diagnostic, DiagnosticSink, RecoveryMode};
pub use parser::{ParseOptions, Parser};
pub use source::{SourceBuffer, SourceId, SourceLocation};
