//! Structured diagnostics: severities, stable kind identifiers, and a
//! sink that supports both strict (fail-fast) and permissive (collect
//! and recover) modes (spec §4.2.8, §6, §7).

use crate::source::SourceLocation;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single diagnostic: location, severity, a stable machine-checkable
/// kind id (e.g. `"expected-visibility"`), and a human message. Tests
/// assert against short substrings of `message`, never against `kind`
/// alone, since `kind` is for tooling and `message` is for humans.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub severity: Severity,
    pub kind: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(location: SourceLocation, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            location,
            severity: Severity::Error,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(location: SourceLocation, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            location,
            severity: Severity::Warning,
            kind,
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Whether the parser aborts on the first fatal error (strict) or
/// records it and attempts recovery via synchronization (permissive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryMode {
    Strict,
    Permissive,
}

impl Default for RecoveryMode {
    fn default() -> Self {
        RecoveryMode::Permissive
    }
}

/// Collects diagnostics in the order they are encountered (spec §5,
/// "ordering guarantees"). Strict mode is enforced by the parser calling
/// [`DiagnosticSink::should_abort`] after each push; the sink itself is
/// just a growing, ordered log plus the mode flag.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    mode: RecoveryModeHolder,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
struct RecoveryModeHolder(RecoveryMode);
impl Default for RecoveryModeHolder {
    fn default() -> Self {
        RecoveryModeHolder(RecoveryMode::Permissive)
    }
}

impl DiagnosticSink {
    pub fn new(mode: RecoveryMode) -> Self {
        Self {
            mode: RecoveryModeHolder(mode),
            diagnostics: Vec::new(),
        }
    }

    pub fn mode(&self) -> RecoveryMode {
        self.mode.0
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// True once a fatal error has been recorded while in strict mode:
    /// the parser must stop at the first one (spec §4.2.1, §4.2.8).
    pub fn should_abort(&self) -> bool {
        self.mode.0 == RecoveryMode::Strict
            && self
                .diagnostics
                .iter()
                .any(|d| d.severity == Severity::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Discard diagnostics recorded after `len` was taken. Used by the
    /// parser to roll back a speculative generic-argument parse that
    /// failed (spec §9, "explicit parser checkpoints") without leaking
    /// its diagnostics into the real result.
    pub fn truncate(&mut self, len: usize) {
        self.diagnostics.truncate(len);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceId;

    fn loc() -> SourceLocation {
        SourceLocation::new(SourceId::new("t.asthra"), 1, 1, 0)
    }

    #[test]
    fn strict_mode_aborts_after_first_error() {
        let mut sink = DiagnosticSink::new(RecoveryMode::Strict);
        assert!(!sink.should_abort());
        sink.push(Diagnostic::error(loc(), "expected-visibility", "expected visibility modifier"));
        assert!(sink.should_abort());
    }

    #[test]
    fn permissive_mode_never_aborts() {
        let mut sink = DiagnosticSink::new(RecoveryMode::Permissive);
        sink.push(Diagnostic::error(loc(), "expected-visibility", "expected visibility modifier"));
        assert!(!sink.should_abort());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn display_contains_substring() {
        let d = Diagnostic::error(loc(), "expected-semicolon", "expected ';'");
        let text = format!("{d}");
        assert!(text.contains("expected ';'"));
    }
}
