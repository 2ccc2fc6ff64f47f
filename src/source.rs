//! Source locations and the byte buffer they are computed against.

use once_cell::unsync::OnceCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Identifies a source file by its display name (a path, or a synthetic
/// name such as `"<repl>"`). Cheap to clone; parsing many files means
/// constructing one [`SourceId`] per file and one [`Lexer`](crate::lexer::Lexer) against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId(Rc<str>);

impl SourceId {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 1-based line, 1-based column, and byte offset into a source file.
///
/// Locations are immutable copyable value data (spec §3.1): once
/// constructed by the lexer, nothing downstream mutates a location in
/// place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: SourceId,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(file: SourceId, line: usize, column: usize, offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A borrowed source buffer with lazily-computed line-start offsets.
///
/// Mirrors the teacher's `Code` wrapper: the byte slice is never copied,
/// and the line-break table is only built the first time a line/column
/// pair is requested.
pub struct SourceBuffer<'c> {
    pub bytes: &'c [u8],
    file: SourceId,
    line_starts: OnceCell<Vec<usize>>,
}

impl<'c> SourceBuffer<'c> {
    pub fn new(file: SourceId, bytes: &'c [u8]) -> Self {
        Self {
            bytes,
            file,
            line_starts: OnceCell::new(),
        }
    }

    fn line_starts(&self) -> &Vec<usize> {
        self.line_starts.get_or_init(|| {
            let mut starts = vec![0];
            for (i, b) in self.bytes.iter().enumerate() {
                if *b == b'\n' {
                    starts.push(i + 1);
                }
            }
            starts
        })
    }

    /// Resolve a byte offset into a 1-based line/column pair and wrap it
    /// into a [`SourceLocation`] for this buffer's file.
    pub fn locate(&self, offset: usize) -> SourceLocation {
        let starts = self.line_starts();
        let line_index = match starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = starts[line_index];
        let column = offset - line_start + 1;
        SourceLocation::new(self.file.clone(), line_index + 1, column, offset)
    }

    pub fn file(&self) -> &SourceId {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_line() {
        let buf = SourceBuffer::new(SourceId::new("t.asthra"), b"abc\ndef");
        let loc = buf.locate(1);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn locates_second_line() {
        let buf = SourceBuffer::new(SourceId::new("t.asthra"), b"abc\ndef");
        let loc = buf.locate(4);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 1);
    }
}
