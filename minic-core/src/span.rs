//! Source positions shared by tokens, AST nodes and diagnostics.

use core::fmt;

use serde::Serialize;

/// A 1-based line/column pair.
///
/// Columns count characters, not bytes, so positions stay meaningful for
/// sources containing non-ASCII text (which the lexer otherwise drops).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
