//! Semantic diagnostics.
//!
//! A diagnostic is a line-tagged message. The external form is a plain
//! string (`"Line <n>: <message>"` or `"Warning: <message>"`); the typed
//! `kind` is kept alongside so callers can filter without re-parsing text.

use alloc::string::String;
use core::fmt;

use serde::{Serialize, Serializer};

/// The closed set of problems the semantic analyzer reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Redeclaration,
    UndeclaredUse,
    UseBeforeInit,
    TypeMismatch,
    UnusedVariable,
}

impl DiagnosticKind {
    /// Unused variables are advisory; everything else is an error.
    pub fn is_warning(self) -> bool {
        matches!(self, DiagnosticKind::UnusedVariable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Line the message is tagged with. Warnings carry the declaration
    /// line here but render without a `Line` prefix.
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            line,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.kind.is_warning()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_warning() {
            write!(f, "Warning: {}", self.message)
        } else {
            write!(f, "Line {}: {}", self.line, self.message)
        }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
