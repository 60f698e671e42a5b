//! Plain result types handed back to the host editor.

use crate::error::KeyNotFound;
use crate::utils::{offset_to_position, offset_to_utf16_position};
use miette::{NamedSource, Report, Severity, SourceSpan};
use serde::Serialize;

/// A 0-based line / character position.
///
/// `from_offset` counts characters as Unicode scalar values;
/// `from_offset_utf16` counts UTF-16 code units, the LSP default.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    #[must_use]
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let (line, character) = offset_to_position(text, offset);
        Self { line, character }
    }

    #[must_use]
    pub fn from_offset_utf16(text: &str, offset: usize) -> Self {
        let (line, character) = offset_to_utf16_position(text, offset);
        Self { line, character }
    }
}

/// A placeholder that does not resolve.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlaceholderDiagnostic {
    /// The whole placeholder, `$(` through `)`.
    pub span: SourceSpan,
    /// The segment that failed to resolve.
    pub key: String,
    pub message: String,
    pub severity: Severity,
}

impl PlaceholderDiagnostic {
    /// Start and end of the span as editor positions within `text`.
    #[must_use]
    pub fn range(&self, text: &str) -> (Position, Position) {
        let start = self.span.offset();
        (
            Position::from_offset(text, start),
            Position::from_offset(text, start + self.span.len()),
        )
    }

    /// Like [`PlaceholderDiagnostic::range`], in UTF-16 code units.
    #[must_use]
    pub fn range_utf16(&self, text: &str) -> (Position, Position) {
        let start = self.span.offset();
        (
            Position::from_offset_utf16(text, start),
            Position::from_offset_utf16(text, start + self.span.len()),
        )
    }

    /// Builds a `miette` report pointing at the placeholder in `text`.
    #[must_use]
    pub fn to_report(&self, document_name: &str, text: &str) -> Report {
        Report::new(KeyNotFound {
            key: self.key.clone(),
            src: NamedSource::new(document_name, text.to_string()),
            span: self.span,
        })
    }
}

/// A completion candidate: a child key and a compact rendering of its value.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub detail: String,
}
