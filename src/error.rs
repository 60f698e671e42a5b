use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Failures while loading the placeholder configuration file.
///
/// All of them leave the store without a configuration; they differ only in
/// how they are reported.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Malformed placeholder configuration: {reason}")]
    #[diagnostic(
        code(config::malformed),
        help("The configuration must be a single JSON document. Fix the syntax and save again.")
    )]
    Malformed {
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
        reason: String,
    },

    #[error("Could not read placeholder configuration {path}: {reason}")]
    #[diagnostic(code(config::io))]
    Io { path: String, reason: String },

    #[error("Placeholder configuration {path} not found")]
    #[diagnostic(
        code(config::not_found),
        help("Create the file to enable placeholder resolution.")
    )]
    NotFound { path: String },
}

/// A placeholder whose path does not exist in the configuration data.
#[derive(Error, Debug, Diagnostic)]
#[error("key \"{key}\" does not exist")]
#[diagnostic(
    code(placeholder::key_not_found),
    severity(Error),
    help("Add the key under `placeholder.data` or fix the placeholder path.")
)]
pub struct KeyNotFound {
    pub key: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("this placeholder does not resolve")]
    pub span: SourceSpan,
}

impl ConfigError {
    pub(crate) fn malformed(name: &str, source: &[u8], err: &serde_json::Error) -> Self {
        // serde_json reports a 1-based line and a 1-based byte column; line 0
        // means "no location".
        let raw_offset = if err.line() == 0 {
            0
        } else {
            byte_offset(source, err.line(), err.column())
        };
        // Lossy decoding may widen invalid bytes, so re-measure the prefix.
        let text = String::from_utf8_lossy(source).into_owned();
        let mut offset = String::from_utf8_lossy(&source[..raw_offset]).len().min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let len = text[offset..].chars().next().map_or(0, char::len_utf8);
        ConfigError::Malformed {
            reason: err.to_string(),
            src: NamedSource::new(name, text),
            span: (offset, len).into(),
        }
    }

    /// Whether the error came from the document's contents rather than the file system.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, ConfigError::Malformed { .. })
    }
}

/// Byte offset of a 1-based line and byte column, clamped to the source.
fn byte_offset(source: &[u8], line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for _ in 1..line {
        match source[line_start..].iter().position(|&b| b == b'\n') {
            Some(i) => line_start += i + 1,
            None => return source.len(),
        }
    }
    (line_start + column.saturating_sub(1)).min(source.len())
}
