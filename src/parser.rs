//! Scanner for `$(mcp.<dotted.path>)` placeholders.
//!
//! Two grammars are recognised:
//!
//! * the closed form, `$(mcp.seg(.seg)*)`, used for whole-buffer diagnostics
//!   and for hover;
//! * the open prefix form, `$(mcp.<path-so-far>` ending exactly at a caret,
//!   used for live completion while a placeholder is still being typed.
//!
//! A segment is any non-empty run of characters other than `$`, `(`, `)` and `.`.

use crate::utils::is_valid_offset;
use miette::SourceSpan;

/// The literal that opens every placeholder.
pub const PLACEHOLDER_OPEN: &str = "$(mcp.";
/// The namespace token every raw path starts with.
pub const NAMESPACE: &str = "mcp";

const CLOSE: char = ')';
const SEPARATOR: char = '.';

fn is_delimiter(c: char) -> bool {
    matches!(c, '$' | '(' | ')' | '.')
}

/// A closed placeholder found in a text buffer.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlaceholderOccurrence {
    /// Byte offset of the leading `$`.
    pub pos_start: usize,
    /// Byte offset just past the closing `)`.
    pub pos_end: usize,
    /// Path segments, the first one always being `mcp`.
    pub raw_path: Vec<String>,
}

impl PlaceholderOccurrence {
    #[must_use]
    pub fn span(&self) -> SourceSpan {
        SourceSpan::from(self.pos_start..self.pos_end)
    }

    /// The path looked up in the configuration data, without the `mcp` token.
    #[must_use]
    pub fn lookup_path(&self) -> &[String] {
        &self.raw_path[1..]
    }

    /// Whether `offset` lies within the placeholder or right after its `)`.
    #[must_use]
    pub fn touches(&self, offset: usize) -> bool {
        self.pos_start <= offset && offset <= self.pos_end
    }
}

/// An unterminated placeholder that ends at the caret.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlaceholderPrefix {
    pub pos_start: usize,
    /// Segments typed so far, starting with `mcp`. The last segment is the
    /// one being typed and may be empty.
    pub raw_path: Vec<String>,
}

impl PlaceholderPrefix {
    /// The completed segments, i.e. the path whose children are candidates.
    #[must_use]
    pub fn parent_path(&self) -> &[String] {
        &self.raw_path[1..self.raw_path.len() - 1]
    }

    /// The segment currently being typed.
    #[must_use]
    pub fn partial(&self) -> &str {
        self.raw_path.last().map_or("", String::as_str)
    }
}

/// Finds every closed placeholder in `text`, leftmost-first and non-overlapping.
pub fn scan_all(text: &str) -> Vec<PlaceholderOccurrence> {
    Scanner::new(text).collect()
}

/// Finds the closed placeholder that contains `offset` or ends exactly at it.
pub fn occurrence_at(text: &str, offset: usize) -> Option<PlaceholderOccurrence> {
    if !is_valid_offset(text, offset) {
        return None;
    }
    Scanner::new(text)
        .take_while(|occ| occ.pos_start <= offset)
        .find(|occ| occ.touches(offset))
}

/// Matches `$(mcp.<path-so-far>` ending exactly at `caret`, with no closing
/// parenthesis required.
pub fn prefix_at(text: &str, caret: usize) -> Option<PlaceholderPrefix> {
    if !is_valid_offset(text, caret) {
        return None;
    }
    let head = &text[..caret];
    let pos_start = head.rfind(PLACEHOLDER_OPEN)?;
    let typed = &head[pos_start + PLACEHOLDER_OPEN.len()..];
    if typed.chars().any(|c| c != SEPARATOR && is_delimiter(c)) {
        return None;
    }

    let mut raw_path = vec![NAMESPACE.to_string()];
    raw_path.extend(typed.split(SEPARATOR).map(str::to_string));
    Some(PlaceholderPrefix {
        pos_start,
        raw_path,
    })
}

/// Iterates over closed placeholders in a buffer.
pub struct Scanner<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Tries to match a closed placeholder whose `$(mcp.` starts at `start`.
    fn match_closed(&self, start: usize) -> Option<PlaceholderOccurrence> {
        let body_start = start + PLACEHOLDER_OPEN.len();
        let mut raw_path = vec![NAMESPACE.to_string()];
        let mut segment = String::new();

        for (i, c) in self.input[body_start..].char_indices() {
            match c {
                CLOSE => {
                    if segment.is_empty() {
                        return None;
                    }
                    raw_path.push(segment);
                    return Some(PlaceholderOccurrence {
                        pos_start: start,
                        pos_end: body_start + i + c.len_utf8(),
                        raw_path,
                    });
                }
                SEPARATOR => {
                    if segment.is_empty() {
                        return None;
                    }
                    raw_path.push(std::mem::take(&mut segment));
                }
                c if is_delimiter(c) => return None,
                c => segment.push(c),
            }
        }
        None
    }
}

impl Iterator for Scanner<'_> {
    type Item = PlaceholderOccurrence;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(found) = self.input[self.position..].find(PLACEHOLDER_OPEN) {
            let start = self.position + found;
            match self.match_closed(start) {
                Some(occurrence) => {
                    self.position = occurrence.pos_end;
                    return Some(occurrence);
                }
                // `$` is a single byte, so start + 1 is a char boundary.
                None => self.position = start + 1,
            }
        }
        self.position = self.input.len();
        None
    }
}
