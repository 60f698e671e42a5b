use crate::ast::Node;
use log::trace;

/// Outcome of looking a dotted path up in a configuration tree.
///
/// The resolved node borrows from the tree (`'n`), the failing segment from
/// the path (`'p`), so a node outlives the path it was looked up with.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Resolution<'n, 'p> {
    /// The path exists; the value may be a scalar or a whole subtree.
    Resolved(&'n Node),
    /// Segment `index` is missing, maps to `null`/`false`, or its parent is
    /// not a key map. Nothing past `index` was looked at.
    Broken { index: usize, segment: &'p str },
}

impl<'n, 'p> Resolution<'n, 'p> {
    #[must_use]
    pub fn value(&self) -> Option<&'n Node> {
        match *self {
            Resolution::Resolved(node) => Some(node),
            Resolution::Broken { .. } => None,
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Message reported for a broken path; `None` when resolved.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Resolution::Resolved(_) => None,
            Resolution::Broken { segment, .. } => Some(key_not_found_message(segment)),
        }
    }
}

pub(crate) fn key_not_found_message(segment: &str) -> String {
    format!("key \"{segment}\" does not exist")
}

/// Walks `path` from `root`, descending one key map per segment.
///
/// A key whose value is `null` or `false` counts as missing. An empty path
/// resolves to `root` itself.
pub fn resolve<'n, 'p, S: AsRef<str>>(root: &'n Node, path: &'p [S]) -> Resolution<'n, 'p> {
    let mut current = root;
    for (index, segment) in path.iter().enumerate() {
        let segment = segment.as_ref();
        match current.get(segment) {
            Some(child) if !child.is_falsy() => current = child,
            _ => {
                trace!("lookup broke at segment {index} ({segment:?})");
                return Resolution::Broken { index, segment };
            }
        }
    }
    Resolution::Resolved(current)
}
