use std::path::{Component, Path, PathBuf};

/// Calculates the 0-based line and character (in chars) for a byte offset in
/// the source text. Offsets past the end clamp to the end of the text.
pub fn offset_to_position(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut character = 0;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            character = 0;
        } else {
            character += 1;
        }
    }
    (line, character)
}

/// Like [`offset_to_position`], but counts the character in UTF-16 code
/// units, the default position encoding of the Language Server Protocol.
pub fn offset_to_utf16_position(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut character = 0;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            character = 0;
        } else {
            character += c.len_utf16();
        }
    }
    (line, character)
}

/// Folds `.` and `..` components without touching the file system.
/// A `..` that would climb above the start of the path is kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Inverse of [`offset_to_position`]. Returns `None` when the line does not
/// exist; a character past the end of its line clamps to the line end.
pub fn position_to_offset(source: &str, line: usize, character: usize) -> Option<usize> {
    let mut line_start = 0;
    for _ in 0..line {
        line_start += source[line_start..].find('\n')? + 1;
    }
    let rest = &source[line_start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    let offset = rest[..line_len]
        .char_indices()
        .nth(character)
        .map_or(line_len, |(i, _)| i);
    Some(line_start + offset)
}

/// A caret offset is usable only if it lies inside the text on a char boundary.
pub fn is_valid_offset(source: &str, offset: usize) -> bool {
    offset <= source.len() && source.is_char_boundary(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_to_position() {
        let text = "ab\ncd\n\nx";
        assert_eq!(offset_to_position(text, 0), (0, 0));
        assert_eq!(offset_to_position(text, 2), (0, 2));
        assert_eq!(offset_to_position(text, 3), (1, 0));
        assert_eq!(offset_to_position(text, 7), (3, 0));
        assert_eq!(offset_to_position(text, 100), (3, 1));
    }

    #[test]
    fn test_position_to_offset_roundtrip_multibyte() {
        let text = "héllo\n$(mcp.ü)";
        let offset = text.find("$(").unwrap();
        assert_eq!(offset_to_position(text, offset), (1, 0));
        assert_eq!(position_to_offset(text, 1, 0), Some(offset));
        assert_eq!(position_to_offset(text, 0, 2), Some(3));
        assert_eq!(position_to_offset(text, 0, 50), Some(6));
        assert_eq!(position_to_offset(text, 5, 0), None);
    }

    #[test]
    fn test_utf16_position_counts_surrogate_pairs() {
        let text = "a😀é$(mcp.x)";
        let offset = text.find('$').unwrap();
        assert_eq!(offset_to_position(text, offset), (0, 3));
        assert_eq!(offset_to_utf16_position(text, offset), (0, 4));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/ws/./a/../cfg/placeholder.json")),
            PathBuf::from("/ws/cfg/placeholder.json")
        );
        assert_eq!(
            normalize_path(Path::new("./placeholder.json")),
            PathBuf::from("placeholder.json")
        );
        assert_eq!(normalize_path(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_is_valid_offset() {
        let text = "é";
        assert!(is_valid_offset(text, 0));
        assert!(!is_valid_offset(text, 1));
        assert!(is_valid_offset(text, 2));
        assert!(!is_valid_offset(text, 3));
    }
}
