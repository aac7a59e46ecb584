//! Delimiter handling shared by the delimited formats
//!
//! Covers the EDIFACT service string advice (UNA), release-character aware
//! splitting and unescaping, and the content previews attached to errors.

/// Default EDIFACT separators (when no UNA is present)
pub const DEFAULT_COMPONENT_SEPARATOR: char = ':';
pub const DEFAULT_ELEMENT_SEPARATOR: char = '+';
pub const DEFAULT_DECIMAL_POINT: char = '.';
pub const DEFAULT_RELEASE_CHARACTER: char = '?';
pub const DEFAULT_SEGMENT_TERMINATOR: char = '\'';

/// Longest content excerpt carried by a parse error
pub const PREVIEW_LIMIT: usize = 50;

/// Separators of a delimited message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    /// Component separator (default ':')
    pub component: char,
    /// Element separator (default '+')
    pub element: char,
    /// Decimal point (default '.')
    pub decimal: char,
    /// Release character (default '?'); `None` for formats without escaping
    pub release: Option<char>,
    /// Segment terminator (default '\'')
    pub segment: char,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            component: DEFAULT_COMPONENT_SEPARATOR,
            element: DEFAULT_ELEMENT_SEPARATOR,
            decimal: DEFAULT_DECIMAL_POINT,
            release: Some(DEFAULT_RELEASE_CHARACTER),
            segment: DEFAULT_SEGMENT_TERMINATOR,
        }
    }
}

impl Separators {
    /// ANSI X12 delimiters: `~` / `*` / `:`, no release character
    pub fn x12() -> Self {
        Self {
            component: ':',
            element: '*',
            decimal: '.',
            release: None,
            segment: '~',
        }
    }

    /// Parse separators from the start of a UNA service string advice
    ///
    /// UNA format: `UNA:+.? '`; the characters after `UNA` are component,
    /// element, decimal, release, reserved and segment terminator.
    pub fn from_una(una: &str) -> Option<Self> {
        let rest = una.strip_prefix("UNA")?;
        let chars: Vec<char> = rest.chars().take(6).collect();
        if chars.len() < 6 {
            return None;
        }

        Some(Self {
            component: chars[0],
            element: chars[1],
            decimal: chars[2],
            release: Some(chars[3]),
            // chars[4] is reserved
            segment: chars[5],
        })
    }

    /// Byte length of the UNA advice these separators were read from
    pub fn una_len(&self) -> usize {
        "UNA".len()
            + [self.component, self.element, self.decimal]
                .iter()
                .map(|c| c.len_utf8())
                .sum::<usize>()
            + self.release.map_or(1, char::len_utf8)
            + 1
            + self.segment.len_utf8()
    }
}

/// Split `input` on `delimiter`, ignoring delimiters preceded by `release`
///
/// Escape sequences are kept in the returned slices; see [`unescape`].
pub fn split_escaped(input: &str, delimiter: char, release: Option<char>) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut released = false;

    for (i, c) in input.char_indices() {
        if released {
            released = false;
        } else if Some(c) == release {
            released = true;
        } else if c == delimiter {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Whether `input` contains `delimiter` outside of an escape sequence
pub fn contains_unescaped(input: &str, delimiter: char, release: Option<char>) -> bool {
    split_escaped(input, delimiter, release).len() > 1
}

/// Remove release characters, keeping the characters they protect
pub fn unescape(input: &str, release: Option<char>) -> String {
    let Some(release) = release else {
        return input.to_string();
    };
    if !input.contains(release) {
        return input.to_string();
    }

    let mut result = String::with_capacity(input.len());
    let mut released = false;
    for c in input.chars() {
        if released {
            result.push(c);
            released = false;
        } else if c == release {
            released = true;
        } else {
            result.push(c);
        }
    }
    result
}

/// Segment tags are non-blank runs of ASCII letters and digits
pub fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Excerpt of `content` for error messages, cut at [`PREVIEW_LIMIT`] characters
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_separators() {
        let sep = Separators::default();
        assert_eq!(sep.component, ':');
        assert_eq!(sep.element, '+');
        assert_eq!(sep.decimal, '.');
        assert_eq!(sep.release, Some('?'));
        assert_eq!(sep.segment, '\'');
    }

    #[test]
    fn test_una_parsing() {
        let sep = Separators::from_una("UNA:+.? 'UNB+UNOA:2'").unwrap();
        assert_eq!(sep, Separators::default());
        assert_eq!(sep.una_len(), 9);
    }

    #[test]
    fn test_una_custom_separators() {
        let sep = Separators::from_una("UNA*=_# ~").unwrap();
        assert_eq!(sep.component, '*');
        assert_eq!(sep.element, '=');
        assert_eq!(sep.decimal, '_');
        assert_eq!(sep.release, Some('#'));
        assert_eq!(sep.segment, '~');
    }

    #[test]
    fn test_una_too_short() {
        assert!(Separators::from_una("UNA:+.").is_none());
        assert!(Separators::from_una("UNB+UNOA").is_none());
    }

    #[test]
    fn test_split_respects_release_character() {
        let parts = split_escaped("FTX+AAI+FRAGILE?+HEAVY+X", '+', Some('?'));
        assert_eq!(parts, vec!["FTX", "AAI", "FRAGILE?+HEAVY", "X"]);
        assert_eq!(unescape(parts[2], Some('?')), "FRAGILE+HEAVY");
    }

    #[test]
    fn test_double_release_character() {
        // ?? is a literal ?, so the following + still splits
        let parts = split_escaped("A??+B", '+', Some('?'));
        assert_eq!(parts, vec!["A??", "B"]);
        assert_eq!(unescape(parts[0], Some('?')), "A?");
    }

    #[test]
    fn test_split_keeps_empty_parts() {
        assert_eq!(
            split_escaped("SHIPPER001::92", ':', None),
            vec!["SHIPPER001", "", "92"]
        );
        assert_eq!(split_escaped("", '+', None), vec![""]);
    }

    #[test]
    fn test_contains_unescaped() {
        assert!(contains_unescaped("137:20240207", ':', Some('?')));
        assert!(!contains_unescaped("10?:30", ':', Some('?')));
    }

    #[test]
    fn test_tag_validation() {
        assert!(is_valid_tag("BGM"));
        assert!(is_valid_tag("B10"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag("B G"));
        assert!(!is_valid_tag("<BGM"));
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("BGM+340"), "BGM+340");

        let long = "X".repeat(60);
        let cut = preview(&long);
        assert_eq!(cut.len(), PREVIEW_LIMIT + 3);
        assert!(cut.ends_with("..."));
    }
}
