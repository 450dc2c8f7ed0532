//! Bounded citation scanner
//!
//! Locates balanced `??text??` pairs confined to a single line. The scan is one forward pass:
//! the first valid opener on a line is paired with the first valid closer after it, and since
//! whether a `??` can close does not depend on which opener it closes, a line whose first
//! opener finds no closer contains no citation at all. A newline drops the pending opener, so
//! every character is visited once whatever mix of markers surrounds it.
//!
//! A marker hugging bracket punctuation, as in `(??)`, neither opens nor closes.

use std::ops::Range;

const MARK: &str = "??";

/// Find the first citation starting at or after `from`.
///
/// Returns the range of the whole citation and the range of its text.
pub fn find_from(text: &str, from: usize) -> Option<(Range<usize>, Range<usize>)> {
    let mut opener: Option<usize> = None;
    let mut at = from;
    while let Some(offset) = text[at..].find(|c: char| c == '\n' || c == '?') {
        let index = at + offset;
        if text[index..].starts_with('\n') {
            opener = None;
            at = index + 1;
            continue;
        }
        if !text[index..].starts_with(MARK) {
            at = index + 1;
            continue;
        }
        let before = text[..index].chars().next_back();
        let after = text[index + MARK.len()..].chars().next();
        match opener {
            None if can_open(after) => {
                opener = Some(index);
                at = index + MARK.len();
            }
            Some(open) if index > open + MARK.len() && can_close(before) => {
                return Some((open..index + MARK.len(), open + MARK.len()..index));
            }
            _ => at = index + 1,
        }
    }
    None
}

fn can_open(after: Option<char>) -> bool {
    after.is_some_and(|c| !c.is_whitespace() && c != '?' && !matches!(c, ')' | ']' | '}'))
}

fn can_close(before: Option<char>) -> bool {
    before.is_some_and(|c| !c.is_whitespace() && c != '?' && !matches!(c, '(' | '[' | '{'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cited(text: &str) -> Option<&str> {
        find_from(text, 0).map(|(_, inner)| &text[inner])
    }

    #[test]
    fn test_simple_citation() {
        assert_eq!(cited("??cited text??"), Some("cited text"));
    }

    #[test]
    fn test_question_mark_inside() {
        assert_eq!(cited("??is this cited? yes??"), Some("is this cited? yes"));
    }

    #[test]
    fn test_lone_marker_is_not_a_citation() {
        assert_eq!(cited("* (??) Some weird formatting"), None);
    }

    #[test]
    fn test_citation_does_not_span_lines() {
        assert_eq!(cited("??open\nclose??"), None);
    }

    #[test]
    fn test_later_line_is_found() {
        let text = "nothing (??) here\nbut ??this?? one";
        let (whole, inner) = find_from(text, 0).unwrap();
        assert_eq!(&text[inner], "this");
        assert_eq!(&text[whole], "??this??");
    }

    #[test]
    fn test_bracketed_marker_does_not_pair_with_later_closer() {
        let text = "(??) and ??b??";
        let (whole, inner) = find_from(text, 0).unwrap();
        assert_eq!(&text[inner], "b");
        assert_eq!(&text[whole], "??b??");
    }

    #[test]
    fn test_bracketed_markers_never_pair() {
        assert_eq!(cited(&"(??) [a] ".repeat(50)), None);
    }

    #[test]
    fn test_search_respects_start_offset() {
        let text = "??a?? and ??b??";
        let (_, inner) = find_from(text, 5).unwrap();
        assert_eq!(&text[inner], "b");
    }
}
