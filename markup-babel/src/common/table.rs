//! Pipe-table helpers
//!
//! Row splitting shared by the canonical and wiki table handling. Canonical rows look like
//! `| a | b |` with an optional `|---|:--:|` separator after the header; wiki rows use `||` to
//! delimit header cells and `|` for data cells.

/// Whether the line is a canonical pipe-table row.
pub fn is_pipe_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Split a canonical row into trimmed cell texts.
///
/// Pipes inside `[...]`, `{...}` and backtick code are not treated as cell delimiters.
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    split_cells(line, "|")
}

/// Whether the row consists only of `-`/`:` cells, with at least one `-`.
pub fn is_separator_row(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            !cell.is_empty()
                && cell.contains('-')
                && cell.chars().all(|c| matches!(c, '-' | ':' | ' '))
        })
}

/// A row of a wiki-dialect table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiRow {
    pub header: bool,
    pub cells: Vec<String>,
}

/// Parse a wiki table row (`||h||h||` or `|c|c|`).
pub fn parse_wiki_row(line: &str) -> Option<WikiRow> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix("||") {
        let rest = rest.strip_suffix("||").unwrap_or(rest);
        return Some(WikiRow {
            header: true,
            cells: split_cells(rest, "||"),
        });
    }
    let rest = line.strip_prefix('|')?;
    let rest = rest.strip_suffix('|').unwrap_or(rest);
    Some(WikiRow {
        header: false,
        cells: split_cells(rest, "|"),
    })
}

fn split_cells(body: &str, delimiter: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut depth_square = 0usize;
    let mut depth_curly = 0usize;
    let mut in_code = false;
    let mut start = 0;
    let mut index = 0;
    let bytes = body.as_bytes();

    while index < bytes.len() {
        match bytes[index] {
            b'`' => in_code = !in_code,
            b'[' if !in_code => depth_square += 1,
            b']' if !in_code => depth_square = depth_square.saturating_sub(1),
            b'{' if !in_code => depth_curly += 1,
            b'}' if !in_code => depth_curly = depth_curly.saturating_sub(1),
            _ => {}
        }
        if !in_code
            && depth_square == 0
            && depth_curly == 0
            && bytes[index..].starts_with(delimiter.as_bytes())
        {
            cells.push(body[start..index].trim().to_string());
            index += delimiter.len();
            start = index;
            continue;
        }
        index += 1;
    }
    cells.push(body[start..].trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| A | B |"), vec!["A", "B"]);
        assert_eq!(split_row("|A|"), vec!["A"]);
    }

    #[test]
    fn test_split_row_keeps_bracketed_pipes() {
        assert_eq!(
            split_row("| [x|http://a] | `a|b` |"),
            vec!["[x|http://a]", "`a|b`"]
        );
    }

    #[test]
    fn test_separator_detection() {
        assert!(is_separator_row("|---|"));
        assert!(is_separator_row("| :-- | --: | :-: |"));
        assert!(!is_separator_row("| A |"));
        assert!(!is_separator_row("| : |"));
        assert!(!is_separator_row("|  |"));
    }

    #[test]
    fn test_wiki_rows() {
        assert_eq!(
            parse_wiki_row("||Name||Value||"),
            Some(WikiRow {
                header: true,
                cells: vec!["Name".into(), "Value".into()],
            })
        );
        assert_eq!(
            parse_wiki_row("|a|[b|http://x]|"),
            Some(WikiRow {
                header: false,
                cells: vec!["a".into(), "[b|http://x]".into()],
            })
        );
        assert_eq!(parse_wiki_row("plain"), None);
    }
}
