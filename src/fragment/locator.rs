//! Locate the unique table owning a name in a line sequence

use super::document::Document;
use super::FragmentError;

/// The half-open line range `[start, end)` owned by one table header.
///
/// `start` is the header line itself; `end` is the index of the next
/// top-level header that does not belong to the same table, or the end of
/// the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
}

impl Fragment {
    /// Line indices of the fragment body (everything after the header).
    pub fn body(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end
    }
}

/// A line with its trailing comment removed and whitespace trimmed.
pub(crate) fn stripped(line: &str) -> &str {
    let without_comment = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    without_comment.trim()
}

fn is_header(stripped: &str) -> bool {
    stripped.len() >= 2 && stripped.starts_with('[') && stripped.ends_with(']')
}

/// Find the unique fragment owned by `[table]`.
///
/// Returns `None` when no header owns the name (the caller may append a new
/// table) and fails when more than one does. An array-of-tables header for
/// the same name (`[[table]]`) is never an owner, but it also does not end
/// the owner's range: it counts as a continuation of the same table.
pub fn locate(doc: &Document, table: &str) -> Result<Option<Fragment>, FragmentError> {
    let owner_header = format!("[{table}]");
    let sibling_prefix = format!("[[{table}");

    let owners: Vec<usize> = doc
        .lines()
        .iter()
        .enumerate()
        .filter(|(_, line)| stripped(line) == owner_header)
        .map(|(idx, _)| idx)
        .collect();

    let start = match owners.as_slice() {
        [] => return Ok(None),
        [start] => *start,
        _ => {
            return Err(FragmentError::Ambiguous {
                table: table.to_string(),
                count: owners.len(),
            })
        }
    };

    let end = doc.lines()[start + 1..]
        .iter()
        .position(|line| {
            let text = stripped(line);
            is_header(text) && text != owner_header && !text.starts_with(&sibling_prefix)
        })
        .map(|offset| start + 1 + offset)
        .unwrap_or(doc.line_count());

    Ok(Some(Fragment { start, end }))
}
