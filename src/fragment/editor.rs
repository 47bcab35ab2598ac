//! Minimal-diff rewriting of one table's line range

use super::document::Document;
use super::locator::Fragment;

/// Result of a rewrite: the new document text plus whether it differs from
/// the input, so callers can skip a pointless write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub changed: bool,
}

/// Rewrite the `[table]` fragment so it carries the given key/value entries.
///
/// Keys that already have a `key = value` line are updated in place; keys
/// without one are appended at the end of the fragment body. Every line not
/// named in `entries` is preserved byte-for-byte, comments included. When
/// the fragment is absent the table is appended at the end of the document,
/// preceded by one blank separator line unless the document is empty or
/// already ends blank.
///
/// The operation is idempotent: rewriting the output with the same entries
/// reports `changed: false`.
pub fn rewrite(
    doc: &Document,
    fragment: Option<&Fragment>,
    table: &str,
    entries: &[(String, String)],
) -> Rewrite {
    let text = match fragment {
        Some(fragment) => rewrite_existing(doc, fragment, entries),
        None => append_table(&doc.text(), table, entries),
    };
    let changed = text != doc.text();
    Rewrite { text, changed }
}

fn rewrite_existing(doc: &Document, fragment: &Fragment, entries: &[(String, String)]) -> String {
    let mut lines: Vec<String> = doc.lines().to_vec();
    let mut body_end = fragment.end;

    // New keys land after the last non-blank body line, keeping any trailing
    // blank separator (and the trailing-newline empty line) in place.
    let mut insert_at = fragment.start + 1;
    for idx in fragment.body() {
        if !lines[idx].trim().is_empty() {
            insert_at = idx + 1;
        }
    }

    for (key, value) in entries {
        let formatted = format!("{key} = {}", format_value(value));
        let existing = (fragment.start + 1..body_end).find(|&idx| line_key(&lines[idx]) == Some(key.as_str()));
        match existing {
            Some(idx) => lines[idx] = formatted,
            None => {
                lines.insert(insert_at, formatted);
                insert_at += 1;
                body_end += 1;
            }
        }
    }

    lines.join("\n")
}

fn append_table(text: &str, table: &str, entries: &[(String, String)]) -> String {
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push('\n');
    }
    out.push('[');
    out.push_str(table);
    out.push_str("]\n");
    for (key, value) in entries {
        out.push_str(&format!("{key} = {}\n", format_value(value)));
    }
    out
}

/// The bare key of a `key = value` line, if the line is one.
fn line_key(line: &str) -> Option<&str> {
    let text = line.trim_start();
    if text.starts_with('#') {
        return None;
    }
    let eq = text.find('=')?;
    let key = text[..eq].trim();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Emit a value as TOML: bare for pure digit strings, quoted otherwise.
fn format_value(value: &str) -> String {
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
