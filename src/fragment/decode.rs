//! Fragment-only TOML decoding

use super::document::Document;
use super::locator::Fragment;
use super::FragmentError;

/// Decode just the fragment's lines and return the named table.
///
/// Only the owned line range is handed to the TOML parser, so malformed
/// syntax elsewhere in the document cannot block reading this table.
pub fn decode_table(
    doc: &Document,
    fragment: &Fragment,
    table: &str,
) -> Result<toml::value::Table, FragmentError> {
    let text = doc.lines()[fragment.start..fragment.end].join("\n");
    let value: toml::Value = toml::from_str(&text).map_err(|source| FragmentError::Decode {
        table: table.to_string(),
        source: Box::new(source),
    })?;

    Ok(value
        .get(table)
        .and_then(|t| t.as_table())
        .cloned()
        .unwrap_or_default())
}
