//! Line model for byte-preserving document edits

/// A document as an ordered sequence of lines.
///
/// Lines are split on `\n` only, so a document ending in a newline carries a
/// trailing empty line. Re-joining the lines with `\n` reproduces the
/// original text exactly, which is what lets the editor guarantee that
/// untouched regions survive byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    pub fn parse(raw: &str) -> Self {
        Document {
            lines: raw.split('\n').map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Re-serialize the document. Inverse of `parse`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}
