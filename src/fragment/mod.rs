//! Line-oriented editing of a single named table inside a TOML document
//!
//! This module provides:
//! - A line model that splits a document without losing a single byte
//! - A locator that finds the unique table owning a given name
//! - An editor that rewrites only the located line range
//! - Fragment-only decoding, so malformed text elsewhere in the file
//!   cannot block reading the table we care about
//!
//! Everything outside the located range is opaque: comments, blank lines
//! and unrelated tables survive a rewrite byte-for-byte.

pub mod decode;
pub mod document;
pub mod editor;
pub mod locator;

pub use decode::decode_table;
pub use document::Document;
pub use editor::{rewrite, Rewrite};
pub use locator::{locate, Fragment};

use thiserror::Error;

/// Errors raised while locating or decoding a table fragment.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// More than one header line owns the requested table name.
    #[error("found {count} [{table}] tables; expected exactly one")]
    Ambiguous { table: String, count: usize },

    /// The fragment's own lines are not valid TOML.
    #[error("invalid TOML in [{table}] table: {source}")]
    Decode {
        table: String,
        #[source]
        source: Box<toml::de::Error>,
    },
}
