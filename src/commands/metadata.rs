//! Validate, export and edit the [mc-publish] table in mods.toml

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::fragment::{decode_table, locate, rewrite, Document};
use crate::metadata::{self, TABLE_NAME};
use crate::output::GithubOutput;

/// Values for `metadata set`, one optional flag per required key.
#[derive(Debug, Default, Clone)]
pub struct SetValues {
    pub modrinth: Option<String>,
    pub curseforge: Option<String>,
    pub loader: Option<String>,
    pub mc_version: Option<String>,
    pub modrinth_slug: Option<String>,
    pub curseforge_slug: Option<String>,
}

impl SetValues {
    /// Provided keys as ordered pairs, in required-key order.
    fn entries(&self) -> Vec<(String, String)> {
        [
            ("modrinth", &self.modrinth),
            ("curseforge", &self.curseforge),
            ("loader", &self.loader),
            ("mc_version", &self.mc_version),
            ("modrinth_slug", &self.modrinth_slug),
            ("curseforge_slug", &self.curseforge_slug),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.clone())))
        .collect()
    }
}

/// Execute `metadata validate`.
///
/// Finds the single mods.toml under the root, validates its [mc-publish]
/// table, and optionally exports the values to the CI output sink.
pub fn validate(root: Option<PathBuf>, write_outputs: bool) -> Result<()> {
    let root = root.unwrap_or_else(|| PathBuf::from("."));
    let path = metadata::find_mods_toml(&root)?;
    let record = read_record(&path)?;

    println!(
        "{} Validated mods.toml at {}",
        "✓".green().bold(),
        path.display()
    );

    if write_outputs {
        let sink = GithubOutput::require_from_env()?;
        for (key, value) in record.output_pairs() {
            sink.append(key, value)?;
        }
    }

    Ok(())
}

fn read_record(path: &Path) -> Result<metadata::MetadataRecord> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = Document::parse(&raw);

    let fragment = locate(&doc, TABLE_NAME)
        .with_context(|| format!("in {}", path.display()))?
        .with_context(|| format!("Missing [{TABLE_NAME}] table in {}", path.display()))?;

    let table = decode_table(&doc, &fragment, TABLE_NAME)
        .with_context(|| format!("in {}", path.display()))?;

    metadata::validate(&table).with_context(|| format!("in {}", path.display()))
}

/// Execute `metadata set`.
///
/// Rewrites only the [mc-publish] table, leaving the rest of the file
/// byte-for-byte intact, and skips the write entirely when nothing would
/// change.
pub fn set(file: Option<PathBuf>, values: &SetValues) -> Result<()> {
    let entries = values.entries();
    if entries.is_empty() {
        bail!("No values given; pass at least one of the [{TABLE_NAME}] keys to set.");
    }

    let path = match file {
        Some(path) => path,
        None => metadata::find_mods_toml(Path::new("."))?,
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = Document::parse(&raw);

    let fragment = locate(&doc, TABLE_NAME).with_context(|| format!("in {}", path.display()))?;

    let result = rewrite(&doc, fragment.as_ref(), TABLE_NAME, &entries);

    if !result.changed {
        println!("{} {} already up to date", "✓".green().bold(), path.display());
        return Ok(());
    }

    fs::write(&path, &result.text)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!(
        "{} Updated [{TABLE_NAME}] in {} ({} key{})",
        "✓".green().bold(),
        path.display(),
        entries.len(),
        if entries.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
