//! Release metadata: required keys, validation, and the mods.toml scan
//!
//! The `[mc-publish]` table in a mod repository's mods.toml is the single
//! source of truth for release metadata. Validation normalizes the decoded
//! table, reports every missing key in one pass, rejects unexpanded CI
//! template placeholders, and restricts the loader to the supported set.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the table that carries release metadata.
pub const TABLE_NAME: &str = "mc-publish";

/// Required keys, in the order they are exported and written.
pub const REQUIRED_KEYS: [&str; 6] = [
    "modrinth",
    "curseforge",
    "loader",
    "mc_version",
    "modrinth_slug",
    "curseforge_slug",
];

/// Loaders the release workflow supports.
pub const ALLOWED_LOADERS: [&str; 1] = ["forge"];

/// Start of an unexpanded template substitution, e.g. `${{ inputs.version }}`.
const PLACEHOLDER_MARKER: &str = "${";

#[derive(Debug, Error)]
pub enum MetadataError {
    /// One or more required keys are absent or blank. Lists every offender.
    #[error("missing required keys: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A key is present but carries an unacceptable value.
    #[error("invalid value for [{TABLE_NAME}].{key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Validated release metadata. Constructed only by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub modrinth: String,
    pub curseforge: String,
    pub loader: String,
    pub mc_version: String,
    pub modrinth_slug: String,
    pub curseforge_slug: String,
}

impl MetadataRecord {
    /// Key/value pairs for the CI output sink, in export order.
    pub fn output_pairs(&self) -> [(&'static str, &str); 6] {
        [
            ("modrinth_id", self.modrinth.as_str()),
            ("curseforge_id", self.curseforge.as_str()),
            ("loader", self.loader.as_str()),
            ("mc_version", self.mc_version.as_str()),
            ("modrinth_slug", self.modrinth_slug.as_str()),
            ("curseforge_slug", self.curseforge_slug.as_str()),
        ]
    }
}

/// Normalize a decoded value: strings are trimmed (blank counts as missing),
/// other scalars are stringified. Arrays and tables are never valid metadata
/// values and count as missing.
fn normalize(value: Option<&toml::Value>) -> Option<String> {
    match value {
        None => None,
        Some(toml::Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(toml::Value::Integer(i)) => Some(i.to_string()),
        Some(toml::Value::Float(f)) => Some(f.to_string()),
        Some(toml::Value::Boolean(b)) => Some(b.to_string()),
        Some(toml::Value::Datetime(d)) => Some(d.to_string()),
        Some(toml::Value::Array(_)) | Some(toml::Value::Table(_)) => None,
    }
}

/// Validate a decoded `[mc-publish]` table into a [`MetadataRecord`].
pub fn validate(table: &toml::value::Table) -> Result<MetadataRecord, MetadataError> {
    let mut missing = Vec::new();
    let mut values = Vec::new();

    for key in REQUIRED_KEYS {
        match normalize(table.get(key)) {
            Some(value) => values.push((key, value)),
            None => missing.push(format!("[{TABLE_NAME}].{key}")),
        }
    }

    if !missing.is_empty() {
        return Err(MetadataError::MissingKeys(missing));
    }

    for (key, value) in &values {
        if value.contains(PLACEHOLDER_MARKER) {
            return Err(MetadataError::InvalidValue {
                key: key.to_string(),
                reason: format!("contains unexpanded template placeholder: {value}"),
            });
        }
    }

    let get = |key: &str| -> String {
        values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };

    let loader = get("loader");
    if !ALLOWED_LOADERS.contains(&loader.as_str()) {
        return Err(MetadataError::InvalidValue {
            key: "loader".to_string(),
            reason: format!(
                "must be one of: {}. Found: {loader}",
                ALLOWED_LOADERS.join(", ")
            ),
        });
    }

    Ok(MetadataRecord {
        modrinth: get("modrinth"),
        curseforge: get("curseforge"),
        loader,
        mc_version: get("mc_version"),
        modrinth_slug: get("modrinth_slug"),
        curseforge_slug: get("curseforge_slug"),
    })
}

/// Find the single mods.toml under `root`, ignoring build output trees.
pub fn find_mods_toml(root: &Path) -> Result<PathBuf> {
    let pattern = format!("{}/**/mods.toml", root.display());
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("invalid search pattern: {pattern}"))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter(|path| !path.components().any(|c| c.as_os_str() == "build"))
        .collect();
    matches.sort();

    match matches.as_slice() {
        [] => bail!(
            "No mods.toml found under {}. Expected a single mods.toml with a [{TABLE_NAME}] table containing required keys.",
            root.display()
        ),
        [path] => Ok(path.clone()),
        _ => {
            let listed = matches
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            bail!("Multiple mods.toml files found; expected exactly one:\n{listed}");
        }
    }
}
