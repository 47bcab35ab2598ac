//! CI output sink
//!
//! GitHub Actions exposes an append-only key=value file through the
//! GITHUB_OUTPUT environment variable. Exported metadata and the sync
//! action are written there, one `key=value` line each; diagnostics never
//! are.

use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Append-only `key=value` sink backed by the file GITHUB_OUTPUT points at.
#[derive(Debug, Clone)]
pub struct GithubOutput {
    path: PathBuf,
}

impl GithubOutput {
    /// The sink, if GITHUB_OUTPUT is set. Callers that can work without a
    /// sink (the sync loop) use this.
    pub fn from_env() -> Option<Self> {
        match std::env::var(OUTPUT_ENV) {
            Ok(path) if !path.is_empty() => Some(GithubOutput { path: path.into() }),
            _ => None,
        }
    }

    /// The sink, failing when GITHUB_OUTPUT is unset. Callers that exist to
    /// export values (metadata validate --write-outputs) use this.
    pub fn require_from_env() -> Result<Self> {
        match Self::from_env() {
            Some(sink) => Ok(sink),
            None => bail!("{OUTPUT_ENV} is not set; cannot write outputs."),
        }
    }

    /// Append one `key=value` line.
    pub fn append(&self, key: &str, value: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file {}", self.path.display()))?;
        writeln!(file, "{key}={value}")
            .with_context(|| format!("Failed to write output {key}"))?;
        Ok(())
    }
}
