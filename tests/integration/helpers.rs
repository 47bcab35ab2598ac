//! Shared fixtures for integration tests

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Creates a temporary packwiz pack backed by a git repository, with the
/// tracked index files committed.
///
/// Returns a TempDir that must be kept in scope for the lifetime of the test.
pub fn create_temp_pack_repo() -> Result<TempDir> {
    let temp = TempDir::new().context("Failed to create temp directory")?;
    let path = temp.path();

    git(path, &["init"])?;
    git(path, &["config", "user.email", "test@test.com"])?;
    git(path, &["config", "user.name", "Test User"])?;

    std::fs::write(path.join("pack.toml"), "name = \"Test Pack\"\n")
        .context("Failed to write pack.toml")?;
    std::fs::write(path.join("index.toml"), "hash-format = \"sha256\"\nfiles = []\n")
        .context("Failed to write index.toml")?;
    std::fs::create_dir_all(path.join("mods")).context("Failed to create mods directory")?;

    git(path, &["add", "."])?;
    git(path, &["commit", "-m", "initial pack"])?;

    Ok(temp)
}

/// Run a git command in the given directory, failing the test on error.
pub fn git(dir: &Path, args: &[&str]) -> Result<()> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
    anyhow::ensure!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(())
}

/// A complete, valid mods.toml document with surrounding content that must
/// survive edits untouched.
pub fn valid_mods_toml() -> &'static str {
    "\
# Project metadata\n\
[mod]\n\
name = \"Test Mod\"  # display name\n\
\n\
[mc-publish]\n\
modrinth = \"AANobbMI\"\n\
curseforge = \"238222\"\n\
loader = \"forge\"\n\
mc_version = \"1.20.1\"\n\
modrinth_slug = \"sodium\"\n\
curseforge_slug = \"sodium\"\n"
}
