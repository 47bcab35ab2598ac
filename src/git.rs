//! Git subprocess runner and working-tree probe
//!
//! The sync loop does not trust packwiz's exit status alone; it confirms
//! convergence by observing an actual working-tree change in the pack
//! repository.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Run a git command in `repo_root` and return the raw Output.
pub fn run_git(args: &[&str], repo_root: &Path) -> Result<Output> {
    Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .with_context(|| format!("Failed to execute: git {}", args.join(" ")))
}

/// Check if the repository has uncommitted changes (staged or unstaged).
///
/// Uses `git status --porcelain`. Untracked files (`??`) are not counted:
/// a packwiz add/update always rewrites the tracked index files, so tracked
/// modifications are the reliable convergence signal.
pub fn has_uncommitted_changes(repo_root: &Path) -> Result<bool> {
    let output = run_git(&["status", "--porcelain"], repo_root)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("git status failed: {stderr}");
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let has_changes = stdout
        .lines()
        .any(|line| !line.starts_with("??") && !line.is_empty());

    Ok(has_changes)
}
