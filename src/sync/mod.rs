//! Sync reconciliation: add or update a mod in a packwiz pack
//!
//! A freshly published version is often not visible upstream yet, and
//! packwiz's exit status alone cannot distinguish "updated the index" from
//! "found nothing to do". The reconciler therefore runs a bounded retry
//! loop and only declares success once the pack's working tree shows an
//! actual change:
//!
//! ```text
//! Start -> Polling -> { Converged, TimedOut }
//! ```
//!
//! Each attempt records one [`AttemptOutcome`]; the full sequence is
//! returned in the [`SyncReport`] so callers and tests can observe exactly
//! what happened.

use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::git;
use crate::modrinth;
use crate::output::GithubOutput;
use crate::pack;
use crate::packwiz::{self, ToolOutput};

/// Hosting platform a mod is synced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Modrinth,
    CurseForge,
}

impl Platform {
    /// The packwiz subcommand that adds mods from this platform.
    pub fn packwiz_subcommand(&self) -> &'static str {
        match self {
            Platform::Modrinth => "mr",
            Platform::CurseForge => "cf",
        }
    }

    /// Whether the platform exposes a version-visibility query we can poll
    /// before spending a packwiz invocation.
    pub fn supports_version_poll(&self) -> bool {
        matches!(self, Platform::Modrinth)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Modrinth => write!(f, "modrinth"),
            Platform::CurseForge => write!(f, "curseforge"),
        }
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mr" | "modrinth" => Ok(Platform::Modrinth),
            "cf" | "curseforge" => Ok(Platform::CurseForge),
            _ => anyhow::bail!("Unknown platform: {s}. Expected 'mr' or 'cf'"),
        }
    }
}

/// Whether the run adds a new mod or updates an existing one. Decided once
/// at the start of a run and fixed for its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Add,
    Update,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Add => write!(f, "add"),
            SyncAction::Update => write!(f, "update"),
        }
    }
}

/// Outcome of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The version is not visible upstream yet (reported by the poll or by
    /// the tool's not-found output).
    SkippedNotYetVisible,
    /// The tool failed for an unclear reason; treated as transient.
    ToolErrorRetryable,
    /// The tool succeeded but the working tree did not change.
    NoChangeDetected,
    /// The tool succeeded and the working tree changed.
    Converged,
}

/// Final state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Converged,
    TimedOut,
}

/// One mod to reconcile into one pack. Immutable for the whole run.
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub pack_dir: PathBuf,
    pub slug: String,
    pub platform: Platform,
    pub version: String,
    pub mc_version: String,
    pub loader: String,
}

/// Retry policy for a run. Threaded in explicitly so tests can use a zero
/// interval and a small budget.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub max_attempts: u32,
    pub retry_interval: Duration,
    pub tool_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_attempts: 20,
            retry_interval: Duration::from_secs(60),
            tool_timeout: packwiz::DEFAULT_TOOL_TIMEOUT,
        }
    }
}

/// What a completed run observed.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub action: SyncAction,
    pub attempts: Vec<AttemptOutcome>,
    pub outcome: SyncOutcome,
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn converged(&self) -> bool {
        self.outcome == SyncOutcome::Converged
    }
}

/// External effects the reconciler depends on: the packwiz binary, the
/// Modrinth API, and the pack's git working tree. Production uses
/// [`PackwizBackend`]; tests script each signal.
pub trait SyncBackend {
    /// Run the tool with the given arguments in the pack directory.
    fn run_tool(&mut self, args: &[&str], pack_dir: &Path, timeout: Duration) -> ToolOutput;

    /// Whether the target version is visible upstream. `None` means the
    /// query failed and nothing is known either way.
    fn version_visible(&mut self, target: &SyncTarget) -> Option<bool>;

    /// Whether the pack working tree has uncommitted changes. A probe
    /// failure counts as "no change observed".
    fn has_changes(&mut self, pack_dir: &Path) -> bool;
}

/// Backend wired to the real packwiz binary, Modrinth API and git.
#[derive(Default)]
pub struct PackwizBackend {
    client: Option<reqwest::blocking::Client>,
}

impl PackwizBackend {
    pub fn new() -> Self {
        PackwizBackend { client: None }
    }
}

impl SyncBackend for PackwizBackend {
    fn run_tool(&mut self, args: &[&str], pack_dir: &Path, timeout: Duration) -> ToolOutput {
        packwiz::run_packwiz(args, pack_dir, timeout)
    }

    fn version_visible(&mut self, target: &SyncTarget) -> Option<bool> {
        if self.client.is_none() {
            self.client = modrinth::create_http_client().ok();
        }
        let client = self.client.as_ref()?;
        modrinth::version_visible(
            client,
            &target.slug,
            &target.version,
            &target.mc_version,
            &target.loader,
        )
        .ok()
    }

    fn has_changes(&mut self, pack_dir: &Path) -> bool {
        git::has_uncommitted_changes(pack_dir).unwrap_or(false)
    }
}

/// Decide whether this run adds or updates, from the pack's descriptors.
pub fn determine_action(slug: &str, pack_dir: &Path) -> SyncAction {
    if pack::mod_exists_in_pack(slug, pack_dir) {
        SyncAction::Update
    } else {
        SyncAction::Add
    }
}

/// Run one reconciliation to completion.
///
/// The action is fixed at the start of the run; a descriptor that appears
/// mid-run via some concurrent process is not re-detected. When a sink is
/// given, the chosen action is recorded there before the first attempt.
pub fn reconcile(
    backend: &mut dyn SyncBackend,
    config: &SyncConfig,
    target: &SyncTarget,
    sink: Option<&GithubOutput>,
) -> SyncReport {
    let start = Instant::now();
    let action = determine_action(&target.slug, &target.pack_dir);

    println!(
        "{} {} {} via {}",
        "→".cyan().bold(),
        match action {
            SyncAction::Add => "Adding",
            SyncAction::Update => "Updating",
        },
        target.slug,
        target.platform
    );

    if let Some(sink) = sink {
        if let Err(err) = sink.append("action", &action.to_string()) {
            eprintln!("{} failed to record action: {err:#}", "⚠".yellow());
        }
    }

    let mut attempts = Vec::new();

    for attempt in 1..=config.max_attempts {
        // Poll the platform before spending a tool invocation; only a
        // definitive "not visible" skips the attempt.
        if attempt > 1
            && target.platform.supports_version_poll()
            && backend.version_visible(target) == Some(false)
        {
            println!(
                "Attempt {attempt}/{}: version not on {} yet",
                config.max_attempts, target.platform
            );
            attempts.push(AttemptOutcome::SkippedNotYetVisible);
            pause_between_attempts(config, attempt);
            continue;
        }

        let subcommand = target.platform.packwiz_subcommand();
        let args: Vec<&str> = match action {
            SyncAction::Add => vec![subcommand, "add", &target.slug, "-y"],
            SyncAction::Update => vec!["update", &target.slug],
        };

        let result = backend.run_tool(&args, &target.pack_dir, config.tool_timeout);

        if !result.success {
            let lower = result.output.to_lowercase();
            if lower.contains("could not find") || lower.contains("no results") {
                println!(
                    "Attempt {attempt}/{}: mod/version not found yet",
                    config.max_attempts
                );
                attempts.push(AttemptOutcome::SkippedNotYetVisible);
            } else {
                eprintln!("{} packwiz error: {}", "⚠".yellow(), result.output.trim());
                attempts.push(AttemptOutcome::ToolErrorRetryable);
            }
            pause_between_attempts(config, attempt);
            continue;
        }

        if backend.has_changes(&target.pack_dir) {
            attempts.push(AttemptOutcome::Converged);
            println!(
                "{} {action} completed for {}",
                "✓".green().bold(),
                target.slug
            );
            return SyncReport {
                action,
                attempts,
                outcome: SyncOutcome::Converged,
                elapsed: start.elapsed(),
            };
        }

        println!(
            "Attempt {attempt}/{}: no changes detected",
            config.max_attempts
        );
        attempts.push(AttemptOutcome::NoChangeDetected);
        pause_between_attempts(config, attempt);
    }

    SyncReport {
        action,
        attempts,
        outcome: SyncOutcome::TimedOut,
        elapsed: start.elapsed(),
    }
}

/// Sleep the retry interval, except after the final budgeted attempt.
fn pause_between_attempts(config: &SyncConfig, attempt: u32) {
    if attempt < config.max_attempts && !config.retry_interval.is_zero() {
        std::thread::sleep(config.retry_interval);
    }
}
