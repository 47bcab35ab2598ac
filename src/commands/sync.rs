//! Sync a mod into a packwiz modpack

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::output::GithubOutput;
use crate::packwiz;
use crate::sync::{reconcile, PackwizBackend, Platform, SyncConfig, SyncTarget};

/// Execute the sync command: add or update one mod, retrying until the
/// pack index observably changes or the attempt budget runs out.
#[allow(clippy::too_many_arguments)]
pub fn execute(
    pack_dir: PathBuf,
    slug: String,
    platform: String,
    version: String,
    mc_version: String,
    loader: String,
    max_attempts: Option<u32>,
    retry_interval_secs: Option<u64>,
) -> Result<()> {
    let platform = Platform::from_str(&platform)?;

    if !pack_dir.exists() {
        bail!("Pack directory {} does not exist", pack_dir.display());
    }

    packwiz::check_packwiz_available()?;

    let mut config = SyncConfig::default();
    if let Some(max_attempts) = max_attempts {
        config.max_attempts = max_attempts;
    }
    if let Some(secs) = retry_interval_secs {
        config.retry_interval = Duration::from_secs(secs);
    }

    let target = SyncTarget {
        pack_dir,
        slug,
        platform,
        version,
        mc_version,
        loader,
    };

    let sink = GithubOutput::from_env();
    let mut backend = PackwizBackend::new();

    let report = reconcile(&mut backend, &config, &target, sink.as_ref());

    if !report.converged() {
        bail!(
            "Sync for {} timed out after {} attempts ({}s elapsed)",
            target.slug,
            report.attempts.len(),
            report.elapsed.as_secs()
        );
    }

    println!(
        "{} Synced {} in {} attempt{}",
        "✓".green().bold(),
        target.slug,
        report.attempts.len(),
        if report.attempts.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
