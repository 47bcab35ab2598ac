//! End-to-end sync reconciliation against a real git working tree

use modsync::output::GithubOutput;
use modsync::packwiz::ToolOutput;
use modsync::sync::{
    reconcile, AttemptOutcome, Platform, SyncAction, SyncBackend, SyncConfig, SyncOutcome,
    SyncTarget,
};
use serial_test::serial;
use std::path::Path;
use std::time::Duration;

use crate::helpers::{create_temp_pack_repo, git};

/// Backend that scripts packwiz results and, on success, emulates packwiz
/// by rewriting the pack's tracked index. The working-tree probe is the
/// real one, so convergence is detected exactly as in production.
struct EmulatedPackwiz {
    results: Vec<ToolOutput>,
    calls: usize,
    mutate_on_success: bool,
}

impl EmulatedPackwiz {
    fn new(results: Vec<ToolOutput>) -> Self {
        EmulatedPackwiz {
            results,
            calls: 0,
            mutate_on_success: true,
        }
    }
}

impl SyncBackend for EmulatedPackwiz {
    fn run_tool(&mut self, _args: &[&str], pack_dir: &Path, _timeout: Duration) -> ToolOutput {
        let result = self.results.get(self.calls).cloned().unwrap_or(ToolOutput {
            success: false,
            output: "unexpected call".to_string(),
        });
        self.calls += 1;

        if result.success && self.mutate_on_success {
            std::fs::write(
                pack_dir.join("index.toml"),
                "hash-format = \"sha256\"\nfiles = [\"mods/sodium.pw.toml\"]\n",
            )
            .unwrap();
            std::fs::write(
                pack_dir.join("mods").join("sodium.pw.toml"),
                "name = \"Sodium\"\n\n[update.modrinth]\nslug = \"sodium\"\n",
            )
            .unwrap();
        }

        result
    }

    fn version_visible(&mut self, _target: &SyncTarget) -> Option<bool> {
        None
    }

    fn has_changes(&mut self, pack_dir: &Path) -> bool {
        modsync::git::has_uncommitted_changes(pack_dir).unwrap_or(false)
    }
}

fn ok() -> ToolOutput {
    ToolOutput {
        success: true,
        output: "Added mod".to_string(),
    }
}

fn not_found() -> ToolOutput {
    ToolOutput {
        success: false,
        output: "Error: could not find that project".to_string(),
    }
}

fn test_config(max_attempts: u32) -> SyncConfig {
    SyncConfig {
        max_attempts,
        retry_interval: Duration::ZERO,
        tool_timeout: Duration::from_secs(1),
    }
}

fn target_for(pack_dir: &Path) -> SyncTarget {
    SyncTarget {
        pack_dir: pack_dir.to_path_buf(),
        slug: "sodium".to_string(),
        platform: Platform::Modrinth,
        version: "1.2.3".to_string(),
        mc_version: "1.20.1".to_string(),
        loader: "forge".to_string(),
    }
}

#[test]
fn converges_once_the_tracked_index_changes() {
    let pack = create_temp_pack_repo().unwrap();
    let mut backend = EmulatedPackwiz::new(vec![not_found(), not_found(), ok()]);

    let report = reconcile(&mut backend, &test_config(3), &target_for(pack.path()), None);

    assert!(report.converged());
    assert_eq!(report.action, SyncAction::Add);
    assert_eq!(
        report.attempts,
        vec![
            AttemptOutcome::SkippedNotYetVisible,
            AttemptOutcome::SkippedNotYetVisible,
            AttemptOutcome::Converged,
        ]
    );
}

#[test]
fn clean_tree_after_tool_success_is_not_trusted() {
    let pack = create_temp_pack_repo().unwrap();
    let mut backend = EmulatedPackwiz::new(vec![ok(), ok()]);
    backend.mutate_on_success = false;

    let report = reconcile(&mut backend, &test_config(2), &target_for(pack.path()), None);

    assert_eq!(report.outcome, SyncOutcome::TimedOut);
    assert_eq!(
        report.attempts,
        vec![
            AttemptOutcome::NoChangeDetected,
            AttemptOutcome::NoChangeDetected,
        ]
    );
    assert_eq!(backend.calls, 2);
}

#[test]
fn committed_descriptor_selects_update_action() {
    let pack = create_temp_pack_repo().unwrap();
    std::fs::write(
        pack.path().join("mods").join("sodium.pw.toml"),
        "name = \"Sodium\"\n\n[update.modrinth]\nslug = \"sodium\"\n",
    )
    .unwrap();
    git(pack.path(), &["add", "."]).unwrap();
    git(pack.path(), &["commit", "-m", "add sodium"]).unwrap();

    let mut backend = EmulatedPackwiz::new(vec![ok()]);

    let report = reconcile(&mut backend, &test_config(1), &target_for(pack.path()), None);

    assert!(report.converged());
    assert_eq!(report.action, SyncAction::Update);
}

#[test]
#[serial]
fn action_is_recorded_in_the_output_sink() {
    let pack = create_temp_pack_repo().unwrap();
    let output_file = pack.path().join("github_output");
    std::env::set_var("GITHUB_OUTPUT", &output_file);

    let sink = GithubOutput::from_env().unwrap();
    let mut backend = EmulatedPackwiz::new(vec![ok()]);

    reconcile(
        &mut backend,
        &test_config(1),
        &target_for(pack.path()),
        Some(&sink),
    );

    let content = std::fs::read_to_string(&output_file).unwrap();
    assert!(content.contains("action=add\n"));

    std::env::remove_var("GITHUB_OUTPUT");
}
