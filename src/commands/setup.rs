//! One-time repository setup for the release workflow
//!
//! Configures the GitHub Actions variables and secrets the reusable
//! release workflow consumes, at repo or org scope, through the gh CLI.
//! Existing values are fetched once up front so each item can offer
//! "use existing" instead of forcing re-entry.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::collections::{HashMap, HashSet};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output};

/// One variable or secret the workflow consumes.
struct ConfigItem {
    name: &'static str,
    description: &'static str,
    is_secret: bool,
    required: bool,
    default: &'static str,
}

const VARIABLES: [ConfigItem; 4] = [
    ConfigItem {
        name: "MODRINTH_ID",
        description: "Modrinth project ID",
        is_secret: false,
        required: false,
        default: "",
    },
    ConfigItem {
        name: "CF_ID",
        description: "CurseForge project ID",
        is_secret: false,
        required: false,
        default: "",
    },
    ConfigItem {
        name: "ENABLE_MODRINTH_SYNC",
        description: "Enable Modrinth modpack sync (true/false)",
        is_secret: false,
        required: false,
        default: "false",
    },
    ConfigItem {
        name: "ENABLE_CURSEFORGE_SYNC",
        description: "Enable CurseForge modpack sync (true/false)",
        is_secret: false,
        required: false,
        default: "false",
    },
];

const SECRETS: [ConfigItem; 3] = [
    ConfigItem {
        name: "GH_TOKEN",
        description: "GitHub PAT with repo access",
        is_secret: true,
        required: true,
        default: "",
    },
    ConfigItem {
        name: "MODRINTH_TOKEN",
        description: "Modrinth API token",
        is_secret: true,
        required: false,
        default: "",
    },
    ConfigItem {
        name: "CURSEFORGE_TOKEN",
        description: "CurseForge API token",
        is_secret: true,
        required: false,
        default: "",
    },
];

/// Run gh without the ambient GITHUB_TOKEN, which would shadow the
/// credentials gh is authenticated with.
fn run_gh(args: &[&str]) -> Result<Output> {
    Command::new("gh")
        .args(args)
        .env_remove("GITHUB_TOKEN")
        .output()
        .with_context(|| format!("Failed to execute: gh {}", args.join(" ")))
}

fn require_tools() -> Result<()> {
    if which::which("gh").is_err() {
        bail!("gh CLI required. Install from https://cli.github.com/");
    }
    Ok(())
}

/// Current repo's owner and name from gh.
fn repo_info() -> Result<(String, String)> {
    let output = run_gh(&["repo", "view", "--json", "owner,name"])?;
    if !output.status.success() {
        bail!("Not in a GitHub repository or gh not authenticated.\nRun 'gh auth login' first.");
    }
    let data: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("Failed to parse gh repo view output")?;
    let owner = data["owner"]["login"]
        .as_str()
        .context("gh repo view output missing owner")?
        .to_string();
    let name = data["name"]
        .as_str()
        .context("gh repo view output missing name")?
        .to_string();
    Ok((owner, name))
}

/// Existing secrets/variables, fetched once at startup.
#[derive(Default)]
struct ExistingValues {
    repo_secrets: HashSet<String>,
    org_secrets: HashSet<String>,
    repo_vars: HashMap<String, String>,
    org_vars: HashMap<String, String>,
}

impl ExistingValues {
    fn fetch(org: &str, repo: &str) -> Self {
        let mut existing = ExistingValues::default();

        for entry in list_json(&["secret", "list", "--json", "name"], None) {
            if let Some(name) = entry["name"].as_str() {
                existing.repo_secrets.insert(name.to_string());
            }
        }
        for entry in list_json(&["variable", "list", "--json", "name,value"], None) {
            if let Some(name) = entry["name"].as_str() {
                existing.repo_vars.insert(
                    name.to_string(),
                    entry["value"].as_str().unwrap_or_default().to_string(),
                );
            }
        }

        // Org secrets/vars visible to this repo; does not require org admin.
        let secrets_api = format!("repos/{org}/{repo}/actions/organization-secrets");
        for entry in list_json(&["api", &secrets_api], Some("secrets")) {
            if let Some(name) = entry["name"].as_str() {
                existing.org_secrets.insert(name.to_string());
            }
        }
        let vars_api = format!("repos/{org}/{repo}/actions/organization-variables");
        for entry in list_json(&["api", &vars_api], Some("variables")) {
            if let Some(name) = entry["name"].as_str() {
                existing.org_vars.insert(
                    name.to_string(),
                    entry["value"].as_str().unwrap_or_default().to_string(),
                );
            }
        }

        existing
    }

    /// Returns (repo_value, org_value); secret values are masked.
    fn get(&self, name: &str, is_secret: bool) -> (Option<String>, Option<String>) {
        if is_secret {
            let mask = |present: bool| present.then(|| "***".to_string());
            (
                mask(self.repo_secrets.contains(name)),
                mask(self.org_secrets.contains(name)),
            )
        } else {
            (
                self.repo_vars.get(name).cloned(),
                self.org_vars.get(name).cloned(),
            )
        }
    }
}

/// Run a gh command and pull a JSON array out of its output, tolerating
/// failures (a missing scope or endpoint just yields no entries).
fn list_json(args: &[&str], key: Option<&str>) -> Vec<serde_json::Value> {
    let Ok(output) = run_gh(args) else {
        return Vec::new();
    };
    if !output.status.success() {
        return Vec::new();
    }
    let Ok(data) = serde_json::from_slice::<serde_json::Value>(&output.stdout) else {
        return Vec::new();
    };
    let list = match key {
        Some(key) => data.get(key).cloned().unwrap_or_default(),
        None => data,
    };
    list.as_array().cloned().unwrap_or_default()
}

fn set_value(name: &str, value: &str, is_secret: bool, at_org: bool, org: &str) -> bool {
    let kind = if is_secret { "secret" } else { "variable" };
    let mut args = vec![kind, "set", name, "--body", value];
    if at_org {
        args.extend(["--org", org]);
    }
    run_gh(&args)
        .map(|output| output.status.success())
        .unwrap_or(false)
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Numbered menu; blank or invalid input selects nothing.
fn choose(options: &[String]) -> Result<Option<usize>> {
    for (idx, option) in options.iter().enumerate() {
        println!("  {}) {option}", idx + 1);
    }
    let answer = prompt("Choice: ")?;
    match answer.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Ok(Some(n - 1)),
        _ => Ok(None),
    }
}

fn configure_item(
    item: &ConfigItem,
    org: &str,
    existing: &ExistingValues,
    actions: &mut Vec<String>,
) -> Result<()> {
    println!("\n{}", "=".repeat(50));
    println!("{}: {}", item.name.bold(), item.description);
    if item.required {
        println!("{}", "(REQUIRED)".yellow());
    }

    let (repo_value, org_value) = existing.get(item.name, item.is_secret);
    let existing_scope = if repo_value.is_some() {
        Some("repo")
    } else if org_value.is_some() {
        Some("org")
    } else {
        None
    };
    let existing_display = repo_value.or(org_value);

    let mut options = vec!["Set repo value".to_string(), "Set org value".to_string()];
    if let (Some(scope), Some(display)) = (existing_scope, existing_display.as_deref()) {
        options.push(format!("Use existing ({scope}: {display})"));
    } else if !item.required {
        options.push("Skip".to_string());
    }

    let choice = match choose(&options)? {
        Some(idx) => options[idx].clone(),
        None => {
            println!("Skipped");
            return Ok(());
        }
    };

    if choice == "Skip" {
        println!("Skipped");
        return Ok(());
    }

    if choice.starts_with("Use existing") {
        println!("Using existing value");
        actions.push(format!(
            "{}: using existing ({})",
            item.name,
            existing_scope.unwrap_or("repo")
        ));
        return Ok(());
    }

    let at_org = choice.contains("org");

    let message = if item.default.is_empty() {
        "Enter value: ".to_string()
    } else {
        format!("Enter value [{}]: ", item.default)
    };
    let mut value = prompt(&message)?;
    if value.is_empty() {
        value = item.default.to_string();
    }

    if value.is_empty() {
        if item.required {
            println!("{} {} is required", "✗".red().bold(), item.name);
        } else {
            println!("Skipped (no value)");
        }
        return Ok(());
    }

    if set_value(item.name, &value, item.is_secret, at_org, org) {
        let scope = if at_org { "org" } else { "repo" };
        println!("{} Set {} at {scope} level", "✓".green().bold(), item.name);
        actions.push(format!("{}: set at {scope} level", item.name));
    } else {
        println!("{} Failed to set {}", "✗".red().bold(), item.name);
    }

    Ok(())
}

/// Warn when no workflow under .github/workflows references the reusable
/// release workflow.
fn check_workflow_file() {
    let workflows_dir = Path::new(".github/workflows");
    if workflows_dir.exists() {
        let entries = std::fs::read_dir(workflows_dir)
            .map(|entries| entries.flatten().collect::<Vec<_>>())
            .unwrap_or_default();
        for entry in entries {
            let path = entry.path();
            let is_workflow = path
                .extension()
                .map(|ext| ext == "yml" || ext == "yaml")
                .unwrap_or(false);
            if !is_workflow {
                continue;
            }
            if let Ok(content) = std::fs::read_to_string(&path) {
                if content.contains("mod-release-workflow") {
                    println!("Found workflow: {}", path.display());
                    return;
                }
            }
        }
    }

    println!(
        "\n{} No mod-release-workflow found in .github/workflows/",
        "⚠".yellow()
    );
    println!("Copy caller-template.yaml first");
}

/// Execute the setup command.
pub fn execute() -> Result<()> {
    println!("{}", "=".repeat(50));
    println!("{}", "Mod Release Workflow Setup".bold());
    println!("{}", "=".repeat(50));

    require_tools()?;

    let (org, repo) = repo_info()?;
    println!("\nRepository: {org}/{repo}");

    check_workflow_file();

    println!("\nFetching existing values...");
    let existing = ExistingValues::fetch(&org, &repo);

    let mut actions = Vec::new();
    for item in VARIABLES.iter().chain(SECRETS.iter()) {
        configure_item(item, &org, &existing, &mut actions)?;
    }

    println!("\n{}", "=".repeat(50));
    println!("{}", "Setup complete!".green().bold());
    println!("{}", "=".repeat(50));

    if actions.is_empty() {
        println!("\nNo changes made.");
    } else {
        println!("\nSummary:");
        for action in &actions {
            println!("  - {action}");
        }
    }

    Ok(())
}
