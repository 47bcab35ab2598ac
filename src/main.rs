use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use modsync::commands::{metadata, setup, sync};
use modsync::completions::{generate_completions, Shell};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "modsync")]
#[command(about = "Mod release metadata and modpack sync CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the [mc-publish] table in mods.toml
    Metadata {
        #[command(subcommand)]
        command: MetadataCommands,
    },

    /// Add or update a mod in a packwiz modpack, retrying until the index
    /// observably changes
    Sync {
        /// Path to the packwiz pack directory
        pack_dir: PathBuf,

        /// Mod slug to sync
        slug: String,

        /// Hosting platform: mr (Modrinth) or cf (CurseForge)
        platform: String,

        /// Version string expected to appear upstream
        version: String,

        /// Target Minecraft version
        mc_version: String,

        /// Mod loader
        loader: String,

        /// Maximum number of attempts before giving up
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Seconds to wait between attempts
        #[arg(long)]
        retry_interval: Option<u64>,
    },

    /// Configure repository variables and secrets for the release workflow
    Setup,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum MetadataCommands {
    /// Validate the [mc-publish] table and optionally export it
    Validate {
        /// Write parsed values to GITHUB_OUTPUT
        #[arg(long)]
        write_outputs: bool,

        /// Directory to search for mods.toml (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Set keys in the [mc-publish] table, preserving the rest of the file
    Set {
        /// Path to mods.toml (default: search the current directory)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Modrinth project ID
        #[arg(long)]
        modrinth: Option<String>,

        /// CurseForge project ID
        #[arg(long)]
        curseforge: Option<String>,

        /// Mod loader
        #[arg(long)]
        loader: Option<String>,

        /// Target Minecraft version
        #[arg(long)]
        mc_version: Option<String>,

        /// Modrinth project slug
        #[arg(long)]
        modrinth_slug: Option<String>,

        /// CurseForge project slug
        #[arg(long)]
        curseforge_slug: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Metadata { command } => match command {
            MetadataCommands::Validate {
                write_outputs,
                root,
            } => metadata::validate(root, write_outputs),
            MetadataCommands::Set {
                file,
                modrinth,
                curseforge,
                loader,
                mc_version,
                modrinth_slug,
                curseforge_slug,
            } => {
                let values = metadata::SetValues {
                    modrinth,
                    curseforge,
                    loader,
                    mc_version,
                    modrinth_slug,
                    curseforge_slug,
                };
                metadata::set(file, &values)
            }
        },
        Commands::Sync {
            pack_dir,
            slug,
            platform,
            version,
            mc_version,
            loader,
            max_attempts,
            retry_interval,
        } => sync::execute(
            pack_dir,
            slug,
            platform,
            version,
            mc_version,
            loader,
            max_attempts,
            retry_interval,
        ),
        Commands::Setup => setup::execute(),
        Commands::Completions { shell } => {
            let shell = Shell::from_str(&shell)?;
            let mut cmd = Cli::command();
            generate_completions(&mut cmd, shell);
            Ok(())
        }
    }
}
