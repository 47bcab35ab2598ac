//! Shell completion generation

use anyhow::{anyhow, Result};
use clap::Command;
use clap_complete::{generate, shells};
use std::io;
use std::str::FromStr;

/// Supported shell types for completion generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

impl FromStr for Shell {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            "fish" => Ok(Shell::Fish),
            _ => Err(anyhow!(
                "Unsupported shell: {s}. Supported shells: bash, zsh, fish"
            )),
        }
    }
}

/// Generate a completion script for the given shell on stdout.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    let bin_name = cmd.get_name().to_string();
    match shell {
        Shell::Bash => generate(shells::Bash, cmd, bin_name, &mut io::stdout()),
        Shell::Zsh => generate(shells::Zsh, cmd, bin_name, &mut io::stdout()),
        Shell::Fish => generate(shells::Fish, cmd, bin_name, &mut io::stdout()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_parsing_is_case_insensitive() {
        assert_eq!(Shell::from_str("BASH").unwrap(), Shell::Bash);
        assert_eq!(Shell::from_str("zsh").unwrap(), Shell::Zsh);
        assert_eq!(Shell::from_str("Fish").unwrap(), Shell::Fish);
    }

    #[test]
    fn test_unknown_shell_is_rejected() {
        assert!(Shell::from_str("powershell").is_err());
    }
}
