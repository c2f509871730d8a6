//! Command-line interface definitions for setup.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//!
//! Note: Field-level documentation is provided via clap attributes (#[arg(help = "...")]),
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use crate::commands::EnableNew;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for setup.
#[derive(Parser)]
#[command(
    name = "setup",
    version = crate::VERSION,
    about = "Backup and restore your dotfiles",
    long_about = "Keeps configuration files in sync between this machine and a dotfiles archive, \
                  replacing machine copies with symlinks into the archive"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Print verbose information
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report every change without touching the filesystem
    #[arg(long, global = true)]
    pub dry_run: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Initializes backups
    Init {
        /// Backup directories or names to register (defaults to "local")
        backups: Vec<String>,

        /// Directory under which bare backup names are created
        #[arg(long)]
        dir: Option<PathBuf>,

        /// What to do with packages that are neither enabled nor disabled
        #[arg(long, value_enum, default_value_t = EnableNew::Prompt)]
        enable_new: EnableNew,
    },

    /// Backup your settings
    Backup {
        /// Copy files instead of symlinking them
        #[arg(long)]
        copy: bool,

        /// What to do with packages that are neither enabled nor disabled
        #[arg(long, value_enum, default_value_t = EnableNew::Prompt)]
        enable_new: EnableNew,
    },

    /// Restore your settings
    Restore {
        /// Copy files instead of symlinking them
        #[arg(long)]
        copy: bool,

        /// What to do with packages that are neither enabled nor disabled
        #[arg(long, value_enum, default_value_t = EnableNew::Prompt)]
        enable_new: EnableNew,
    },

    /// Returns the sync status
    Status,

    /// Cleans up previous backups
    Cleanup {
        /// Also remove archive entries no package declares
        #[arg(long)]
        untracked: bool,

        /// Ask before deleting each entry
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        confirm: bool,
    },

    /// Add/remove packages to be backed up
    Package {
        #[command(subcommand)]
        action: PackageAction,
    },

    /// Get and set configuration options
    Config {
        /// Configuration key
        key: Option<String>,

        /// Configuration value to set
        value: Option<String>,

        /// Unset the configuration key
        #[arg(long)]
        unset: bool,

        /// List all configuration values
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PackageAction {
    /// Enable packages
    Add {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Disable packages
    Remove {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List enabled, disabled and new packages
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cleanup_flags() {
        let cli = Cli::try_parse_from(["setup", "cleanup", "--untracked", "--confirm=false"]).unwrap();
        match cli.command {
            Commands::Cleanup { untracked, confirm } => {
                assert!(untracked);
                assert!(!confirm);
            }
            _ => panic!("expected cleanup"),
        }
    }

    #[test]
    fn test_parse_enable_new() {
        let cli = Cli::try_parse_from(["setup", "backup", "--enable-new=all", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
        match cli.command {
            Commands::Backup { copy, enable_new } => {
                assert!(!copy);
                assert_eq!(enable_new, EnableNew::All);
            }
            _ => panic!("expected backup"),
        }
    }
}
