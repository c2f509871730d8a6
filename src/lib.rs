#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # dotsetup - Dotfiles backup and restore
//!
//! dotsetup keeps per-user configuration files in sync between the live machine
//! (the *restore path*) and a versioned archive directory (the *backup path*).
//! After the first sync the machine-side file is a symlink into the archive, so
//! later edits land in the archive directly.
//!
//! ## Architecture
//!
//! - [`sync`]: the probe / classify / execute engine for a single tracked item
//! - [`cleanup`]: archive scanner that reclaims stash files and untracked entries
//! - [`tasks`]: package definitions, platform filtering and the per-backup registry
//! - [`config`]: global configuration parsing and validation
//! - [`commands`]: command implementations (backup, restore, status, ...)
//! - [`output`]: output formatting and the [`output::Reporter`] seam
//! - [`utils`]: path helpers and ignore pattern matching
//!
//! ## Example Usage
//!
//! ```no_run
//! use dotsetup::sync::{Direction, SyncExecutor, SyncMode, TrackedItem, classify, probe};
//! use dotsetup::output::Console;
//!
//! # fn main() -> anyhow::Result<()> {
//! let item = TrackedItem::new(".vimrc", "/home/me/dotfiles/vim/_vimrc", "/home/me/.vimrc");
//! let result = probe(&item.backup_path, &item.restore_path)?;
//! let (_status, action) = classify(&result, Direction::Backup);
//!
//! let mut console = Console;
//! let mut executor = SyncExecutor::new(SyncMode::default(), &mut console);
//! executor.apply(&item, &action)?;
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Stale archive artifact discovery and removal.
pub mod cleanup;

/// Configuration parsing, validation, and management.
pub mod config;

/// Output formatting and reporting.
pub mod output;

/// Probe, classification and execution of file synchronization.
pub mod sync;

/// Packages, platforms and the per-backup task registry.
pub mod tasks;

/// Utility functions and helpers.
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Current version of the setup binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/dotsetup/config.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "DOTSETUP_CONFIG_PATH";

/// Name of the registry file stored at the root of every backup directory.
pub const BACKUP_CONFIG_FILE: &str = "config.toml";

/// Directory inside a backup holding backup-specific package definitions.
pub const BACKUP_TASKS_DIR: &str = "_tasks";

/// Central context for all setup operations.
///
/// Holds the configuration file location and the loaded configuration. All
/// values the engine needs (archive roots, cleanup prefix, ignore patterns)
/// are read from here and passed down explicitly.
///
/// # Examples
///
/// ```no_run
/// use dotsetup::SetupContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Context with default paths
/// let ctx = SetupContext::new()?;
///
/// // Context with an explicit config file (for testing)
/// let ctx = SetupContext::new_explicit("/tmp/setup/config.toml".into())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SetupContext {
    /// Path to the configuration file.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether to skip all filesystem mutations while still reporting them.
    pub dry_run: bool,

    /// Whether to run in non-interactive mode (no prompts).
    /// Used primarily for testing to prevent stdin reads.
    pub non_interactive: bool,
}

impl SetupContext {
    /// Creates a new `SetupContext` by loading the configuration from the default path.
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or if the
    /// configuration file cannot be read, parsed or created.
    pub fn new() -> Result<Self> {
        // Check environment variable for config path first
        let config_path = if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            PathBuf::from(path)
        } else {
            let home = dirs::home_dir().context("Could not find home directory")?;
            home.join(DEFAULT_CONFIG_PATH)
        };

        Self::new_explicit(config_path)
    }

    /// Creates a new `SetupContext` from an explicit configuration path.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be loaded or created.
    pub fn new_explicit(config_path: PathBuf) -> Result<Self> {
        let config = config::Config::load(&config_path)?;

        let validator = config::validator::ConfigValidator::new();
        if let Err(e) = validator.validate_config_file(&config_path) {
            output::warning(&format!("Warning: Configuration validation failed: {e}"));
        }

        Ok(Self {
            config_path,
            config,
            dry_run: false,
            non_interactive: false,
        })
    }

    /// Builds the sync mode for this run.
    #[must_use]
    pub fn sync_mode(&self, copy: bool) -> sync::SyncMode {
        sync::SyncMode {
            dry_run: self.dry_run,
            copy: copy || self.config.sync.copy,
            cleanup_prefix: self.config.core.cleanup_prefix.clone(),
        }
    }

    /// Persists the in-memory configuration back to disk.
    ///
    /// # Errors
    /// Returns an error if the configuration cannot be written.
    pub fn save_config(&self) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        self.config.save(&self.config_path)
    }
}
