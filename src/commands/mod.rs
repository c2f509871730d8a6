pub mod cleanup;
pub mod config;
pub mod init;
pub mod package;
pub mod status;
pub mod sync;

use crate::SetupContext;
use crate::cleanup::Confirm;
use crate::tasks::{Backup, BackupManager, Platform};
use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;

/// What to do with packages that have data but are in neither registry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum EnableNew {
    /// Enable all of them
    All,
    /// Disable all of them
    None,
    /// Ask once per backup
    #[default]
    Prompt,
    /// Leave them undecided
    Skip,
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "W:".yellow().bold(), message);
}

/// Builds the backup manager for the configured backups.
pub(crate) fn backup_manager(ctx: &SetupContext) -> BackupManager {
    BackupManager::new(
        ctx.config.backups.clone(),
        ctx.config.core.applications_dir.clone(),
    )
}

/// Applies the `--enable-new` policy to a backup's undecided packages.
///
/// Returns the names that changed lists. The registry is saved unless the
/// run is a dry run.
///
/// # Errors
///
/// Returns an error if new packages cannot be discovered, the prompt fails or
/// the registry cannot be saved.
pub(crate) fn resolve_new_tasks(
    ctx: &SetupContext,
    backup: &mut Backup,
    policy: EnableNew,
    confirm: &mut dyn Confirm,
) -> Result<BTreeSet<String>> {
    let found = backup.new_tasks(Platform::current(), &ctx.config.core.restore_root)?;
    if found.is_empty() {
        return Ok(BTreeSet::new());
    }

    let enable = match policy {
        EnableNew::All => true,
        EnableNew::None => false,
        EnableNew::Skip => return Ok(BTreeSet::new()),
        EnableNew::Prompt if ctx.non_interactive => return Ok(BTreeSet::new()),
        EnableNew::Prompt => confirm.confirm(&format!(
            "New packages found in \"{}\": {}. Enable them?",
            backup.path.display(),
            found.join(", ")
        ))?,
    };

    let changed = if enable {
        backup.enable_tasks(&found)
    } else {
        backup.disable_tasks(&found)
    };

    if !changed.is_empty() && !ctx.dry_run {
        backup.save_config()?;
    }
    Ok(changed)
}
