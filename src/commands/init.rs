use super::{EnableNew, backup_manager, resolve_new_tasks};
use crate::SetupContext;
use crate::cleanup::Confirm;
use crate::tasks::{BackupManager, CreateOutcome};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the backup created when `init` is given no directories.
pub const DEFAULT_BACKUP_NAME: &str = "local";

/// Registers backup directories and decides on their new packages.
///
/// Bare names are created under `dir`, or under the configured backup root
/// when `dir` is not given.
///
/// # Errors
///
/// Returns an error if a directory cannot be created, the configuration
/// cannot be saved or a registry cannot be updated.
pub fn execute(
    ctx: &mut SetupContext,
    backups: &[String],
    dir: Option<&Path>,
    enable_new: EnableNew,
    confirm: &mut dyn Confirm,
) -> Result<Vec<PathBuf>> {
    let base = match dir {
        Some(dir) => crate::utils::paths::make_absolute(dir)?,
        None => crate::utils::paths::make_absolute(&ctx.config.core.backup_root)?,
    };

    let requested: Vec<&str> = if backups.is_empty() {
        vec![DEFAULT_BACKUP_NAME]
    } else {
        backups.iter().map(String::as_str).collect()
    };

    let mut manager = backup_manager(ctx);
    let mut created = Vec::new();

    for value in requested {
        let path = BackupManager::resolve_backup(value, &base)
            .with_context(|| format!("Failed to resolve backup: {value}"))?;

        match manager.create_backup(path, ctx.dry_run)? {
            CreateOutcome::Created(path) => {
                super::print_success(&format!("Created backup \"{}\"", path.display()));
                created.push(path);
            }
            CreateOutcome::AlreadyRegistered(path) => {
                super::print_info(&format!("Backup \"{}\" already exists.", path.display()));
            }
            CreateOutcome::NotEmpty(path) => {
                super::print_warning(&format!(
                    "Cannot create backup. The folder {} already exists and is not empty.",
                    path.display()
                ));
            }
        }
    }

    if !created.is_empty() {
        ctx.config.backups = manager.backup_paths().to_vec();
        ctx.save_config()?;
    }

    for mut backup in manager.get_backups()? {
        resolve_new_tasks(ctx, &mut backup, enable_new, confirm)?;
    }

    Ok(created)
}
