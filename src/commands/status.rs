use super::backup_manager;
use crate::SetupContext;
use crate::output::{self, Verbosity};
use crate::sync::{GroupStatus, ItemStatus, SyncStatus, probe};
use crate::tasks::Platform;
use anyhow::Result;
use colored::Colorize;

/// Computes the status of every enabled package, in backup then name order.
///
/// Probing never mutates anything. Items whose probe fails are reported with
/// [`SyncStatus::Error`] and the failure as message.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded.
pub fn collect(ctx: &SetupContext) -> Result<Vec<GroupStatus>> {
    let platform = Platform::current();
    let mut groups = Vec::new();

    for backup in backup_manager(ctx).get_backups()? {
        for (_, package) in backup.tasks_to_run(platform) {
            let restore_root = package.restore_root(platform, &ctx.config.core.restore_root)?;
            let items = package
                .items(&backup.path, &restore_root)
                .into_iter()
                .map(|item| match probe(&item.backup_path, &item.restore_path) {
                    Ok(result) => ItemStatus {
                        name: item.name,
                        status: SyncStatus::of_probe(&result),
                        message: None,
                    },
                    Err(e) => ItemStatus {
                        name: item.name,
                        status: SyncStatus::Error,
                        message: Some(e.to_string()),
                    },
                })
                .collect();

            groups.push(GroupStatus {
                name: package.name.clone(),
                items,
            });
        }
    }

    Ok(groups)
}

/// Formats status lines for `groups`.
///
/// A package whose items are all up to date collapses into one line unless
/// `verbose` is set.
#[must_use]
pub fn render(groups: &[GroupStatus], verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        if !verbose && group.kind() == Some(SyncStatus::UpToDate) {
            lines.push(output::status_line(&group.name, group.kind(), None));
            continue;
        }
        for item in &group.items {
            lines.push(output::status_line(
                &format!("{}:{}", group.name, item.name),
                Some(item.status),
                item.message.as_deref(),
            ));
        }
    }
    lines
}

/// Prints the current sync status
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded.
pub fn execute(ctx: &SetupContext) -> Result<()> {
    let groups = collect(ctx)?;

    if groups.is_empty() {
        super::print_warning("No packages enabled.");
        super::print_warning("Use setup package add to enable packages.");
        return Ok(());
    }

    println!("{}", "Current status:".bold());
    println!();
    let verbose = output::get_verbosity() == Verbosity::Verbose;
    for line in render(&groups, verbose) {
        println!("{line}");
    }
    Ok(())
}
