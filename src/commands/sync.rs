use super::{EnableNew, backup_manager, resolve_new_tasks};
use crate::SetupContext;
use crate::cleanup::Confirm;
use crate::output::Reporter;
use crate::sync::{Direction, SyncExecutor};
use crate::tasks::Platform;
use anyhow::Result;
use tracing::debug;

/// Counts for one backup or restore run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Packages that were processed.
    pub packages: usize,
    /// Items that reached a converged state or needed nothing.
    pub synced: usize,
    /// Items that failed and were skipped.
    pub failed: usize,
}

/// Runs every enabled package of every backup in `direction`.
///
/// Item failures are reported through `reporter` and counted; only a
/// corrupt configuration aborts the run.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded or a new-package decision
/// cannot be persisted.
pub fn execute(
    ctx: &SetupContext,
    direction: Direction,
    copy: bool,
    enable_new: EnableNew,
    confirm: &mut dyn Confirm,
    reporter: &mut dyn Reporter,
) -> Result<SyncSummary> {
    let platform = Platform::current();
    let mut summary = SyncSummary::default();

    let backups = backup_manager(ctx).get_backups()?;

    let header = match direction {
        Direction::Backup => "Backing up:",
        Direction::Restore => "Restoring:",
    };
    crate::output::info(header);

    let mut executor = SyncExecutor::new(ctx.sync_mode(copy), reporter);

    for mut backup in backups {
        resolve_new_tasks(ctx, &mut backup, enable_new, confirm)?;

        for (name, package) in backup.tasks_to_run(platform) {
            debug!(package = name, backup = %backup.path.display(), "running package");
            summary.packages += 1;

            let verb = match direction {
                Direction::Backup => "Backing up",
                Direction::Restore => "Restoring",
            };
            executor
                .reporter()
                .info(&format!("{verb} package {}:", package.name));

            let restore_root = package.restore_root(platform, &ctx.config.core.restore_root)?;
            for item in package.items(&backup.path, &restore_root) {
                match executor.sync(&item, direction) {
                    Ok(_) => summary.synced += 1,
                    Err(e) if e.is_fatal() => return Err(e.into()),
                    Err(e) => {
                        executor.reporter().error(&e.to_string());
                        summary.failed += 1;
                    }
                }
            }
        }
    }

    Ok(summary)
}
