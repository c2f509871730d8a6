use super::backup_manager;
use crate::SetupContext;
use crate::cleanup::{CleanupPolicy, CleanupReport, CleanupScanner, Confirm, confirm_and_delete};
use crate::output::Reporter;
use crate::sync::TrackedItem;
use crate::tasks::Platform;
use anyhow::Result;

/// Scans every backup for stash files (and untracked entries when asked)
/// and deletes them.
///
/// Every declared item of every package is kept, whether or not the package
/// is enabled or applies to this platform.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded or scanned, or a prompt
/// fails.
pub fn execute(
    ctx: &SetupContext,
    policy: CleanupPolicy,
    confirm: &mut dyn Confirm,
    reporter: &mut dyn Reporter,
) -> Result<CleanupReport> {
    let platform = Platform::current();
    let mut report = CleanupReport::default();
    let mut found_any = false;

    for backup in backup_manager(ctx).get_backups()? {
        let mut items: Vec<TrackedItem> = Vec::new();
        for package in backup.tasks.values() {
            let restore_root = package.restore_root(platform, &ctx.config.core.restore_root)?;
            items.extend(package.items(&backup.path, &restore_root));
        }

        let scanner = CleanupScanner::new(
            &backup.path,
            ctx.config.core.cleanup_prefix.clone(),
            ctx.config.cleanup.ignore_patterns.clone(),
        );
        let candidates = scanner.scan(&items, &policy)?;
        if candidates.is_empty() {
            continue;
        }
        found_any = true;

        let result = confirm_and_delete(&candidates, &policy, confirm, reporter, ctx.dry_run)?;
        report.deleted.extend(result.deleted);
        report.kept.extend(result.kept);
        report.failed.extend(result.failed);
    }

    if !found_any {
        crate::output::info("Nothing to clean.");
    }

    Ok(report)
}
