use super::backup_manager;
use crate::SetupContext;
use crate::tasks::{Backup, Platform};
use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeSet;

/// Enables packages in every backup that knows them.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded or saved.
pub fn add(ctx: &SetupContext, names: &[String]) -> Result<BTreeSet<String>> {
    update(ctx, names, Backup::enable_tasks::<String>, "Enabled")
}

/// Disables packages in every backup that knows them.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded or saved.
pub fn remove(ctx: &SetupContext, names: &[String]) -> Result<BTreeSet<String>> {
    update(ctx, names, Backup::disable_tasks::<String>, "Disabled")
}

fn update(
    ctx: &SetupContext,
    names: &[String],
    apply: fn(&mut Backup, &[String]) -> BTreeSet<String>,
    verb: &str,
) -> Result<BTreeSet<String>> {
    let mut changed = BTreeSet::new();

    for mut backup in backup_manager(ctx).get_backups()? {
        let matched = apply(&mut backup, names);
        if matched.is_empty() {
            continue;
        }
        if !ctx.dry_run {
            backup.save_config()?;
        }
        changed.extend(matched);
    }

    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !changed.contains(&n.to_lowercase()))
        .collect();
    if !unknown.is_empty() {
        super::print_warning(&format!("Unknown packages: {}", unknown.join(", ")));
    }
    if !changed.is_empty() {
        super::print_success(&format!(
            "{verb} {}",
            changed.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
    }

    Ok(changed)
}

/// Package names of one backup, grouped by registry state.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageListing {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub new: Vec<String>,
}

/// Groups the packages of a backup into enabled, disabled and new.
///
/// # Errors
///
/// Returns an error if new packages cannot be discovered.
pub fn listing(ctx: &SetupContext, backup: &Backup) -> Result<PackageListing> {
    let enabled = backup
        .tasks
        .keys()
        .filter(|name| backup.is_enabled(name))
        .cloned()
        .collect();
    let disabled = backup
        .tasks
        .keys()
        .filter(|name| backup.is_disabled(name))
        .cloned()
        .collect();
    let new = backup.new_tasks(Platform::current(), &ctx.config.core.restore_root)?;

    Ok(PackageListing {
        enabled,
        disabled,
        new,
    })
}

/// Prints the packages of every backup.
///
/// # Errors
///
/// Returns an error if a backup cannot be loaded.
pub fn list(ctx: &SetupContext) -> Result<()> {
    for backup in backup_manager(ctx).get_backups()? {
        let listing = listing(ctx, &backup)?;

        println!("{}", backup.path.display().to_string().bold());
        for (label, names) in [
            ("Enabled", &listing.enabled),
            ("Disabled", &listing.disabled),
            ("New", &listing.new),
        ] {
            if names.is_empty() {
                continue;
            }
            println!("  {}: {}", label.cyan(), names.join(", "));
        }
    }
    Ok(())
}
