use crate::SetupContext;
use crate::output;
use anyhow::Result;
use colored::Colorize;

/// Execute config command to get/set configuration values
///
/// # Errors
///
/// Returns an error if:
/// - Failed to set or unset configuration value
/// - Failed to save configuration
pub fn execute(
    ctx: &mut SetupContext,
    key: Option<&str>,
    value: Option<String>,
    unset: bool,
    list: bool,
) -> Result<()> {
    // If --list flag is set or no key is provided, show all configuration
    if list || key.is_none() {
        show_all_config(ctx);
        return Ok(());
    }

    let key =
        key.ok_or_else(|| anyhow::anyhow!("Key must be provided when not using --list flag"))?;

    if unset {
        ctx.config.unset(key)?;
        ctx.save_config()?;
        output::success(&format!("Unset {key}"));
    } else if let Some(val) = value {
        ctx.config.set(key, val.clone())?;
        ctx.save_config()?;
        output::success(&format!("Set {key} = {val}"));
    } else if let Some(val) = ctx.config.get(key) {
        println!("{val}");
    } else {
        output::warning(&format!("Configuration key '{key}' is not set"));
    }

    Ok(())
}

/// Show all configuration values
fn show_all_config(ctx: &SetupContext) {
    let config = &ctx.config;

    println!("{}", "backups".bold());
    for backup in &config.backups {
        println!("  {}", backup.display());
    }

    println!("\n{}", "[core]".bold());
    println!("  backup_root = {}", config.core.backup_root.display());
    println!("  restore_root = {}", config.core.restore_root.display());
    if let Some(dir) = &config.core.applications_dir {
        println!("  applications_dir = {}", dir.display());
    }
    println!("  cleanup_prefix = {}", config.core.cleanup_prefix);

    println!("\n{}", "[sync]".bold());
    println!("  copy = {}", config.sync.copy);

    println!("\n{}", "[cleanup]".bold());
    println!(
        "  ignore_patterns = {}",
        config.cleanup.ignore_patterns.join(", ")
    );
}
