use super::Config;
use crate::sync::SyncError;
use anyhow::Result;
use std::path::Path;

/// Reads and parses the global configuration file.
///
/// Unreadable or malformed files are reported as [`SyncError::ConfigCorrupt`]
/// so the caller can tell them apart from ordinary failures.
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| SyncError::ConfigCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_config_str(&content).map_err(|e| {
        anyhow::Error::from(SyncError::ConfigCorrupt {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        })
    })
}

pub(crate) fn parse_config_str(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    super::validate_cleanup_prefix(&config.core.cleanup_prefix)?;

    if config.backups.iter().any(|b| b.as_os_str().is_empty()) {
        anyhow::bail!("Backup paths cannot be empty");
    }

    Ok(())
}
