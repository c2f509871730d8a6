use super::Platform;
use crate::sync::{SyncError, TrackedItem};
use crate::utils::paths::{escape_dotfile_path, expand_tilde};
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// A file declared by a package, either as a bare path or with an explicit
/// archive name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        save_as: Option<String>,
    },
}

impl FileEntry {
    /// Path relative to the package's restore root.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Path(path) | Self::Detailed { path, .. } => path,
        }
    }

    /// Name of the file inside the package's archive directory.
    #[must_use]
    pub fn archive_name(&self) -> String {
        match self {
            Self::Detailed {
                save_as: Some(name),
                ..
            } => name.clone(),
            _ => escape_dotfile_path(self.path()),
        }
    }

    /// Checks that both the restore path and the archive name stay below
    /// their roots.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending value.
    pub fn validate(&self) -> Result<(), String> {
        check_relative("path", self.path())?;
        if let Self::Detailed {
            save_as: Some(name),
            ..
        } = self
        {
            check_relative("save_as", name)?;
        }
        Ok(())
    }
}

/// Accepts only non-empty relative paths made of plain components.
fn check_relative(field: &str, value: &str) -> Result<(), String> {
    let path = Path::new(value);
    if value.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    if path.is_absolute() || path.has_root() {
        return Err(format!("{field} \"{value}\" must be relative"));
    }
    if !path.components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(format!("{field} \"{value}\" must not contain \".\" or \"..\""));
    }
    Ok(())
}

/// A named group of files synced together, loaded from a TOML definition.
///
/// ```toml
/// name = "vim"
/// platforms = ["linux", "macos"]
/// restore_root = ".config"
/// files = [".vimrc", { path = "init.vim", save_as = "neovim" }]
///
/// [restore_root_by_platform]
/// windows = "~/AppData/Local"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Display name and archive directory; defaults to the definition's file stem
    #[serde(default)]
    pub name: String,
    /// Platforms the package applies to; empty means every platform
    #[serde(default)]
    pub platforms: Vec<Platform>,
    /// Restore root override, relative to the machine restore root unless absolute
    #[serde(default)]
    pub restore_root: Option<PathBuf>,
    #[serde(default)]
    pub restore_root_by_platform: BTreeMap<Platform, PathBuf>,
    /// When set, the package never runs and this is the reason shown
    #[serde(default)]
    pub skip: Option<String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl Package {
    /// Loads a package definition file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ConfigCorrupt`] if the file cannot be read or
    /// parsed, or a declared file would escape the archive or restore root.
    pub fn load(path: &Path) -> Result<Self> {
        let corrupt = |reason: String| SyncError::ConfigCorrupt {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| corrupt(e.to_string()))?;
        let mut package: Self = toml::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
        for file in &package.files {
            file.validate().map_err(&corrupt)?;
        }

        if package.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            package.name = stem.to_string_lossy().into_owned();
        }
        check_relative("name", &package.name).map_err(&corrupt)?;

        Ok(package)
    }

    /// Whether the package runs on `platform`.
    #[must_use]
    pub fn should_execute(&self, platform: Option<Platform>) -> bool {
        if self.skip.is_some() {
            return false;
        }
        self.platforms.is_empty() || platform.is_some_and(|p| self.platforms.contains(&p))
    }

    /// Resolves the directory files are restored under on `platform`.
    ///
    /// # Errors
    ///
    /// Returns an error if a `~` path is used and the home directory is unknown.
    pub fn restore_root(&self, platform: Option<Platform>, machine_root: &Path) -> Result<PathBuf> {
        let configured = platform
            .and_then(|p| self.restore_root_by_platform.get(&p))
            .or(self.restore_root.as_ref());

        match configured {
            Some(root) => {
                let root = expand_tilde(root)?;
                Ok(if root.is_absolute() {
                    root
                } else {
                    machine_root.join(root)
                })
            }
            None => Ok(machine_root.to_path_buf()),
        }
    }

    /// Directory of this package inside a backup.
    #[must_use]
    pub fn archive_dir(&self, backup_dir: &Path) -> PathBuf {
        backup_dir.join(&self.name)
    }

    /// Tracked items for every declared file.
    ///
    /// `restore_root` is the already-resolved root from [`Package::restore_root`].
    #[must_use]
    pub fn items(&self, backup_dir: &Path, restore_root: &Path) -> Vec<TrackedItem> {
        let archive_dir = self.archive_dir(backup_dir);
        self.files
            .iter()
            .map(|file| {
                TrackedItem::new(
                    file.path(),
                    archive_dir.join(file.archive_name()),
                    restore_root.join(file.path()),
                )
            })
            .collect()
    }

    /// Whether any declared file exists on either side.
    #[must_use]
    pub fn has_data(&self, backup_dir: &Path, restore_root: &Path) -> bool {
        self.items(backup_dir, restore_root).iter().any(|item| {
            item.backup_path.symlink_metadata().is_ok()
                || item.restore_path.symlink_metadata().is_ok()
        })
    }
}
