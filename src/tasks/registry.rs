use super::{Package, Platform};
use crate::sync::SyncError;
use crate::utils::paths::{looks_like_path, make_absolute};
use crate::{BACKUP_CONFIG_FILE, BACKUP_TASKS_DIR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extension of package definition files.
const PACKAGE_EXTENSION: &str = "toml";

/// On-disk form of a backup's task registry.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    enabled_task_names: Vec<String>,
    #[serde(default)]
    disabled_task_names: Vec<String>,
}

/// A backup directory together with its package definitions and the record
/// of which packages are enabled or disabled.
///
/// Task names are matched case-insensitively and stored lowercase.
#[derive(Debug, Clone)]
pub struct Backup {
    /// Root of the backup directory.
    pub path: PathBuf,
    /// Known packages keyed by definition file stem.
    pub tasks: BTreeMap<String, Package>,
    /// Names of enabled tasks.
    pub enabled_task_names: BTreeSet<String>,
    /// Names of disabled tasks.
    pub disabled_task_names: BTreeSet<String>,
}

impl Backup {
    /// Loads a backup's definitions and registry.
    ///
    /// Definitions under `<backup>/_tasks` override shared ones from
    /// `applications_dir` with the same name. A missing backup directory is
    /// treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ConfigCorrupt`] if the registry or a definition
    /// cannot be parsed, or an IO error if a definitions directory cannot be
    /// listed.
    pub fn load(path: &Path, applications_dir: Option<&Path>) -> Result<Self> {
        let mut tasks = BTreeMap::new();
        if let Some(dir) = applications_dir {
            tasks.extend(load_packages(dir)?);
        }
        tasks.extend(load_packages(&path.join(BACKUP_TASKS_DIR))?);

        let registry_path = path.join(BACKUP_CONFIG_FILE);
        let registry = if registry_path.exists() {
            let content =
                std::fs::read_to_string(&registry_path).map_err(|e| SyncError::ConfigCorrupt {
                    path: registry_path.clone(),
                    reason: e.to_string(),
                })?;
            toml::from_str::<RegistryFile>(&content).map_err(|e| SyncError::ConfigCorrupt {
                path: registry_path.clone(),
                reason: e.to_string(),
            })?
        } else {
            RegistryFile::default()
        };

        debug!(backup = %path.display(), tasks = tasks.len(), "loaded backup");

        Ok(Self {
            path: path.to_path_buf(),
            tasks,
            enabled_task_names: lowercase(registry.enabled_task_names),
            disabled_task_names: lowercase(registry.disabled_task_names),
        })
    }

    /// Enables the given tasks; unknown names are ignored.
    ///
    /// Returns the names that matched a known task.
    pub fn enable_tasks<S: AsRef<str>>(&mut self, names: &[S]) -> BTreeSet<String> {
        let matched = self.known(names);
        for name in &matched {
            self.disabled_task_names.remove(name);
            self.enabled_task_names.insert(name.clone());
        }
        matched
    }

    /// Disables the given tasks; unknown names are ignored.
    ///
    /// Returns the names that matched a known task.
    pub fn disable_tasks<S: AsRef<str>>(&mut self, names: &[S]) -> BTreeSet<String> {
        let matched = self.known(names);
        for name in &matched {
            self.enabled_task_names.remove(name);
            self.disabled_task_names.insert(name.clone());
        }
        matched
    }

    /// Whether a task is in the enabled list.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled_task_names.contains(&name.to_lowercase())
    }

    /// Whether a task is in the disabled list.
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled_task_names.contains(&name.to_lowercase())
    }

    /// Tasks in neither list that apply to `platform` and have files on
    /// either side.
    ///
    /// # Errors
    ///
    /// Returns an error if a package restore root cannot be resolved.
    pub fn new_tasks(&self, platform: Option<Platform>, machine_root: &Path) -> Result<Vec<String>> {
        let mut found = Vec::new();
        for (name, package) in &self.tasks {
            if self.is_enabled(name) || self.is_disabled(name) || !package.should_execute(platform)
            {
                continue;
            }
            let restore_root = package.restore_root(platform, machine_root)?;
            if package.has_data(&self.path, &restore_root) {
                found.push(name.clone());
            }
        }
        Ok(found)
    }

    /// Enabled tasks that apply to `platform`, ordered by name.
    #[must_use]
    pub fn tasks_to_run(&self, platform: Option<Platform>) -> Vec<(&str, &Package)> {
        self.tasks
            .iter()
            .filter(|(name, package)| self.is_enabled(name) && package.should_execute(platform))
            .map(|(name, package)| (name.as_str(), package))
            .collect()
    }

    /// Writes the enabled and disabled lists to `<backup>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_config(&self) -> Result<()> {
        let registry = RegistryFile {
            enabled_task_names: self.enabled_task_names.iter().cloned().collect(),
            disabled_task_names: self.disabled_task_names.iter().cloned().collect(),
        };
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("Failed to create backup: {}", self.path.display()))?;
        let path = self.path.join(BACKUP_CONFIG_FILE);
        std::fs::write(&path, toml::to_string_pretty(&registry)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Lowercased names from `names` that match a known task.
    fn known<S: AsRef<str>>(&self, names: &[S]) -> BTreeSet<String> {
        let known: BTreeSet<String> = self.tasks.keys().map(|k| k.to_lowercase()).collect();
        names
            .iter()
            .map(|n| n.as_ref().to_lowercase())
            .filter(|n| known.contains(n))
            .collect()
    }
}

/// Result of registering a backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Newly registered.
    Created(PathBuf),
    /// Already in the configuration.
    AlreadyRegistered(PathBuf),
    /// Exists, is not empty and is not registered.
    NotEmpty(PathBuf),
}

/// Resolves and registers backup directories listed in the global config.
#[derive(Debug, Clone)]
pub struct BackupManager {
    backup_paths: Vec<PathBuf>,
    applications_dir: Option<PathBuf>,
}

impl BackupManager {
    /// Creates a manager over the configured backups.
    #[must_use]
    pub fn new(backup_paths: Vec<PathBuf>, applications_dir: Option<PathBuf>) -> Self {
        Self {
            backup_paths,
            applications_dir,
        }
    }

    /// Registered backup directories.
    #[must_use]
    pub fn backup_paths(&self) -> &[PathBuf] {
        &self.backup_paths
    }

    /// Loads every registered backup.
    ///
    /// # Errors
    ///
    /// Returns the first load failure.
    pub fn get_backups(&self) -> Result<Vec<Backup>> {
        self.backup_paths
            .iter()
            .map(|path| Backup::load(path, self.applications_dir.as_deref()))
            .collect()
    }

    /// Resolves a user-supplied backup argument to an absolute directory.
    ///
    /// Paths (`.`, `..`, `~` or absolute) are used as given; bare names are
    /// placed under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be made absolute.
    pub fn resolve_backup(value: &str, dir: &Path) -> Result<PathBuf> {
        if looks_like_path(value) {
            make_absolute(Path::new(value))
        } else {
            make_absolute(&dir.join(value))
        }
    }

    /// Registers a backup directory, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be inspected or created.
    pub fn create_backup(&mut self, path: PathBuf, dry_run: bool) -> Result<CreateOutcome> {
        if self.backup_paths.contains(&path) {
            return Ok(CreateOutcome::AlreadyRegistered(path));
        }

        if path.exists() {
            let mut entries = std::fs::read_dir(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if entries.next().is_some() {
                warn!(backup = %path.display(), "refusing non-empty directory");
                return Ok(CreateOutcome::NotEmpty(path));
            }
        } else if !dry_run {
            std::fs::create_dir_all(&path)
                .with_context(|| format!("Failed to create backup: {}", path.display()))?;
        }

        self.backup_paths.push(path.clone());
        Ok(CreateOutcome::Created(path))
    }
}

/// Loads every `*.toml` definition in `dir`, keyed by file stem.
fn load_packages(dir: &Path) -> Result<BTreeMap<String, Package>> {
    let mut packages = BTreeMap::new();
    if !dir.is_dir() {
        return Ok(packages);
    }

    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != PACKAGE_EXTENSION) || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem() else {
            continue;
        };
        packages.insert(stem.to_string_lossy().into_owned(), Package::load(&path)?);
    }
    Ok(packages)
}

fn lowercase(names: Vec<String>) -> BTreeSet<String> {
    names.into_iter().map(|n| n.to_lowercase()).collect()
}
