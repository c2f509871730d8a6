use super::status::Side;
use super::{Action, Direction, Step, SyncError, SyncStatus, TrackedItem, classify, probe};
use crate::output::Reporter;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Prefix used for stash files unless configured otherwise.
pub const DEFAULT_CLEANUP_PREFIX: &str = "setup-backup";

/// Options for a sync run, decided once per run by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncMode {
    /// Report every step but touch nothing.
    pub dry_run: bool,
    /// Produce independent copies instead of symlinks.
    pub copy: bool,
    /// Prefix of stash file names.
    pub cleanup_prefix: String,
}

impl Default for SyncMode {
    fn default() -> Self {
        Self {
            dry_run: false,
            copy: false,
            cleanup_prefix: DEFAULT_CLEANUP_PREFIX.to_string(),
        }
    }
}

/// Builds a stash file name: `<prefix>-<n>-<escaped name>`.
#[must_use]
pub fn stash_file_name(prefix: &str, n: u32, escaped_name: &str) -> String {
    format!("{prefix}-{n}-{escaped_name}")
}

/// Splits a stash file name into its sequence number and stashed name.
///
/// Returns `None` for anything that does not follow the stash naming scheme.
#[must_use]
pub fn parse_stash_file_name<'a>(prefix: &str, file_name: &'a str) -> Option<(u32, &'a str)> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('-')?;
    let (number, name) = rest.split_once('-')?;
    if name.is_empty() || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u32 = number.parse().ok()?;
    (n > 0).then_some((n, name))
}

/// Applies classified actions to the filesystem.
///
/// Every sub-step is reported at verbose level before it runs, and in
/// dry-run mode the report is all that happens.
pub struct SyncExecutor<'a> {
    /// Run options.
    mode: SyncMode,
    /// Where log lines go.
    reporter: &'a mut dyn Reporter,
}

impl<'a> SyncExecutor<'a> {
    /// Creates an executor writing its log lines to `reporter`.
    pub fn new(mode: SyncMode, reporter: &'a mut dyn Reporter) -> Self {
        Self { mode, reporter }
    }

    /// Gives access to the underlying reporter.
    pub fn reporter(&mut self) -> &mut dyn Reporter {
        &mut *self.reporter
    }

    /// Probes, classifies and converges a single item.
    ///
    /// Items without any source are skipped silently. Every other item gets
    /// an info line naming it before anything else happens.
    ///
    /// # Errors
    ///
    /// Returns the item-scoped error that stopped the item. Errors are not
    /// reported here; the caller decides how to surface them.
    pub fn sync(
        &mut self,
        item: &TrackedItem,
        direction: Direction,
    ) -> Result<SyncStatus, SyncError> {
        let result = probe(&item.backup_path, &item.restore_path)?;
        let (status, action) = classify(&result, direction);
        debug!(item = %item.name, ?status, ?direction, "classified item");

        if status == SyncStatus::NoSources {
            return Ok(status);
        }

        let verb = match direction {
            Direction::Backup => "Backing up",
            Direction::Restore => "Restoring",
        };
        self.reporter.info(&format!("{verb} {}", item.name));

        self.apply(item, &action)?;
        Ok(status)
    }

    /// Applies an action produced by [`classify`].
    ///
    /// # Errors
    ///
    /// - [`SyncError::MissingSource`] for [`Action::MissingSource`]
    /// - [`SyncError::Io`] if a stash, move or link fails
    pub fn apply(&mut self, item: &TrackedItem, action: &Action) -> Result<(), SyncError> {
        match action {
            Action::Nothing => Ok(()),
            Action::MissingSource(direction) => Err(SyncError::MissingSource {
                direction: *direction,
                path: side_path(item, direction.source()).to_path_buf(),
            }),
            Action::Run(steps) => {
                for step in steps {
                    self.run_step(item, *step)?;
                }
                Ok(())
            }
        }
    }

    /// Dispatches a single step.
    fn run_step(&mut self, item: &TrackedItem, step: Step) -> Result<(), SyncError> {
        trace!(item = %item.name, ?step, "running step");
        match step {
            Step::Stash(side) => self.stash(item, side).map(|_| ()),
            Step::Move { from, to } => self.move_file(side_path(item, from), side_path(item, to)),
            Step::Link => self.link(item),
        }
    }

    /// Renames one side of an item into the archive as a numbered stash file.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the stash directory cannot be created or
    /// the rename fails.
    pub fn stash(&mut self, item: &TrackedItem, side: Side) -> Result<PathBuf, SyncError> {
        let source = side_path(item, side);
        let dir = item.stash_dir();
        let name = item
            .backup_path
            .file_name()
            .map_or_else(|| item.name.clone(), |n| n.to_string_lossy().into_owned());
        let target = next_stash_path(dir, &self.mode.cleanup_prefix, &name);

        self.reporter.verbose(&format!(
            "Saving a copy of file \"{}\" under \"{}\"",
            source.display(),
            dir.display()
        ));

        if !self.mode.dry_run {
            fs::create_dir_all(dir).map_err(|e| SyncError::io("create directory", dir, e))?;
            move_path(source, &target)?;
        }

        Ok(target)
    }

    /// Relocates `from` to `to`, creating the destination's parents.
    fn move_file(&mut self, from: &Path, to: &Path) -> Result<(), SyncError> {
        self.reporter.verbose(&format!(
            "Moving file from \"{}\" to \"{}\"",
            from.display(),
            to.display()
        ));

        if self.mode.dry_run {
            return Ok(());
        }
        ensure_parent(to)?;
        move_path(from, to)
    }

    /// Makes the restore path resolve to the backup path, or copies the
    /// archive content over it in copy mode.
    fn link(&mut self, item: &TrackedItem) -> Result<(), SyncError> {
        let backup = &item.backup_path;
        let restore = &item.restore_path;

        if self.mode.copy {
            self.reporter.verbose(&format!(
                "Copying \"{}\" to \"{}\"",
                backup.display(),
                restore.display()
            ));
        } else {
            self.reporter.verbose(&format!(
                "Symlinking \"{}\" with \"{}\"",
                backup.display(),
                restore.display()
            ));
        }

        if self.mode.dry_run {
            return Ok(());
        }

        remove_path(restore)?;
        ensure_parent(restore)?;

        if self.mode.copy {
            copy_path(backup, restore)
        } else {
            symlink(backup, restore)
        }
    }
}

/// Path of one side of an item.
fn side_path(item: &TrackedItem, side: Side) -> &Path {
    match side {
        Side::Backup => &item.backup_path,
        Side::Restore => &item.restore_path,
    }
}

/// First free `<prefix>-<n>-<name>` path in `dir`, starting at 1.
fn next_stash_path(dir: &Path, prefix: &str, name: &str) -> PathBuf {
    let mut n = 1;
    loop {
        let candidate = dir.join(stash_file_name(prefix, n, name));
        if fs::symlink_metadata(&candidate).is_err() {
            return candidate;
        }
        n += 1;
    }
}

/// Creates the parent directories of `path`.
fn ensure_parent(path: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Renames `from` to `to`, falling back to copy + remove across filesystems.
fn move_path(from: &Path, to: &Path) -> Result<(), SyncError> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crossed devices, copying");
            copy_path(from, to)?;
            remove_path(from)
        }
        Err(e) => Err(SyncError::io("move", from, e)),
    }
}

/// Removes a file, symlink or directory tree. Missing paths are fine.
fn remove_path(path: &Path) -> Result<(), SyncError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(SyncError::io("remove", path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| SyncError::io("remove", path, e))
}

/// Duplicates a file or directory tree without touching the source.
fn copy_path(from: &Path, to: &Path) -> Result<(), SyncError> {
    let metadata = fs::metadata(from).map_err(|e| SyncError::io("copy", from, e))?;

    if !metadata.is_dir() {
        fs::copy(from, to).map_err(|e| SyncError::io("copy", from, e))?;
        return Ok(());
    }

    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(|e| SyncError::io("copy", from, e.into()))?;
        let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| SyncError::io("create directory", &target, e))?;
        } else if entry.file_type().is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| SyncError::io("copy", entry.path(), e))?;
            symlink(&link, &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| SyncError::io("copy", entry.path(), e))?;
        }
    }

    Ok(())
}

/// Creates `link` pointing at `target`.
#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> Result<(), SyncError> {
    std::os::unix::fs::symlink(target, link).map_err(|e| SyncError::io("symlink", link, e))
}

/// Creates `link` pointing at `target`.
#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> Result<(), SyncError> {
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };
    result.map_err(|e| SyncError::io("symlink", link, e))
}
