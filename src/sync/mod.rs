//! File synchronization engine.
//!
//! A tracked item is synced in three steps:
//!
//! 1. [`probe`] inspects both locations (existence, link identity, content)
//! 2. [`classify`] turns the probe result and a [`Direction`] into a
//!    [`SyncStatus`] and the [`Action`] needed to converge
//! 3. [`SyncExecutor`] applies the action (stash, move, link or copy)
//!
//! The engine never decides which items exist; callers hand it
//! [`TrackedItem`]s resolved elsewhere (see [`crate::tasks`]).

/// Error taxonomy shared by the engine and its callers.
pub mod error;

/// Filesystem mutations for a classified item.
pub mod executor;

/// Read-only inspection of a backup/restore pair.
pub mod probe;

/// Status classification and the decision table.
pub mod status;

pub use error::SyncError;
pub use executor::{
    DEFAULT_CLEANUP_PREFIX, SyncExecutor, SyncMode, parse_stash_file_name, stash_file_name,
};
pub use probe::{PathProbeResult, probe};
pub use status::{Action, Direction, GroupStatus, ItemStatus, Side, Step, SyncStatus, classify};

use std::path::{Path, PathBuf};

/// A named backup/restore pair managed by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    /// Literal dotfile name, e.g. `.vimrc`.
    pub name: String,
    /// Location inside the archive.
    pub backup_path: PathBuf,
    /// Location on the live machine.
    pub restore_path: PathBuf,
}

impl TrackedItem {
    /// Creates a tracked item from its name and both locations.
    pub fn new(
        name: impl Into<String>,
        backup_path: impl Into<PathBuf>,
        restore_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            backup_path: backup_path.into(),
            restore_path: restore_path.into(),
        }
    }

    /// Directory that receives stash files for this item.
    #[must_use]
    pub fn stash_dir(&self) -> &Path {
        self.backup_path.parent().unwrap_or(&self.backup_path)
    }
}
