//! Packages, platforms and the per-backup task registry.
//!
//! A *package* (task) declares which files belong together and where they
//! live on each platform. A *backup* is an archive directory holding the
//! synced files plus a registry of enabled and disabled packages. This module
//! turns both into the [`TrackedItem`](crate::sync::TrackedItem)s the sync
//! engine works on.

pub mod package;
pub mod platform;
pub mod registry;

pub use package::{FileEntry, Package};
pub use platform::Platform;
pub use registry::{Backup, BackupManager, CreateOutcome};
