use super::PathProbeResult;
use std::fmt;

/// Which side is authoritative for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Machine → archive. Source is the restore path.
    Backup,
    /// Archive → machine. Source is the backup path.
    Restore,
}

impl Direction {
    /// Side that provides the data for this direction.
    #[must_use]
    pub const fn source(self) -> Side {
        match self {
            Self::Backup => Side::Restore,
            Self::Restore => Side::Backup,
        }
    }

    /// Side that receives the data for this direction.
    #[must_use]
    pub const fn destination(self) -> Side {
        match self {
            Self::Backup => Side::Backup,
            Self::Restore => Side::Restore,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backup => f.write_str("backup"),
            Self::Restore => f.write_str("restore"),
        }
    }
}

/// One of the two locations of a tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The archive location.
    Backup,
    /// The live machine location.
    Restore,
}

/// Relationship between the two sides of a tracked item.
///
/// Recomputed on every call from a fresh probe; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    /// Neither side exists.
    NoSources,
    /// Both sides resolve to the same file.
    UpToDate,
    /// Both sides hold identical bytes but are not linked yet.
    NeedsLink,
    /// Exactly one side exists and it can be claimed.
    NeedsClaim,
    /// Both sides exist with different content.
    Conflict,
    /// The source for the requested direction is missing.
    Error,
}

impl SyncStatus {
    /// Direction-less status used when only reporting.
    ///
    /// A pair with a single existing side can always be claimed by one of
    /// the directions, so it reports [`SyncStatus::NeedsClaim`].
    #[must_use]
    pub const fn of_probe(probe: &PathProbeResult) -> Self {
        match (probe.backup_exists, probe.restore_exists) {
            (false, false) => Self::NoSources,
            (true, true) if probe.same_file => Self::UpToDate,
            (true, true) if probe.content_equal => Self::NeedsLink,
            (true, true) => Self::Conflict,
            _ => Self::NeedsClaim,
        }
    }
}

/// A single filesystem sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Rename the given side into the archive as a stash file.
    Stash(Side),
    /// Relocate bytes from one side to the other.
    Move {
        /// Side that currently holds the data.
        from: Side,
        /// Side that receives it.
        to: Side,
    },
    /// Make the restore path resolve to the backup path (or copy in copy mode).
    Link,
}

/// What the executor has to do for an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do.
    Nothing,
    /// The source is missing; report and skip.
    MissingSource(Direction),
    /// Run these steps in order.
    Run(Vec<Step>),
}

/// Decides the status and action for a probed pair.
///
/// The archive always keeps the real bytes and the restore path ends up
/// pointing at it. Data that would be overwritten is stashed first, in
/// either direction.
#[must_use]
pub fn classify(probe: &PathProbeResult, direction: Direction) -> (SyncStatus, Action) {
    let source_exists = match direction.source() {
        Side::Backup => probe.backup_exists,
        Side::Restore => probe.restore_exists,
    };

    match (probe.backup_exists, probe.restore_exists) {
        (false, false) => (SyncStatus::NoSources, Action::Nothing),
        (true, true) if probe.same_file => (SyncStatus::UpToDate, Action::Nothing),
        (true, true) if probe.content_equal => (SyncStatus::NeedsLink, Action::Run(vec![Step::Link])),
        (true, true) => {
            let mut steps = vec![Step::Stash(direction.destination())];
            if direction == Direction::Backup {
                steps.push(Step::Move {
                    from: Side::Restore,
                    to: Side::Backup,
                });
            }
            steps.push(Step::Link);
            (SyncStatus::Conflict, Action::Run(steps))
        }
        _ if !source_exists => (SyncStatus::Error, Action::MissingSource(direction)),
        _ => {
            let steps = match direction {
                Direction::Backup => vec![
                    Step::Move {
                        from: Side::Restore,
                        to: Side::Backup,
                    },
                    Step::Link,
                ],
                // The archive already holds the bytes
                Direction::Restore => vec![Step::Link],
            };
            (SyncStatus::NeedsClaim, Action::Run(steps))
        }
    }
}

/// Status of one tracked item, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStatus {
    /// Tracked item name.
    pub name: String,
    /// Computed status.
    pub status: SyncStatus,
    /// Optional detail (e.g. the missing path).
    pub message: Option<String>,
}

/// Roll-up status of a package made of several items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStatus {
    /// Package name.
    pub name: String,
    /// Per-item statuses in declaration order.
    pub items: Vec<ItemStatus>,
}

impl GroupStatus {
    /// The common status of all items, or `None` when they differ.
    ///
    /// An empty group has no kind.
    #[must_use]
    pub fn kind(&self) -> Option<SyncStatus> {
        let first = self.items.first()?.status;
        self.items
            .iter()
            .all(|item| item.status == first)
            .then_some(first)
    }
}
