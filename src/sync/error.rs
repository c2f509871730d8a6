use super::Direction;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while probing, executing or loading state.
///
/// `MissingSource` and `Io` are scoped to a single tracked item: callers
/// report them and move on. `ConfigCorrupt` aborts the whole run because
/// every later item depends on the configuration that failed to load.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source side for the requested direction does not exist.
    #[error("Cannot {direction}: missing \"{}\"", path.display())]
    MissingSource {
        /// Requested direction.
        direction: Direction,
        /// The missing source path.
        path: PathBuf,
    },

    /// A filesystem call failed.
    #[error("Failed to {operation} \"{}\": {source}", path.display())]
    Io {
        /// Short verb describing what was attempted.
        operation: &'static str,
        /// Path the operation was applied to.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Persisted configuration could not be read or parsed.
    #[error("An error occured while trying to load \"{}\"", path.display())]
    ConfigCorrupt {
        /// File that failed to load.
        path: PathBuf,
        /// Parser or IO message.
        reason: String,
    },
}

impl SyncError {
    /// Builds an [`SyncError::Io`] from an operation name and path.
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the run rather than a single item.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigCorrupt { .. })
    }
}
