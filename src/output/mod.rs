//! Output formatting and reporting for the setup CLI.
//!
//! This module provides:
//! - Verbosity control (quiet, normal, verbose)
//! - Colored helpers for routine messages, warnings and errors
//! - The [`Reporter`] seam the sync engine writes its log lines through
//! - The display strings for [`SyncStatus`]

use crate::sync::SyncStatus;
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose messages in addition to standard output.
    Verbose = 2,
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    println!("{}", message.green());
}

/// Prints an error message in bold red (always shown).
pub fn error(message: &str) {
    eprintln!("{}", message.red().bold());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{} {}", "W:".yellow().bold(), message);
}

/// Prints an informational message (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    println!("{message}");
}

/// Severity of a line emitted by the sync engine or the cleanup scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// One line per item or package acted upon.
    Info,
    /// One line per filesystem sub-step.
    Verbose,
    /// A failure for a single item.
    Error,
}

impl Severity {
    /// Short marker prefixed to every line.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Info => "I:",
            Self::Verbose => "V:",
            Self::Error => "E:",
        }
    }
}

/// Sink for engine log lines.
///
/// The engine only decides *what* happened and at which severity; the
/// reporter decides how (and whether) it is shown.
pub trait Reporter {
    /// Records one line.
    fn report(&mut self, severity: Severity, message: &str);

    /// Shorthand for [`Severity::Info`].
    fn info(&mut self, message: &str) {
        self.report(Severity::Info, message);
    }

    /// Shorthand for [`Severity::Verbose`].
    fn verbose(&mut self, message: &str) {
        self.report(Severity::Verbose, message);
    }

    /// Shorthand for [`Severity::Error`].
    fn error(&mut self, message: &str) {
        self.report(Severity::Error, message);
    }
}

/// Reporter printing to the terminal according to the global verbosity.
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Reporter for Console {
    fn report(&mut self, severity: Severity, message: &str) {
        let verbosity = get_verbosity();
        match severity {
            Severity::Info if verbosity != Verbosity::Quiet => {
                println!("{} {}", severity.marker().dimmed().bold(), message);
            }
            Severity::Verbose if verbosity == Verbosity::Verbose => {
                println!("{} {}", severity.marker().dimmed(), message.dimmed());
            }
            Severity::Error => {
                println!("{} {}", severity.marker().red().bold(), message);
            }
            _ => {}
        }
    }
}

/// Reporter that keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    /// Recorded lines in emission order.
    pub entries: Vec<(Severity, String)>,
}

impl Recorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded lines rendered as `<marker> <message>`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(severity, message)| format!("{} {message}", severity.marker()))
            .collect()
    }

    /// Whether any error line was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|(s, _)| *s == Severity::Error)
    }
}

impl Reporter for Recorder {
    fn report(&mut self, severity: Severity, message: &str) {
        self.entries.push((severity, message.to_string()));
    }
}

/// Human-readable text for a status.
#[must_use]
pub const fn status_text(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::NoSources => "no sources to synchronize",
        SyncStatus::UpToDate => "up to date",
        SyncStatus::NeedsLink | SyncStatus::NeedsClaim => "needs sync",
        SyncStatus::Conflict => "differs",
        SyncStatus::Error => "error",
    }
}

/// Formats a status line as `<name>: <status>[: message]`.
#[must_use]
pub fn status_line(name: &str, status: Option<SyncStatus>, message: Option<&str>) -> String {
    // Mixed groups roll up as needing a sync
    let text = status.map_or("needs sync", status_text);
    match message {
        Some(msg) => format!("{name}: {text}: {msg}"),
        None => format!("{name}: {text}"),
    }
}
