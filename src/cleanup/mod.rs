//! Archive cleanup.
//!
//! Conflict resolution leaves stash files behind, and packages that stop
//! declaring a file leave their archive copy behind. [`CleanupScanner`] finds
//! both kinds of leftovers and [`confirm_and_delete`] removes them one by one.

/// Prefix tree of owned archive paths.
pub mod dir_trie;

pub use dir_trie::{DirTrie, DirectoryRole};

use crate::output::Reporter;
use crate::sync::{TrackedItem, parse_stash_file_name};
use crate::utils::should_ignore;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Which leftovers a cleanup run considers and whether it asks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupPolicy {
    /// Also offer orphaned entries that are not stash files.
    pub untracked: bool,
    /// Ask before every deletion.
    pub confirm: bool,
}

impl Default for CleanupPolicy {
    fn default() -> Self {
        Self {
            untracked: false,
            confirm: true,
        }
    }
}

/// Why a path is offered for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A stash file left by conflict resolution.
    Stash,
    /// An entry no tracked item owns.
    Untracked,
}

/// A path proposed for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDeletion {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the archive root; candidates are ordered by it.
    pub relative: PathBuf,
    /// Why it was proposed.
    pub kind: CandidateKind,
    /// Whether the whole directory tree goes.
    pub is_dir: bool,
}

/// Walks an archive and proposes leftovers for deletion.
#[derive(Debug, Clone)]
pub struct CleanupScanner {
    /// Root of the archive tree.
    archive_root: PathBuf,
    /// Prefix of stash file names.
    cleanup_prefix: String,
    /// Paths never considered, relative to the archive root.
    ignore_patterns: Vec<String>,
}

impl CleanupScanner {
    /// Creates a scanner for one archive.
    pub fn new(
        archive_root: impl Into<PathBuf>,
        cleanup_prefix: impl Into<String>,
        ignore_patterns: Vec<String>,
    ) -> Self {
        Self {
            archive_root: archive_root.into(),
            cleanup_prefix: cleanup_prefix.into(),
            ignore_patterns,
        }
    }

    /// Finds deletion candidates, sorted by relative path.
    ///
    /// `items` are all items whose archive data must be kept: their backup
    /// paths, everything below them and their ancestors are never proposed.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive tree cannot be walked.
    pub fn scan<'i>(
        &self,
        items: impl IntoIterator<Item = &'i TrackedItem>,
        policy: &CleanupPolicy,
    ) -> Result<Vec<CandidateDeletion>> {
        let mut trie = DirTrie::new();
        for item in items {
            trie.insert_owned(&item.backup_path, &self.archive_root);
        }

        if !self.archive_root.is_dir() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        let mut walker = WalkDir::new(&self.archive_root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.with_context(|| {
                format!("Failed to scan archive: {}", self.archive_root.display())
            })?;
            let path = entry.path();
            let relative = path
                .strip_prefix(&self.archive_root)
                .unwrap_or(path)
                .to_path_buf();
            let is_dir = entry.file_type().is_dir();

            match trie.get_role(&relative) {
                DirectoryRole::Owned => {
                    if is_dir {
                        walker.skip_current_dir();
                    }
                    continue;
                }
                DirectoryRole::Transit => continue,
                DirectoryRole::Orphan => {}
            }

            if should_ignore(&relative, &self.ignore_patterns) {
                if is_dir {
                    walker.skip_current_dir();
                }
                continue;
            }

            let kind = if self.is_stash(path) {
                CandidateKind::Stash
            } else if policy.untracked && (!is_dir || !self.contains_ignored(path)) {
                CandidateKind::Untracked
            } else {
                continue;
            };

            debug!(path = %relative.display(), ?kind, "cleanup candidate");
            candidates.push(CandidateDeletion {
                path: path.to_path_buf(),
                relative,
                kind,
                is_dir,
            });
            if is_dir {
                walker.skip_current_dir();
            }
        }

        candidates.sort_by(|a, b| a.relative.cmp(&b.relative));
        Ok(candidates)
    }

    /// Whether the file name follows the stash naming scheme.
    fn is_stash(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| parse_stash_file_name(&self.cleanup_prefix, n).is_some())
    }

    /// Whether an orphaned directory holds anything that must survive.
    fn contains_ignored(&self, dir: &Path) -> bool {
        WalkDir::new(dir)
            .min_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
            .any(|entry| {
                let relative = entry
                    .path()
                    .strip_prefix(&self.archive_root)
                    .unwrap_or(entry.path());
                should_ignore(relative, &self.ignore_patterns)
            })
    }
}

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Returns whether the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Prompts on stdout and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        print!("{question} [y/N]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        let answer = input.trim();
        Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
    }
}

/// Answers every question with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Outcome of a cleanup run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    /// Paths that were deleted (or would be, in dry-run mode).
    pub deleted: Vec<PathBuf>,
    /// Paths the user chose to keep.
    pub kept: Vec<PathBuf>,
    /// Paths whose deletion failed.
    pub failed: Vec<PathBuf>,
}

/// Deletes candidates in order, asking first when the policy says so.
///
/// A failed deletion is reported and does not stop the remaining ones.
///
/// # Errors
///
/// Returns an error only if a confirmation prompt fails.
pub fn confirm_and_delete(
    candidates: &[CandidateDeletion],
    policy: &CleanupPolicy,
    confirm: &mut dyn Confirm,
    reporter: &mut dyn Reporter,
    dry_run: bool,
) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for candidate in candidates {
        let path = &candidate.path;
        if policy.confirm && !confirm.confirm(&format!("Delete \"{}\"?", path.display()))? {
            report.kept.push(path.clone());
            continue;
        }

        reporter.info(&format!("Deleting \"{}\"", path.display()));
        if dry_run {
            report.deleted.push(path.clone());
            continue;
        }

        let result = if candidate.is_dir {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };

        match result {
            Ok(()) => report.deleted.push(path.clone()),
            Err(e) => {
                reporter.error(&format!("Failed to delete \"{}\": {e}", path.display()));
                report.failed.push(path.clone());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Recorder;
    use tempfile::TempDir;

    struct Archive {
        temp: TempDir,
        items: Vec<TrackedItem>,
    }

    impl Archive {
        /// bash/_bashrc and vim/_vimrc tracked, one stash file each plus an
        /// untracked nested directory under bash/
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let root = temp.path().join("dotfiles");
            let items = vec![
                TrackedItem::new(".bashrc", root.join("bash/_bashrc"), temp.path().join(".bashrc")),
                TrackedItem::new(".vimrc", root.join("vim/_vimrc"), temp.path().join(".vimrc")),
            ];

            for (path, content) in [
                ("bash/_bashrc", "bashrc"),
                ("bash/setup-backup-1-_bash_local", "stash"),
                ("vim/setup-backup-1-_vimrc", "stash"),
                ("bash/folder/nested/deeper/file", "untracked"),
                ("config.toml", "enabled_task_names = []"),
            ] {
                let full = root.join(path);
                fs::create_dir_all(full.parent().unwrap()).unwrap();
                fs::write(full, content).unwrap();
            }

            Self { temp, items }
        }

        fn root(&self) -> PathBuf {
            self.temp.path().join("dotfiles")
        }

        fn scanner(&self) -> CleanupScanner {
            CleanupScanner::new(self.root(), "setup-backup", vec!["config.toml".to_string()])
        }

        fn relative(candidates: &[CandidateDeletion]) -> Vec<String> {
            candidates
                .iter()
                .map(|c| c.relative.to_string_lossy().into_owned())
                .collect()
        }
    }

    #[test]
    fn test_default_policy_offers_only_stash_files() {
        let archive = Archive::new();
        let candidates = archive
            .scanner()
            .scan(&archive.items, &CleanupPolicy::default())
            .unwrap();

        assert_eq!(
            Archive::relative(&candidates),
            vec!["bash/setup-backup-1-_bash_local", "vim/setup-backup-1-_vimrc"]
        );
        assert!(candidates.iter().all(|c| c.kind == CandidateKind::Stash));
    }

    #[test]
    fn test_untracked_policy_offers_whole_directory() {
        let archive = Archive::new();
        let policy = CleanupPolicy {
            untracked: true,
            confirm: true,
        };
        let candidates = archive.scanner().scan(&archive.items, &policy).unwrap();

        assert_eq!(
            Archive::relative(&candidates),
            vec![
                "bash/folder",
                "bash/setup-backup-1-_bash_local",
                "vim/setup-backup-1-_vimrc"
            ]
        );
        assert_eq!(candidates[0].kind, CandidateKind::Untracked);
        assert!(candidates[0].is_dir);
    }

    #[test]
    fn test_directory_with_ignored_content_is_not_offered_whole() {
        let archive = Archive::new();
        fs::write(archive.root().join("bash/folder/config.toml"), "").unwrap();
        let policy = CleanupPolicy {
            untracked: true,
            confirm: false,
        };
        let candidates = archive.scanner().scan(&archive.items, &policy).unwrap();

        let relative = Archive::relative(&candidates);
        assert!(!relative.contains(&"bash/folder".to_string()));
        assert!(relative.contains(&"bash/folder/nested".to_string()));
    }

    #[test]
    fn test_missing_archive_has_no_candidates() {
        let temp = TempDir::new().unwrap();
        let scanner = CleanupScanner::new(temp.path().join("nope"), "setup-backup", Vec::new());
        assert!(scanner.scan(&Vec::new(), &CleanupPolicy::default()).unwrap().is_empty());
    }

    #[test]
    fn test_nothing_to_clean_prompts_nothing() {
        struct Panicking;
        impl Confirm for Panicking {
            fn confirm(&mut self, _question: &str) -> Result<bool> {
                panic!("no prompt expected");
            }
        }

        let mut recorder = Recorder::new();
        let report = confirm_and_delete(
            &[],
            &CleanupPolicy::default(),
            &mut Panicking,
            &mut recorder,
            false,
        )
        .unwrap();
        assert_eq!(report, CleanupReport::default());
        assert!(recorder.entries.is_empty());
    }

    #[test]
    fn test_declined_candidates_are_kept() {
        let archive = Archive::new();
        let candidates = archive
            .scanner()
            .scan(&archive.items, &CleanupPolicy::default())
            .unwrap();
        let mut recorder = Recorder::new();

        let report = confirm_and_delete(
            &candidates,
            &CleanupPolicy::default(),
            &mut FixedAnswer(false),
            &mut recorder,
            false,
        )
        .unwrap();

        assert_eq!(report.kept.len(), 2);
        assert!(candidates.iter().all(|c| c.path.exists()));
    }

    #[test]
    fn test_unconfirmed_policy_deletes_everything() {
        let archive = Archive::new();
        let policy = CleanupPolicy {
            untracked: true,
            confirm: false,
        };
        let candidates = archive.scanner().scan(&archive.items, &policy).unwrap();
        let mut recorder = Recorder::new();

        let report = confirm_and_delete(
            &candidates,
            &policy,
            &mut FixedAnswer(false),
            &mut recorder,
            false,
        )
        .unwrap();

        assert_eq!(report.deleted.len(), 3);
        assert!(candidates.iter().all(|c| !c.path.exists()));
        assert!(archive.root().join("bash/_bashrc").exists());
        assert!(archive.root().join("config.toml").exists());
        assert_eq!(
            recorder.lines()[0],
            format!("I: Deleting \"{}\"", archive.root().join("bash/folder").display())
        );
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let archive = Archive::new();
        let candidates = archive
            .scanner()
            .scan(&archive.items, &CleanupPolicy::default())
            .unwrap();
        let mut recorder = Recorder::new();

        let report = confirm_and_delete(
            &candidates,
            &CleanupPolicy::default(),
            &mut FixedAnswer(true),
            &mut recorder,
            true,
        )
        .unwrap();

        assert_eq!(report.deleted.len(), 2);
        assert!(candidates.iter().all(|c| c.path.exists()));
    }
}
