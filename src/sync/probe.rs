use super::SyncError;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{Level, span, trace};
use walkdir::WalkDir;

/// Chunk size used when streaming two files side by side.
const COMPARE_CHUNK: usize = 64 * 1024;

/// Observations about a backup/restore pair at a single point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathProbeResult {
    /// The backup path exists (a dangling symlink counts).
    pub backup_exists: bool,
    /// The restore path exists (a dangling symlink counts).
    pub restore_exists: bool,
    /// Both paths resolve to the same underlying file.
    pub same_file: bool,
    /// Both paths hold identical bytes. Always true when `same_file` is.
    pub content_equal: bool,
}

/// Inspects a backup/restore pair.
///
/// A missing path is an observation, not an error. Only failures to read
/// metadata or content of paths that do exist are reported.
///
/// # Errors
///
/// Returns [`SyncError::Io`] if an existing path cannot be inspected or read.
pub fn probe(backup_path: &Path, restore_path: &Path) -> Result<PathProbeResult, SyncError> {
    let _span = span!(Level::DEBUG, "probe", backup = %backup_path.display()).entered();

    let backup_exists = exists(backup_path)?;
    let restore_exists = exists(restore_path)?;

    let mut result = PathProbeResult {
        backup_exists,
        restore_exists,
        ..PathProbeResult::default()
    };

    if backup_exists && restore_exists {
        result.same_file = is_same_file(backup_path, restore_path);
        result.content_equal = result.same_file || contents_equal(backup_path, restore_path)?;
    }

    trace!(?result, "probed pair");
    Ok(result)
}

/// Existence check that does not follow the final symlink.
fn exists(path: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => Ok(false),
        Err(e) => Err(SyncError::io("inspect", path, e)),
    }
}

/// Whether two paths resolve to the same file (symlink or hard link).
///
/// Dangling links never count as the same file.
#[cfg(unix)]
pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

/// Whether two paths resolve to the same file (symlink or hard link).
#[cfg(not(unix))]
pub(crate) fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(ca), Ok(cb)) => ca == cb,
        _ => false,
    }
}

/// Byte-for-byte comparison of two existing paths.
///
/// Files are streamed; directories are compared entry by entry.
fn contents_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let (Ok(ma), Ok(mb)) = (fs::metadata(a), fs::metadata(b)) else {
        // At least one side is a dangling symlink
        return Ok(false);
    };

    match (ma.is_dir(), mb.is_dir()) {
        (true, true) => dirs_equal(a, b),
        (false, false) => {
            if ma.len() != mb.len() {
                return Ok(false);
            }
            files_equal(a, b)
        }
        _ => Ok(false),
    }
}

/// Streams both files and compares them chunk by chunk.
fn files_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let mut ra = BufReader::new(File::open(a).map_err(|e| SyncError::io("read", a, e))?);
    let mut rb = BufReader::new(File::open(b).map_err(|e| SyncError::io("read", b, e))?);

    let mut buf_a = vec![0u8; COMPARE_CHUNK];
    let mut buf_b = vec![0u8; COMPARE_CHUNK];

    loop {
        let na = fill(&mut ra, &mut buf_a).map_err(|e| SyncError::io("read", a, e))?;
        let nb = fill(&mut rb, &mut buf_b).map_err(|e| SyncError::io("read", b, e))?;

        if na != nb || buf_a[..na] != buf_b[..nb] {
            return Ok(false);
        }
        if na == 0 {
            return Ok(true);
        }
    }
}

/// Reads until `buf` is full or the reader is exhausted.
fn fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Kind of an entry inside a compared directory tree.
#[derive(Debug, PartialEq, Eq)]
enum Entry {
    /// Regular file.
    File,
    /// Directory.
    Dir,
    /// Symlink with its target.
    Link(PathBuf),
}

/// Lists a directory tree as relative path -> entry kind.
fn list_tree(root: &Path) -> Result<BTreeMap<PathBuf, Entry>, SyncError> {
    let mut entries = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SyncError::io("list", path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();

        let kind = if entry.file_type().is_symlink() {
            let target =
                fs::read_link(entry.path()).map_err(|e| SyncError::io("read", entry.path(), e))?;
            Entry::Link(target)
        } else if entry.file_type().is_dir() {
            Entry::Dir
        } else {
            Entry::File
        };
        entries.insert(rel, kind);
    }

    Ok(entries)
}

/// Recursive directory comparison.
fn dirs_equal(a: &Path, b: &Path) -> Result<bool, SyncError> {
    let tree_a = list_tree(a)?;
    let tree_b = list_tree(b)?;

    if tree_a != tree_b {
        return Ok(false);
    }

    for (rel, kind) in &tree_a {
        if *kind == Entry::File && !files_equal(&a.join(rel), &b.join(rel))? {
            return Ok(false);
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_probe_neither_exists() {
        let temp = TempDir::new().unwrap();
        let result = probe(&temp.path().join("b"), &temp.path().join("r")).unwrap();
        assert_eq!(result, PathProbeResult::default());
    }

    #[test]
    fn test_probe_only_restore_exists() {
        let temp = TempDir::new().unwrap();
        let restore = temp.path().join(".vimrc");
        fs::write(&restore, "; Vim configuration.").unwrap();

        let result = probe(&temp.path().join("vim/_vimrc"), &restore).unwrap();
        assert!(!result.backup_exists);
        assert!(result.restore_exists);
        assert!(!result.same_file);
        assert!(!result.content_equal);
    }

    #[test]
    fn test_probe_equal_content() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("_pythonrc");
        let restore = temp.path().join(".pythonrc");
        fs::write(&backup, "pythonrc").unwrap();
        fs::write(&restore, "pythonrc").unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(!result.same_file);
        assert!(result.content_equal);
    }

    #[test]
    fn test_probe_different_content_same_length() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("a");
        let restore = temp.path().join("b");
        fs::write(&backup, "abcd").unwrap();
        fs::write(&restore, "abce").unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(!result.content_equal);
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_symlinked_pair() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("_rubocop");
        let restore = temp.path().join(".rubocop");
        fs::write(&backup, "rubocop").unwrap();
        std::os::unix::fs::symlink(&backup, &restore).unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(result.same_file);
        assert!(result.content_equal);
    }

    #[test]
    fn test_probe_hard_linked_pair() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("_rubocop");
        let restore = temp.path().join(".rubocop");
        fs::write(&backup, "rubocop").unwrap();
        fs::hard_link(&backup, &restore).unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(result.same_file);
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_dangling_symlink_exists_but_differs() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("_gone");
        let restore = temp.path().join(".gone");
        fs::write(&backup, "data").unwrap();
        std::os::unix::fs::symlink(temp.path().join("nowhere"), &restore).unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(result.restore_exists);
        assert!(!result.same_file);
        assert!(!result.content_equal);
    }

    #[test]
    fn test_probe_directories() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("_byobu");
        let restore = temp.path().join(".byobu");
        for dir in [&backup, &restore] {
            fs::create_dir_all(dir.join("nested")).unwrap();
            fs::write(dir.join("profile.tmux"), "tmux").unwrap();
            fs::write(dir.join("nested/keys"), "keys").unwrap();
        }

        assert!(probe(&backup, &restore).unwrap().content_equal);

        fs::write(restore.join("nested/keys"), "other").unwrap();
        assert!(!probe(&backup, &restore).unwrap().content_equal);

        fs::write(restore.join("nested/keys"), "keys").unwrap();
        fs::write(restore.join("extra"), "").unwrap();
        assert!(!probe(&backup, &restore).unwrap().content_equal);
    }

    #[test]
    fn test_probe_file_against_directory() {
        let temp = TempDir::new().unwrap();
        let backup = temp.path().join("file");
        let restore = temp.path().join("dir");
        fs::write(&backup, "x").unwrap();
        fs::create_dir(&restore).unwrap();

        let result = probe(&backup, &restore).unwrap();
        assert!(result.backup_exists && result.restore_exists);
        assert!(!result.content_equal);
    }

    #[test]
    fn test_probe_parent_is_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        fs::write(&file, "x").unwrap();

        let result = probe(&file.join("child"), &temp.path().join("missing")).unwrap();
        assert!(!result.backup_exists);
    }
}
