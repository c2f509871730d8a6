use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Escapes a dotfile path for storage inside the archive.
///
/// The leading `.` of every path segment becomes `_`; interior dots are left
/// alone, so `.dir.dir/dir.dir/.file.ext` becomes `_dir.dir/dir.dir/_file.ext`.
#[must_use]
pub fn escape_dotfile_path(path: &str) -> String {
    map_segments(path, |segment| match segment.strip_prefix('.') {
        Some(rest) if !rest.is_empty() && rest != "." => format!("_{rest}"),
        _ => segment.to_string(),
    })
}

/// Reverses [`escape_dotfile_path`] for paths that were produced by it.
///
/// Segments that already started with `_` before escaping cannot be told
/// apart, so this is only a right inverse on dotfile names.
#[must_use]
pub fn unescape_dotfile_path(path: &str) -> String {
    map_segments(path, |segment| match segment.strip_prefix('_') {
        Some(rest) if !rest.is_empty() => format!(".{rest}"),
        _ => segment.to_string(),
    })
}

/// Applies `f` to every `/`-separated segment.
fn map_segments(path: &str, f: impl Fn(&str) -> String) -> String {
    path.split('/').map(f).collect::<Vec<_>>().join("/")
}

/// Expands tilde in path to home directory
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    if let Some(path_str) = path.to_str() {
        if path_str == "~" {
            return dirs::home_dir().context("Could not find home directory");
        }
        if let Some(rest) = path_str.strip_prefix("~/") {
            let home = dirs::home_dir().context("Could not find home directory")?;
            return Ok(home.join(rest));
        }
    }
    Ok(path.to_path_buf())
}

/// Makes a path absolute, expanding `~` and resolving relative paths from
/// the current directory.
///
/// # Errors
///
/// Returns an error if the home or current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    let path = expand_tilde(path)?;
    if path.is_absolute() {
        Ok(path)
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}

/// Whether a user-supplied backup argument names a path rather than a
/// bare name to be resolved under the backup root.
#[must_use]
pub fn looks_like_path(value: &str) -> bool {
    value.starts_with('.') || value.starts_with('~') || Path::new(value).is_absolute()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_files_are_not_escaped() {
        assert_eq!(escape_dotfile_path("file_path"), "file_path");
        assert_eq!(escape_dotfile_path("_file_path"), "_file_path");
        assert_eq!(escape_dotfile_path("dir/file_path"), "dir/file_path");
        assert_eq!(escape_dotfile_path("file_path.ext1.ext2"), "file_path.ext1.ext2");
        assert_eq!(
            escape_dotfile_path("dir.e/file_path.ext1.ext2"),
            "dir.e/file_path.ext1.ext2"
        );
    }

    #[test]
    fn test_dotfiles_are_escaped() {
        assert_eq!(escape_dotfile_path(".file_path"), "_file_path");
        assert_eq!(escape_dotfile_path("dir/.file_path"), "dir/_file_path");
        assert_eq!(
            escape_dotfile_path(".dir.dir/dir.dir/.file_path.ext"),
            "_dir.dir/dir.dir/_file_path.ext"
        );
    }

    #[test]
    fn test_relative_markers_are_kept() {
        assert_eq!(escape_dotfile_path("./.vimrc"), "./_vimrc");
        assert_eq!(escape_dotfile_path("../.vimrc"), "../_vimrc");
    }

    #[test]
    fn test_unescape_round_trip() {
        for path in [".a/.b.ext", ".vimrc", ".config/nvim/init.lua"] {
            assert_eq!(unescape_dotfile_path(&escape_dotfile_path(path)), path);
        }
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_tilde(Path::new("~/documents")).unwrap(), home.join("documents"));
        assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
        assert_eq!(
            expand_tilde(Path::new("/absolute/path")).unwrap(),
            PathBuf::from("/absolute/path")
        );
    }

    #[test]
    fn test_make_absolute() {
        let relative = PathBuf::from("relative/path");
        let result = make_absolute(&relative).unwrap();
        assert!(result.is_absolute());
        assert!(result.ends_with("relative/path"));
    }

    #[test]
    fn test_looks_like_path() {
        assert!(looks_like_path("./local"));
        assert!(looks_like_path("../up"));
        assert!(looks_like_path("~/dotfiles"));
        assert!(looks_like_path("/abs/dir"));
        assert!(!looks_like_path("work"));
    }
}
