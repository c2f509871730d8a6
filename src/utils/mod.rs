//! Utility functions and helpers.
//!
//! - Path manipulation (tilde expansion, dotfile escaping)
//! - Ignore pattern matching
//!
//! # Examples
//!
//! ```
//! use dotsetup::utils::paths::escape_dotfile_path;
//! use dotsetup::utils::should_ignore;
//! use std::path::Path;
//!
//! assert_eq!(escape_dotfile_path(".config/.vimrc"), "_config/_vimrc");
//! assert!(should_ignore(Path::new(".git/HEAD"), &[".git".to_string()]));
//! ```

/// Path manipulation and resolution utilities
pub mod paths;

use glob::{MatchOptions, Pattern};
use std::path::Path;

/// Matching options shared by every ignore pattern.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Determines if a relative path should be ignored based on glob patterns.
///
/// A pattern matches either the whole relative path or any single component
/// of it, so `.git` ignores `.git/HEAD` and `*.swp` ignores `a/b/.x.swp`.
/// Patterns that are not valid globs are compared literally.
#[must_use]
pub fn should_ignore(path: &Path, patterns: &[String]) -> bool {
    patterns.iter().any(|raw| {
        let raw = raw.trim_end_matches('/');
        match Pattern::new(raw) {
            Ok(pattern) => {
                pattern.matches_path_with(path, MATCH_OPTIONS)
                    || path.components().any(|c| {
                        c.as_os_str()
                            .to_str()
                            .is_some_and(|s| pattern.matches_with(s, MATCH_OPTIONS))
                    })
            }
            Err(_) => path.components().any(|c| c.as_os_str() == raw),
        }
    })
}
