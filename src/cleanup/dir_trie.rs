use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Component, Path};

/// Role of an archive path relative to the tracked backup paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryRole {
    /// A tracked backup path or something beneath it
    Owned,
    /// Ancestor of at least one tracked backup path
    Transit,
    /// Not related to any tracked item
    Orphan,
}

/// Prefix tree of the archive paths owned by tracked items
pub struct DirTrie {
    /// Child nodes keyed by path component
    children: HashMap<OsString, Self>,
    /// Role of this node
    role: DirectoryRole,
}

impl DirTrie {
    /// Create a new empty trie (the archive root is always Transit)
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            role: DirectoryRole::Transit,
        }
    }

    /// Marks `path` as owned and all of its ancestors below `root` as Transit.
    ///
    /// Paths outside `root` are ignored.
    pub fn insert_owned(&mut self, path: &Path, root: &Path) {
        let Ok(rel_path) = path.strip_prefix(root) else {
            return;
        };

        let mut current = self;

        for component in rel_path.components() {
            let Component::Normal(name) = component else {
                continue;
            };

            current = current
                .children
                .entry(name.to_os_string())
                .or_insert_with(|| Self {
                    children: HashMap::new(),
                    role: DirectoryRole::Transit,
                });
        }

        current.role = DirectoryRole::Owned;
    }

    /// Look up the role of a path relative to the archive root
    #[must_use]
    pub fn get_role(&self, rel_path: &Path) -> DirectoryRole {
        let mut current = self;

        for component in rel_path.components() {
            if current.role == DirectoryRole::Owned {
                return DirectoryRole::Owned;
            }

            let Component::Normal(name) = component else {
                return DirectoryRole::Orphan;
            };

            match current.children.get(name) {
                Some(child) => current = child,
                None => return DirectoryRole::Orphan,
            }
        }

        current.role
    }
}

impl Default for DirTrie {
    fn default() -> Self {
        Self::new()
    }
}
