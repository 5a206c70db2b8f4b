use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use silo_types::EntryDigest;

/// Width of each sharding directory segment, in hex characters.
const SEGMENT_WIDTH: usize = 2;
/// Number of sharding directory levels.
const SEGMENTS: usize = 3;

/// Hash-sharded path derivation under a fixed root.
///
/// A name's digest is rendered as 64 lowercase hex characters and split into
/// three 2-character directory segments plus the 58-character remainder as
/// the file name:
///
/// ```text
/// {root}/ab/cd/ef/<remaining 58 hex chars>
/// ```
///
/// Derivation is a pure function of the name. The tree owns no state beyond
/// the directories materialized on disk as a side effect; directories are
/// never removed, so the tree only grows. Path uniqueness rests on the
/// collision resistance of the hash rather than an explicit check.
#[derive(Clone, Debug)]
pub struct PathTree {
    root: PathBuf,
}

impl PathTree {
    /// Create a tree rooted at `root`. The directory itself is not touched.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The tree root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Derive the storage path for `name` without touching the filesystem.
    pub fn locate(&self, name: &str) -> PathBuf {
        let hex = EntryDigest::of_name(name).to_hex();
        let mut path = self.root.clone();
        for i in 0..SEGMENTS {
            path.push(&hex[i * SEGMENT_WIDTH..(i + 1) * SEGMENT_WIDTH]);
        }
        path.push(&hex[SEGMENTS * SEGMENT_WIDTH..]);
        path
    }

    /// Derive the storage path for `name`, creating any missing parent
    /// directories. Safe to call when the directories already exist.
    pub fn materialize(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.locate(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_is_deterministic() {
        let tree = PathTree::new("/data/tree");
        assert_eq!(tree.locate("entry"), tree.locate("entry"));
    }

    #[test]
    fn distinct_names_map_to_distinct_paths() {
        let tree = PathTree::new("/data/tree");
        assert_ne!(tree.locate("alpha"), tree.locate("beta"));
    }

    #[test]
    fn path_decomposes_the_digest() {
        let tree = PathTree::new("/data/tree");
        let path = tree.locate("sharded");

        let relative = path.strip_prefix("/data/tree").unwrap();
        let segments: Vec<&str> = relative
            .iter()
            .map(|c| c.to_str().unwrap())
            .collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 2);
        assert_eq!(segments[2].len(), 2);
        assert_eq!(segments[3].len(), 58);

        // Concatenating the segments reproduces the full digest.
        let digest = EntryDigest::of_name("sharded").to_hex();
        assert_eq!(segments.concat(), digest);
    }

    #[test]
    fn locate_does_not_touch_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let tree = PathTree::new(dir.path().join("tree"));
        let path = tree.locate("untouched");
        assert!(!path.exists());
        assert!(!tree.root().exists());
    }

    #[test]
    fn materialize_creates_exactly_the_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let tree = PathTree::new(dir.path().join("tree"));

        let path = tree.materialize("made").unwrap();
        assert_eq!(path, tree.locate("made"));
        assert!(path.parent().unwrap().is_dir());
        // The leaf is a file name, not a directory; nothing creates it.
        assert!(!path.exists());
    }

    #[test]
    fn materialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let tree = PathTree::new(dir.path().join("tree"));
        let first = tree.materialize("again").unwrap();
        let second = tree.materialize("again").unwrap();
        assert_eq!(first, second);
    }
}
