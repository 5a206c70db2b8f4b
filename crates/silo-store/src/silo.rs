//! The store facade: a durable name index plus a hash-sharded file tree.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use silo_index::{IndexStore, RedbIndex};

use crate::error::{SiloError, SiloResult};
use crate::mode::OpenMode;
use crate::tree::PathTree;

/// Options for [`Silo::create`].
#[derive(Clone, Copy, Debug)]
pub struct CreateOptions {
    mkdirs: bool,
    exists_ok: bool,
}

impl CreateOptions {
    /// Defaults: create parent directories, fail on an existing entry.
    pub fn new() -> Self {
        Self {
            mkdirs: true,
            exists_ok: false,
        }
    }

    /// Create missing parent directories for the returned path (default: true).
    pub fn mkdirs(mut self, mkdirs: bool) -> Self {
        self.mkdirs = mkdirs;
        self
    }

    /// Return the existing entry's path instead of failing (default: false).
    pub fn exists_ok(mut self, exists_ok: bool) -> Self {
        self.exists_ok = exists_ok;
        self
    }
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A named-entry store.
///
/// Maps logical entry names to files on disk: the name's hash digest derives
/// a sharded path under `{root}/tree`, and a durable index under
/// `{root}/index.redb` records which names exist. The index is the single
/// source of truth; the tree is derived state.
///
/// Every operation that consults or mutates the index runs under one
/// instance-owned lock, so check-then-act sequences (notably [`create`])
/// are atomic with respect to concurrent callers in this process.
/// Cross-process coordination is delegated to the index's storage engine.
///
/// [`create`]: Silo::create
pub struct Silo {
    root: PathBuf,
    tree: PathTree,
    /// Serializes every index read-modify-write. File I/O performed by
    /// [`Silo::open_file`] happens outside it.
    index: Mutex<Box<dyn IndexStore>>,
}

impl Silo {
    /// File name of the index database inside the root directory.
    const INDEX_FILE: &'static str = "index.redb";
    /// Directory name of the sharded file tree inside the root directory.
    const TREE_DIR: &'static str = "tree";

    /// Open (or initialize) a store rooted at `root`.
    ///
    /// Creates the root and tree directories if missing and opens the index
    /// database at `{root}/index.redb`.
    pub fn open(root: impl AsRef<Path>) -> SiloResult<Self> {
        let root = root.as_ref().to_path_buf();
        let tree_dir = root.join(Self::TREE_DIR);
        fs::create_dir_all(&tree_dir)?;

        let index = RedbIndex::open(&root.join(Self::INDEX_FILE))?;
        debug!(root = %root.display(), "opened silo");
        Ok(Self {
            tree: PathTree::new(tree_dir),
            index: Mutex::new(Box::new(index)),
            root,
        })
    }

    /// Open a store with a caller-supplied index backend.
    ///
    /// The tree still lives under `{root}/tree`. Useful for embedding with
    /// [`InMemoryIndex`](silo_index::InMemoryIndex) or a custom engine.
    pub fn with_index(root: impl AsRef<Path>, index: Box<dyn IndexStore>) -> SiloResult<Self> {
        let root = root.as_ref().to_path_buf();
        let tree_dir = root.join(Self::TREE_DIR);
        fs::create_dir_all(&tree_dir)?;
        Ok(Self {
            tree: PathTree::new(tree_dir),
            index: Mutex::new(index),
            root,
        })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create an entry named `name` and return its storage path.
    ///
    /// The existence check and the insert run under one lock acquisition:
    /// two concurrent `create` calls for the same name resolve to exactly
    /// one success and one [`SiloError::AlreadyExists`]. With
    /// `exists_ok`, an existing entry yields its path without mutating the
    /// index.
    pub fn create(&self, name: &str, opts: CreateOptions) -> SiloResult<PathBuf> {
        let index = self.lock_index();
        if index.contains(name)? {
            if opts.exists_ok {
                return self.derive(name, opts.mkdirs);
            }
            return Err(SiloError::AlreadyExists(name.to_string()));
        }
        index.insert(name)?;
        debug!(name, "created entry");
        self.derive(name, opts.mkdirs)
    }

    /// Whether an entry named `name` exists.
    pub fn exists(&self, name: &str) -> SiloResult<bool> {
        Ok(self.lock_index().contains(name)?)
    }

    /// The storage path for `name`, or `None` if no such entry exists.
    ///
    /// Never creates directories.
    pub fn get(&self, name: &str) -> SiloResult<Option<PathBuf>> {
        if self.lock_index().contains(name)? {
            Ok(Some(self.tree.locate(name)))
        } else {
            Ok(None)
        }
    }

    /// Remove the entry named `name` and delete its backing file.
    ///
    /// Returns `false` without touching the filesystem if no such entry is
    /// indexed. Fails with [`SiloError::Drift`] if the index had a row but
    /// the backing file is missing on disk.
    pub fn remove(&self, name: &str) -> SiloResult<bool> {
        let index = self.lock_index();
        if !index.delete(name)? {
            return Ok(false);
        }
        let path = self.tree.locate(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(name, "removed entry");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SiloError::Drift {
                name: name.to_string(),
                path,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Every entry name in the index. Order is not meaningful.
    pub fn list(&self) -> SiloResult<Vec<String>> {
        Ok(self.lock_index().list_all()?)
    }

    /// Number of entries.
    pub fn len(&self) -> SiloResult<u64> {
        Ok(self.lock_index().len()?)
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> SiloResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Open the backing file for `name` under the given mode.
    ///
    /// Binary write-capable modes first create the entry (idempotently,
    /// with parent directories), so the returned handle always points at a
    /// path whose entry exists. All other modes open the derived path as-is
    /// and surface whatever the filesystem reports. File I/O on the handle
    /// happens outside the store's lock; concurrent writers to the same
    /// file are governed by ordinary file semantics.
    pub fn open_file(&self, name: &str, mode: OpenMode) -> SiloResult<File> {
        let path = if mode.implies_create() {
            self.create(name, CreateOptions::new().exists_ok(true))?
        } else {
            self.tree.locate(name)
        };
        Ok(mode.open_options().open(path)?)
    }

    /// Parse `mode` and open as in [`Silo::open_file`].
    pub fn open_file_str(&self, name: &str, mode: &str) -> SiloResult<File> {
        self.open_file(name, OpenMode::parse(mode)?)
    }

    /// Close the store, flushing and releasing the index.
    ///
    /// Consumes the store; the move makes further operations
    /// unrepresentable.
    pub fn close(self) -> SiloResult<()> {
        let index = self.index.into_inner().expect("index lock poisoned");
        index.close()?;
        debug!(root = %self.root.display(), "closed silo");
        Ok(())
    }

    fn lock_index(&self) -> MutexGuard<'_, Box<dyn IndexStore>> {
        self.index.lock().expect("index lock poisoned")
    }

    fn derive(&self, name: &str, mkdirs: bool) -> SiloResult<PathBuf> {
        if mkdirs {
            Ok(self.tree.materialize(name)?)
        } else {
            Ok(self.tree.locate(name))
        }
    }
}

impl fmt::Debug for Silo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Silo").field("root", &self.root).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use silo_index::InMemoryIndex;

    use super::*;

    fn open_temp() -> (tempfile::TempDir, Silo) {
        let dir = tempfile::tempdir().unwrap();
        let silo = Silo::open(dir.path()).unwrap();
        (dir, silo)
    }

    /// Write something at the entry's path so `remove` has a file to delete.
    fn touch(silo: &Silo, name: &str) {
        let path = silo
            .create(name, CreateOptions::new().exists_ok(true))
            .unwrap();
        fs::write(path, b"contents").unwrap();
    }

    // -----------------------------------------------------------------------
    // Create / exists / get round trips
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_exists_and_get() {
        let (_dir, silo) = open_temp();
        let path = silo.create("entry", CreateOptions::new()).unwrap();

        assert!(silo.exists("entry").unwrap());
        assert_eq!(silo.get("entry").unwrap(), Some(path));
    }

    #[test]
    fn create_returns_a_sharded_path_under_the_tree() {
        let (_dir, silo) = open_temp();
        let path = silo.create("entry", CreateOptions::new()).unwrap();

        let relative = path.strip_prefix(silo.root().join("tree")).unwrap();
        let segments: Vec<&str> = relative.iter().map(|c| c.to_str().unwrap()).collect();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 2);
        assert_eq!(segments[2].len(), 2);
        assert_eq!(segments[3].len(), 58);
        // Parent directories were materialized, the file itself was not.
        assert!(path.parent().unwrap().is_dir());
        assert!(!path.exists());
    }

    #[test]
    fn create_without_mkdirs_leaves_the_tree_untouched() {
        let (_dir, silo) = open_temp();
        let path = silo
            .create("entry", CreateOptions::new().mkdirs(false))
            .unwrap();
        assert!(!path.parent().unwrap().exists());
        assert!(silo.exists("entry").unwrap());
    }

    #[test]
    fn create_twice_with_exists_ok_is_idempotent() {
        let (_dir, silo) = open_temp();
        let first = silo.create("entry", CreateOptions::new()).unwrap();
        let second = silo
            .create("entry", CreateOptions::new().exists_ok(true))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(silo.len().unwrap(), 1);
    }

    #[test]
    fn create_twice_without_exists_ok_is_rejected() {
        let (_dir, silo) = open_temp();
        silo.create("entry", CreateOptions::new()).unwrap();

        let err = silo.create("entry", CreateOptions::new()).unwrap_err();
        assert!(matches!(err, SiloError::AlreadyExists(name) if name == "entry"));
        assert_eq!(silo.len().unwrap(), 1);
    }

    #[test]
    fn get_missing_entry_returns_none() {
        let (_dir, silo) = open_temp();
        assert_eq!(silo.get("missing").unwrap(), None);
        assert!(!silo.exists("missing").unwrap());
    }

    // -----------------------------------------------------------------------
    // Remove
    // -----------------------------------------------------------------------

    #[test]
    fn remove_deletes_the_row_and_the_file() {
        let (_dir, silo) = open_temp();
        touch(&silo, "entry");
        let path = silo.get("entry").unwrap().unwrap();
        assert!(path.exists());

        assert!(silo.remove("entry").unwrap());
        assert!(!silo.exists("entry").unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn remove_missing_entry_returns_false() {
        let (_dir, silo) = open_temp();
        touch(&silo, "other");
        let other_path = silo.get("other").unwrap().unwrap();

        assert!(!silo.remove("missing").unwrap());
        // No filesystem mutation for the miss.
        assert!(other_path.exists());
    }

    #[test]
    fn remove_with_missing_file_reports_drift() {
        let (_dir, silo) = open_temp();
        // Indexed but never written: the file does not exist.
        silo.create("phantom", CreateOptions::new()).unwrap();

        let err = silo.remove("phantom").unwrap_err();
        assert!(matches!(err, SiloError::Drift { name, .. } if name == "phantom"));
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn list_reflects_creates_and_removes() {
        let (_dir, silo) = open_temp();
        for name in ["a", "b", "c"] {
            touch(&silo, name);
        }
        assert!(silo.remove("b").unwrap());

        let mut names = silo.list().unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn len_and_is_empty() {
        let (_dir, silo) = open_temp();
        assert!(silo.is_empty().unwrap());
        silo.create("one", CreateOptions::new()).unwrap();
        assert_eq!(silo.len().unwrap(), 1);
        assert!(!silo.is_empty().unwrap());
    }

    // -----------------------------------------------------------------------
    // Determinism across reopen
    // -----------------------------------------------------------------------

    #[test]
    fn paths_and_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let silo = Silo::open(dir.path()).unwrap();
        let path = silo.create("stable", CreateOptions::new()).unwrap();
        silo.close().unwrap();

        let reopened = Silo::open(dir.path()).unwrap();
        assert!(reopened.exists("stable").unwrap());
        assert_eq!(reopened.get("stable").unwrap(), Some(path));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_creates_of_one_name_resolve_to_one_winner() {
        const CALLERS: usize = 8;

        let (_dir, silo) = open_temp();
        let silo = Arc::new(silo);
        let barrier = Arc::new(Barrier::new(CALLERS));

        let handles: Vec<_> = (0..CALLERS)
            .map(|_| {
                let silo = Arc::clone(&silo);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    silo.create("contested", CreateOptions::new())
                })
            })
            .collect();

        let mut wins = 0;
        let mut rejections = 0;
        for h in handles {
            match h.join().expect("thread should not panic") {
                Ok(_) => wins += 1,
                Err(SiloError::AlreadyExists(_)) => rejections += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(rejections, CALLERS - 1);
        assert_eq!(silo.len().unwrap(), 1);
    }

    // -----------------------------------------------------------------------
    // open_file
    // -----------------------------------------------------------------------

    #[test]
    fn binary_write_mode_creates_the_entry() {
        let (_dir, silo) = open_temp();
        let mut file = silo.open_file_str("written", "wb").unwrap();
        file.write_all(b"payload").unwrap();
        drop(file);

        assert!(silo.exists("written").unwrap());
        let path = silo.get("written").unwrap().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"payload");
    }

    #[test]
    fn binary_read_back_through_open_file() {
        let (_dir, silo) = open_temp();
        silo.open_file_str("entry", "wb")
            .unwrap()
            .write_all(b"round trip")
            .unwrap();

        let mut contents = Vec::new();
        silo.open_file_str("entry", "rb")
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();
        assert_eq!(contents, b"round trip");
    }

    #[test]
    fn binary_write_mode_is_idempotent_on_the_index() {
        let (_dir, silo) = open_temp();
        silo.open_file_str("entry", "wb").unwrap();
        silo.open_file_str("entry", "ab").unwrap();
        assert_eq!(silo.len().unwrap(), 1);
    }

    #[test]
    fn read_mode_on_missing_entry_surfaces_not_found() {
        let (_dir, silo) = open_temp();
        let err = silo.open_file_str("missing", "rb").unwrap_err();
        match err {
            SiloError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!silo.exists("missing").unwrap());
    }

    #[test]
    fn text_write_mode_does_not_create_the_entry() {
        let (_dir, silo) = open_temp();
        // Text modes are passed through without creation; with no entry the
        // sharded parent directories are absent and the open fails.
        let err = silo.open_file_str("textual", "w").unwrap_err();
        assert!(matches!(err, SiloError::Io(_)));
        assert!(!silo.exists("textual").unwrap());
    }

    #[test]
    fn malformed_mode_is_rejected() {
        let (_dir, silo) = open_temp();
        let err = silo.open_file_str("entry", "rw").unwrap_err();
        assert!(matches!(err, SiloError::Mode(_)));
    }

    // -----------------------------------------------------------------------
    // Custom index backends
    // -----------------------------------------------------------------------

    #[test]
    fn with_index_runs_on_an_in_memory_backend() {
        let dir = tempfile::tempdir().unwrap();
        let silo = Silo::with_index(dir.path(), Box::new(InMemoryIndex::new())).unwrap();

        let path = silo.create("volatile", CreateOptions::new()).unwrap();
        fs::write(&path, b"x").unwrap();
        assert!(silo.exists("volatile").unwrap());
        assert!(silo.remove("volatile").unwrap());
        assert!(silo.is_empty().unwrap());
        silo.close().unwrap();
    }

    #[test]
    fn debug_format_shows_the_root() {
        let (_dir, silo) = open_temp();
        let debug = format!("{silo:?}");
        assert!(debug.contains("Silo"));
        assert!(debug.contains("root"));
    }
}
