use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::error::{IndexError, IndexResult};
use crate::traits::IndexStore;

/// In-memory, `BTreeSet`-based index.
///
/// Intended for tests and embedding. Nothing is persisted: every instance
/// starts empty and all state is lost on drop. Names are held behind an
/// `RwLock` for safe concurrent access.
pub struct InMemoryIndex {
    names: RwLock<BTreeSet<String>>,
}

impl InMemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self {
            names: RwLock::new(BTreeSet::new()),
        }
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexStore for InMemoryIndex {
    fn contains(&self, name: &str) -> IndexResult<bool> {
        Ok(self.names.read().expect("lock poisoned").contains(name))
    }

    fn insert(&self, name: &str) -> IndexResult<()> {
        let mut names = self.names.write().expect("lock poisoned");
        if names.contains(name) {
            return Err(IndexError::AlreadyExists(name.to_string()));
        }
        names.insert(name.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> IndexResult<bool> {
        Ok(self.names.write().expect("lock poisoned").remove(name))
    }

    fn list_all(&self) -> IndexResult<Vec<String>> {
        let names = self.names.read().expect("lock poisoned");
        Ok(names.iter().cloned().collect())
    }

    fn len(&self) -> IndexResult<u64> {
        Ok(self.names.read().expect("lock poisoned").len() as u64)
    }
}

impl std::fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.names.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryIndex")
            .field("name_count", &count)
            .finish()
    }
}
