use crate::error::IndexResult;

/// Durable set of unique entry names.
///
/// All implementations must satisfy these invariants:
/// - A name is indexed at most once (set semantics).
/// - Mutations are committed to stable storage before the call returns: once
///   `insert` or `delete` succeeds, the change survives a crash and reopen.
/// - Enumeration order is not meaningful and callers must not rely on it.
/// - All storage failures are propagated, never silently ignored.
pub trait IndexStore: Send + Sync {
    /// Whether a row for `name` exists.
    fn contains(&self, name: &str) -> IndexResult<bool>;

    /// Insert a row for `name`.
    ///
    /// Fails with [`IndexError::AlreadyExists`](crate::IndexError::AlreadyExists)
    /// if the name is already indexed. Callers that need check-then-insert
    /// atomicity must hold their own lock around both calls.
    fn insert(&self, name: &str) -> IndexResult<()>;

    /// Delete the row for `name`. Returns `true` if a row was removed.
    fn delete(&self, name: &str) -> IndexResult<bool>;

    /// Every indexed name.
    fn list_all(&self) -> IndexResult<Vec<String>>;

    /// Number of indexed names.
    fn len(&self) -> IndexResult<u64>;

    /// Whether the index holds no names.
    fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush and release the backing storage.
    ///
    /// Default is a no-op: backends that commit synchronously have nothing
    /// left to flush, and resources are released on drop.
    fn close(self: Box<Self>) -> IndexResult<()> {
        Ok(())
    }
}
