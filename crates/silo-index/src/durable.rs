use std::path::Path;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::traits::IndexStore;

/// Name table: the key is the entry name, the value carries no payload.
const ENTRIES: TableDefinition<&str, ()> = TableDefinition::new("entries");

/// Durable index backed by an embedded `redb` database.
///
/// Every mutation runs in its own write transaction and commits with redb's
/// default durability (data is fsynced before the commit returns), so a
/// successful `insert` or `delete` survives a crash and reopen. The engine's
/// own file lock governs two processes sharing one database file.
pub struct RedbIndex {
    db: Database,
}

impl RedbIndex {
    /// Open (or create) the index database at `path`.
    pub fn open(path: &Path) -> IndexResult<Self> {
        let db = Database::create(path)?;

        // Create the entries table up front so reads on a fresh database do
        // not fail with a missing-table error.
        let txn = db.begin_write()?;
        txn.open_table(ENTRIES)?;
        txn.commit()?;

        debug!(path = %path.display(), "opened index database");
        Ok(Self { db })
    }
}

impl IndexStore for RedbIndex {
    fn contains(&self, name: &str) -> IndexResult<bool> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        Ok(table.get(name)?.is_some())
    }

    fn insert(&self, name: &str) -> IndexResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ENTRIES)?;
            if table.get(name)?.is_some() {
                // The transaction aborts on drop, leaving the table untouched.
                return Err(IndexError::AlreadyExists(name.to_string()));
            }
            table.insert(name, ())?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete(&self, name: &str) -> IndexResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(ENTRIES)?;
            let was_present = table.remove(name)?.is_some();
            was_present
        };
        txn.commit()?;
        Ok(removed)
    }

    fn list_all(&self) -> IndexResult<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        let mut names = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            names.push(key.value().to_string());
        }
        Ok(names)
    }

    fn len(&self) -> IndexResult<u64> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ENTRIES)?;
        Ok(table.len()?)
    }
}

impl std::fmt::Debug for RedbIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbIndex").finish_non_exhaustive()
    }
}
