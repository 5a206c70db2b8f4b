//! Durable name index for Silo.
//!
//! This crate owns the authoritative record of which entry names exist. The
//! index is a set of unique strings with point lookup, insert, delete, and
//! full enumeration; every mutation is committed to stable storage before
//! the call returns.
//!
//! # Backends
//!
//! All backends implement the [`IndexStore`] trait:
//!
//! - [`RedbIndex`] — embedded `redb` database, synchronously durable
//! - [`InMemoryIndex`] — `BTreeSet`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A name is indexed at most once (set semantics).
//! 2. Once `insert` or `delete` returns successfully, the change survives a
//!    crash and reopen (in-memory backend excepted, by definition).
//! 3. The index never consults the filesystem tree; it is the single source
//!    of truth for existence.
//! 4. All storage-engine errors are propagated, never silently ignored.

pub mod durable;
pub mod error;
pub mod memory;
pub mod traits;

pub use durable::RedbIndex;
pub use error::{IndexError, IndexResult};
pub use memory::InMemoryIndex;
pub use traits::IndexStore;
