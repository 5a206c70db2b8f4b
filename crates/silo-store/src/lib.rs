//! Hash-sharded named file storage.
//!
//! [`Silo`] maps logical entry names to files on a filesystem. Each name is
//! hashed (BLAKE3, 256 bits) and the hex digest is split into nested
//! directory segments, so the on-disk tree stays shallow and balanced no
//! matter what the names look like. A small durable index records which
//! names exist; the file tree is derived state.
//!
//! ```text
//! {root}/
//!   index.redb    durable index database
//!   tree/         hash-sharded entry files
//!     ab/cd/ef/<remaining 58 hex chars>
//! ```
//!
//! # Design Rules
//!
//! 1. The index is the single source of truth for existence. File presence
//!    is never consulted as a substitute for an index check.
//! 2. An entry's storage path is a pure function of its name; it is
//!    recomputed on demand and never persisted.
//! 3. Every index-touching operation runs under one instance-owned lock, so
//!    check-then-act sequences are atomic within the process.
//! 4. All storage-engine and filesystem errors are propagated, never
//!    silently ignored.

pub mod error;
pub mod mode;
pub mod silo;
pub mod tree;

pub use error::{SiloError, SiloResult};
pub use mode::{Access, ModeParseError, OpenMode};
pub use silo::{CreateOptions, Silo};
pub use tree::PathTree;
