//! Foundation types for Silo.
//!
//! This crate provides the digest type used to derive storage paths from
//! entry names. Every other Silo crate depends on `silo-types`.
//!
//! # Key Types
//!
//! - [`EntryDigest`] — 256-bit BLAKE3 digest of an entry name
//! - [`TypeError`] — hex parsing failures

pub mod digest;
pub mod error;

pub use digest::EntryDigest;
pub use error::TypeError;
