//! File-open mode vocabulary.
//!
//! Modes use the classic `fopen`-style strings: exactly one access selector
//! (`r`, `w`, `a`, `x`), an optional `+` for read/write update, and an
//! optional `b` (binary) or `t` (text) qualifier. Flag order is
//! insignificant: `"rb+"`, `"+rb"`, and `"br+"` parse identically. The
//! deprecated `U` (universal newlines) flag is accepted with plain read
//! access and ignored.
//!
//! The store examines a parsed mode for one thing only: does it imply
//! binary-capable write/create access? Everything else is translated onto
//! [`std::fs::OpenOptions`] and delegated to the filesystem.

use std::fs::OpenOptions;
use std::str::FromStr;

/// Base access selector of an open mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// `r`: read an existing file.
    Read,
    /// `w`: write, truncating the file or creating it.
    Write,
    /// `a`: append, creating the file if missing.
    Append,
    /// `x`: exclusive create; fails if the file exists.
    CreateNew,
}

/// A parsed file-open mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenMode {
    access: Access,
    update: bool,
    binary: bool,
}

impl OpenMode {
    /// Parse a mode string such as `"r"`, `"wb"`, or `"a+b"`.
    pub fn parse(mode: &str) -> Result<Self, ModeParseError> {
        let mut access: Option<Access> = None;
        let mut update = false;
        let mut binary: Option<bool> = None;
        let mut universal = false;

        for c in mode.chars() {
            match c {
                'r' | 'w' | 'a' | 'x' => {
                    let selector = match c {
                        'r' => Access::Read,
                        'w' => Access::Write,
                        'a' => Access::Append,
                        _ => Access::CreateNew,
                    };
                    if access.replace(selector).is_some() {
                        return Err(ModeParseError::ConflictingFlags(mode.to_string(), c));
                    }
                }
                '+' => {
                    if update {
                        return Err(ModeParseError::ConflictingFlags(mode.to_string(), c));
                    }
                    update = true;
                }
                'b' | 't' => {
                    if binary.is_some() {
                        return Err(ModeParseError::ConflictingFlags(mode.to_string(), c));
                    }
                    binary = Some(c == 'b');
                }
                'U' => {
                    if universal {
                        return Err(ModeParseError::ConflictingFlags(mode.to_string(), c));
                    }
                    universal = true;
                }
                other => {
                    return Err(ModeParseError::InvalidCharacter(mode.to_string(), other));
                }
            }
        }

        let access = access.ok_or_else(|| ModeParseError::MissingAccess(mode.to_string()))?;
        // 'U' is only meaningful for plain reads.
        if universal && (update || access != Access::Read) {
            return Err(ModeParseError::ConflictingFlags(mode.to_string(), 'U'));
        }

        Ok(Self {
            access,
            update,
            binary: binary.unwrap_or(false),
        })
    }

    /// The base access selector.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether the mode carried a `+` (read/write update).
    pub fn is_update(&self) -> bool {
        self.update
    }

    /// Whether the mode is binary (`b`) rather than text.
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Whether the mode can write the underlying file at all.
    pub fn is_write_capable(&self) -> bool {
        self.update || self.access != Access::Read
    }

    /// Whether opening under this mode should create the entry first:
    /// binary access that can write or create the file.
    pub fn implies_create(&self) -> bool {
        self.binary && self.is_write_capable()
    }

    /// Translate to the equivalent [`OpenOptions`] configuration.
    pub fn open_options(&self) -> OpenOptions {
        let mut opts = OpenOptions::new();
        match self.access {
            Access::Read => {
                opts.read(true);
                if self.update {
                    opts.write(true);
                }
            }
            Access::Write => {
                opts.write(true).create(true).truncate(true);
                if self.update {
                    opts.read(true);
                }
            }
            Access::Append => {
                opts.append(true).create(true);
                if self.update {
                    opts.read(true);
                }
            }
            Access::CreateNew => {
                opts.write(true).create_new(true);
                if self.update {
                    opts.read(true);
                }
            }
        }
        opts
    }
}

impl Default for OpenMode {
    /// Plain text read, matching the conventional `"r"` default.
    fn default() -> Self {
        Self {
            access: Access::Read,
            update: false,
            binary: false,
        }
    }
}

impl FromStr for OpenMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Errors from mode-string parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModeParseError {
    #[error("invalid character {1:?} in mode {0:?}")]
    InvalidCharacter(String, char),

    #[error("mode {0:?} must include exactly one of 'r', 'w', 'a', 'x'")]
    MissingAccess(String),

    #[error("mode {0:?} repeats or conflicts on {1:?}")]
    ConflictingFlags(String, char),
}
