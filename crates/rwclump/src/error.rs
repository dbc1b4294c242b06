//! Error types for clump loading.
//!
//! Every variant carries the absolute byte offset of the offending chunk or
//! read so callers can point diagnostics at the file. All errors are fatal
//! to the current load; no partial clump is ever returned.

use thiserror::Error;

/// Errors that can occur while loading a clump.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared chunk or field size exceeds the remaining buffer.
    #[error("{0}")]
    Truncated(#[from] rwclump_common::Error),

    /// A frame record holds non-finite transform data or an invalid parent
    /// link (self-referencing or forward, which would break tree walks).
    #[error("malformed frame {index} at offset {offset:#x}: {reason}")]
    MalformedFrame {
        offset: usize,
        index: usize,
        reason: &'static str,
    },

    /// An atomic's frame or geometry index is out of range of the list it
    /// addresses.
    #[error("dangling {target} reference at offset {offset:#x}: index {index} out of range (len {len})")]
    DanglingReference {
        offset: usize,
        target: &'static str,
        index: usize,
        len: usize,
    },

    /// The mandated top-level chunk sequence was violated.
    #[error("unexpected chunk at offset {offset:#x}: expected {expected}, found {found}")]
    UnexpectedChunk {
        offset: usize,
        expected: &'static str,
        found: String,
    },

    /// A chunk whose binary layout changed across format versions carries a
    /// version this loader does not understand structurally.
    #[error("unsupported {chunk} version {version:#010x} at offset {offset:#x}")]
    UnsupportedVersion {
        offset: usize,
        chunk: &'static str,
        version: u32,
    },
}

impl Error {
    /// Absolute file offset at which the load failed.
    pub fn offset(&self) -> usize {
        match self {
            Error::Truncated(e) => e.offset(),
            Error::MalformedFrame { offset, .. }
            | Error::DanglingReference { offset, .. }
            | Error::UnexpectedChunk { offset, .. }
            | Error::UnsupportedVersion { offset, .. } => *offset,
        }
    }
}

/// Result type for clump loading.
pub type Result<T> = std::result::Result<T, Error>;
