//! Error types for rwclump-common.

use thiserror::Error;

/// Common error type for low-level binary reading.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// End of the bounded view reached while reading.
    #[error("truncated stream at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl Error {
    /// Absolute file offset at which the failure occurred.
    pub fn offset(&self) -> usize {
        match self {
            Error::UnexpectedEof { offset, .. } => *offset,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
