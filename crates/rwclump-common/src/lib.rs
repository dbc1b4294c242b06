//! Common utilities for rwclump.
//!
//! This crate provides the foundational reading primitive used by the clump
//! loader:
//!
//! - [`BinaryReader`] - Bounded, zero-copy binary reading from a byte slice
//!   with absolute file-offset tracking for diagnostics

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, KnownLayout};
