//! Atomic reading: frame/geometry bindings.

use rwclump_common::BinaryReader;

use crate::chunk::{self, expect_chunk};
use crate::{Error, Result};

/// Policy for an atomic whose frame or geometry index is out of range.
///
/// The default fails the whole load: a dangling reference suggests the rest
/// of the stream's indexing assumptions are broken too. `Skip` drops just
/// the offending atomic and keeps loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    #[default]
    Fail,
    Skip,
}

/// A binding of one frame to one geometry, forming a renderable part.
///
/// Holds validated indices into the clump's frame and geometry lists rather
/// than references, so the clump stays trivially relocatable. A clump is
/// never returned with a dangling atomic.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Atomic {
    pub frame: usize,
    pub geometry: usize,
    pub flags: u32,
}

/// Render-state flag: the atomic participates in rendering.
pub const ATOMIC_RENDER: u32 = 0x04;

impl Atomic {
    pub fn is_renderable(&self) -> bool {
        self.flags & ATOMIC_RENDER != 0
    }
}

/// Read one atomic chunk payload and validate its indices against the
/// already-built frame and geometry lists.
///
/// Returns `Ok(None)` when an index dangles and the policy is `Skip`.
pub(crate) fn read_atomic(
    reader: &mut BinaryReader<'_>,
    frame_count: usize,
    geometry_count: usize,
    policy: DanglingPolicy,
) -> Result<Option<Atomic>> {
    let (header, mut data) = expect_chunk(reader, chunk::id::STRUCT, "atomic struct")?;

    let frame = data.read_u32()? as usize;
    let geometry = data.read_u32()? as usize;
    let flags = data.read_u32()?;
    // A trailing unused word is present in most exporter versions; the
    // bounded payload absorbs it either way.

    let dangling = if frame >= frame_count {
        Some(("frame", frame, frame_count))
    } else if geometry >= geometry_count {
        Some(("geometry", geometry, geometry_count))
    } else {
        None
    };

    if let Some((target, index, len)) = dangling {
        return match policy {
            DanglingPolicy::Fail => Err(Error::DanglingReference {
                offset: header.offset,
                target,
                index,
                len,
            }),
            DanglingPolicy::Skip => Ok(None),
        };
    }

    Ok(Some(Atomic { frame, geometry, flags }))
}
