//! Frame list reading: the transform hierarchy of a clump.

use glam::{Mat3, Vec3};
use rwclump_common::BinaryReader;
use zerocopy::byteorder::little_endian::{F32, I32, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::chunk::{self, expect_chunk, find_chunk, next_chunk};
use crate::{Error, Result};

/// One node of the transform hierarchy.
///
/// Frames are addressed by their position in the clump's frame list; that
/// file order is the addressing scheme atomics and parent links use.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    /// Local rotation. Stored as exported; not re-orthonormalized.
    pub rotation: Mat3,
    /// Local translation.
    pub translation: Vec3,
    /// Index of the parent frame, `None` for roots. Always strictly less
    /// than this frame's own index, so hierarchy walks terminate.
    pub parent: Option<usize>,
    /// Node name from the frame's name extension, when the exporter wrote
    /// one.
    pub name: Option<String>,
}

impl Frame {
    /// Whether this frame is a hierarchy root.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// On-disk frame record: right/up/at rotation columns, translation, parent
/// index, matrix flags.
#[derive(FromBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RawFrame {
    rotation: [F32; 9],
    translation: [F32; 3],
    parent: I32,
    flags: U32,
}

/// Read a frame list chunk payload into ordered frames.
///
/// Layout: a `Struct` with the frame count and fixed records, followed by
/// one extension chunk per frame which may carry a node name. Unknown frame
/// plugins inside the extensions are skipped.
pub fn read_frame_list(reader: &mut BinaryReader<'_>) -> Result<Vec<Frame>> {
    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "frame list struct")?;

    let count = data.read_u32()? as usize;
    let record_size = std::mem::size_of::<RawFrame>();
    let mut frames = Vec::with_capacity(data.clamped_capacity(count, record_size));
    for index in 0..count {
        let offset = data.offset();
        let raw: RawFrame = data.read_struct()?;

        let rot: Vec<f32> = raw.rotation.iter().map(|v| v.get()).collect();
        let trans = Vec3::new(
            raw.translation[0].get(),
            raw.translation[1].get(),
            raw.translation[2].get(),
        );
        if rot.iter().any(|v| !v.is_finite()) || !trans.is_finite() {
            return Err(Error::MalformedFrame {
                offset,
                index,
                reason: "non-finite transform data",
            });
        }

        let parent = match raw.parent.get() {
            p if p < 0 => None,
            p if (p as usize) < index => Some(p as usize),
            _ => {
                // A parent at or after its child would let hierarchy walks
                // loop forever; reject at construction time.
                return Err(Error::MalformedFrame {
                    offset,
                    index,
                    reason: "parent index does not precede frame",
                });
            }
        };

        frames.push(Frame {
            rotation: Mat3::from_cols(
                Vec3::new(rot[0], rot[1], rot[2]),
                Vec3::new(rot[3], rot[4], rot[5]),
                Vec3::new(rot[6], rot[7], rot[8]),
            ),
            translation: trans,
            parent,
            name: None,
        });
    }

    // One extension chunk per frame, in frame order. Exporters stuff
    // arbitrary plugins in here; only the node name is decoded.
    let mut cursor = 0usize;
    while !reader.is_empty() && cursor < count {
        let (header, mut ext) = next_chunk(reader)?;
        if header.id == chunk::id::EXTENSION {
            if let Some((name_header, mut name_data)) =
                find_chunk(&mut ext, chunk::id::NODE_NAME)?
            {
                let name = name_data.read_string_in_buffer(name_header.size as usize)?;
                if !name.is_empty() {
                    frames[cursor].name = Some(name);
                }
            }
            cursor += 1;
        }
    }

    Ok(frames)
}
