//! Chunk layer: headers, ids, and bounded traversal of nested chunks.
//!
//! A clump file is a tree of chunks, each prefixed by a 12-byte header of
//! `{id: u32, size: u32, version: u32}` (little-endian) followed by `size`
//! payload bytes. Payloads may themselves contain chunks. This module knows
//! nothing above "chunk": it reads headers, hands out bounded sub-readers
//! for payloads, and centralizes the skip-unknown-by-size policy that gives
//! the format its forward compatibility.

use rwclump_common::BinaryReader;

use crate::{Error, Result};

/// Chunk type codes the loader understands structurally.
///
/// The code space is defined by the file format, not by this crate; any
/// code outside this table is skippable payload.
pub mod id {
    /// Raw data carrier nested inside a parent chunk.
    pub const STRUCT: u32 = 0x0001;
    /// NUL-padded text, length given by the chunk size.
    pub const STRING: u32 = 0x0002;
    /// Container for exporter plugin sub-chunks.
    pub const EXTENSION: u32 = 0x0003;
    pub const TEXTURE: u32 = 0x0006;
    pub const MATERIAL: u32 = 0x0007;
    pub const MATERIAL_LIST: u32 = 0x0008;
    pub const FRAME_LIST: u32 = 0x000E;
    pub const GEOMETRY: u32 = 0x000F;
    pub const CLUMP: u32 = 0x0010;
    pub const ATOMIC: u32 = 0x0014;
    pub const GEOMETRY_LIST: u32 = 0x001A;
    /// Geometry extension grouping triangle indices by material.
    pub const BIN_MESH: u32 = 0x050E;
    /// Frame extension carrying a human-readable node name.
    pub const NODE_NAME: u32 = 0x0253_F2FE;
}

/// A decoded chunk header.
///
/// Ephemeral: headers steer parsing and never appear in the output graph.
/// `offset` is the absolute file offset of the header itself, kept for
/// error reporting.
#[derive(Debug, Clone, Copy)]
pub struct ChunkHeader {
    pub id: u32,
    pub size: u32,
    pub version: u32,
    pub offset: usize,
}

impl ChunkHeader {
    /// Read the next chunk header, advancing past it.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let offset = reader.offset();
        let id = reader.read_u32()?;
        let size = reader.read_u32()?;
        let version = reader.read_u32()?;
        Ok(Self { id, size, version, offset })
    }
}

/// Read the next chunk and return its header plus a bounded reader over its
/// payload. The payload bytes are consumed from `reader` up front, so a
/// nested reader can never escape its declared extent.
pub fn next_chunk<'a>(
    reader: &mut BinaryReader<'a>,
) -> Result<(ChunkHeader, BinaryReader<'a>)> {
    let header = ChunkHeader::read(reader)?;
    let payload = reader.sub_reader(header.size as usize)?;
    Ok((header, payload))
}

/// Read the next chunk, requiring a specific type code.
///
/// Used where the format mandates a child (e.g. the leading `Struct` inside
/// every composite chunk); a mismatch is a sequence violation, not something
/// to skip over.
pub fn expect_chunk<'a>(
    reader: &mut BinaryReader<'a>,
    expected_id: u32,
    expected_name: &'static str,
) -> Result<(ChunkHeader, BinaryReader<'a>)> {
    let (header, payload) = next_chunk(reader)?;
    if header.id != expected_id {
        return Err(Error::UnexpectedChunk {
            offset: header.offset,
            expected: expected_name,
            found: format!("{:#06x}", header.id),
        });
    }
    Ok((header, payload))
}

/// Skip chunks until one with the given id is found, returning its header
/// and payload, or `None` if the reader is exhausted first.
///
/// This is the single place unknown chunk kinds are tolerated: anything that
/// is not the wanted id is skipped by its declared size.
pub fn find_chunk<'a>(
    reader: &mut BinaryReader<'a>,
    wanted_id: u32,
) -> Result<Option<(ChunkHeader, BinaryReader<'a>)>> {
    while !reader.is_empty() {
        let (header, payload) = next_chunk(reader)?;
        if header.id == wanted_id {
            return Ok(Some((header, payload)));
        }
    }
    Ok(None)
}
