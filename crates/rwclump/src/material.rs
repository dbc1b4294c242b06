//! Material and texture reading.
//!
//! Materials are owned by the geometry that declares them; texture pixel
//! data is never owned here. A texture record is a lookup key (diffuse name
//! plus mask name) resolved through a caller-supplied callback into an
//! externally-owned handle, or left unresolved if the callback declines.

use rwclump_common::BinaryReader;

use crate::chunk::{self, expect_chunk, find_chunk};
use crate::{Error, Result};

/// Texture resolution callback: `(diffuse_name, mask_name)` to an
/// externally-owned handle, or `None` when the texture is unavailable.
/// An unresolved texture is not an error.
pub type TextureLookup<'a, H> = dyn FnMut(&str, &str) -> Option<H> + 'a;

/// RGBA color at the format's native 8-bit precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self { r: 255, g: 255, b: 255, a: 255 };

    /// Read four bytes of RGBA.
    pub(crate) fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let b = reader.read_bytes(4)?;
        Ok(Self { r: b[0], g: b[1], b: b[2], a: b[3] })
    }
}

/// Lighting response scalars of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfaceProperties {
    pub ambient: f32,
    pub specular: f32,
    pub diffuse: f32,
}

impl Default for SurfaceProperties {
    fn default() -> Self {
        Self { ambient: 1.0, specular: 1.0, diffuse: 1.0 }
    }
}

/// A texture reference: names as lookup keys plus the resolved handle.
///
/// `H` is the embedding application's handle type. The loader stores the
/// handle verbatim and never touches pixel data.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Texture<H = ()> {
    /// Diffuse map name, case-folded to lowercase (exporters disagree on
    /// case, so lookup keys are normalized).
    pub name: String,
    /// Alpha mask name, case-folded; empty when unmasked.
    pub mask: String,
    /// Raw filtering/addressing flags from the texture struct.
    pub filter: u32,
    /// Externally-owned handle from the lookup callback, if it resolved.
    pub handle: Option<H>,
}

/// One material of a geometry.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material<H = ()> {
    pub color: Rgba,
    pub surface: SurfaceProperties,
    pub texture: Option<Texture<H>>,
}

impl<H> Material<H> {
    /// Whether the material references a texture (resolved or not).
    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }
}

/// Read a material list chunk payload: a struct with the material count and
/// per-slot instance refs (skipped), followed by that many material chunks.
pub(crate) fn read_material_list<H>(
    reader: &mut BinaryReader<'_>,
    lookup: &mut TextureLookup<'_, H>,
) -> Result<Vec<Material<H>>> {
    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "material list struct")?;
    let count = data.read_u32()? as usize;
    // Instance refs let exporters share material records; every file seen
    // in the wild writes -1 (inline) for each slot, so the refs are skipped
    // and materials read positionally.
    data.skip(count * 4)?;

    // A material chunk is at least a 12-byte header; the declared count is
    // attacker-controlled and must not drive preallocation on its own.
    let mut materials = Vec::with_capacity(reader.clamped_capacity(count, 12));
    for _ in 0..count {
        let offset = reader.offset();
        let Some((_, mut payload)) = find_chunk(reader, chunk::id::MATERIAL)? else {
            return Err(Error::UnexpectedChunk {
                offset,
                expected: "material",
                found: "end of chunk".into(),
            });
        };
        materials.push(read_material(&mut payload, lookup)?);
    }
    Ok(materials)
}

/// Read one material chunk payload.
pub(crate) fn read_material<H>(
    reader: &mut BinaryReader<'_>,
    lookup: &mut TextureLookup<'_, H>,
) -> Result<Material<H>> {
    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "material struct")?;

    data.skip(4)?; // unused flags
    let color = Rgba::read(&mut data)?;
    data.skip(4)?; // unused
    let textured = data.read_u32()? != 0;
    // Early exporter versions end the struct here; lighting scalars then
    // default to full response.
    let surface = if data.remaining() >= 12 {
        SurfaceProperties {
            ambient: data.read_f32()?,
            specular: data.read_f32()?,
            diffuse: data.read_f32()?,
        }
    } else {
        SurfaceProperties::default()
    };

    // Nested chunks after the struct: the texture (when flagged) plus
    // whatever plugin data the exporter attached; unknown kinds are skipped.
    let texture = if textured {
        match find_chunk(reader, chunk::id::TEXTURE)? {
            Some((_, mut payload)) => Some(read_texture(&mut payload, lookup)?),
            None => None,
        }
    } else {
        None
    };

    Ok(Material { color, surface, texture })
}

/// Read one texture chunk payload and resolve it through the lookup.
pub(crate) fn read_texture<H>(
    reader: &mut BinaryReader<'_>,
    lookup: &mut TextureLookup<'_, H>,
) -> Result<Texture<H>> {
    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "texture struct")?;
    let filter = data.read_u32()?;

    let (name_header, mut name_data) =
        expect_chunk(reader, chunk::id::STRING, "texture name string")?;
    let mut name = name_data.read_string_in_buffer(name_header.size as usize)?;
    name.make_ascii_lowercase();

    let (mask_header, mut mask_data) =
        expect_chunk(reader, chunk::id::STRING, "texture mask string")?;
    let mut mask = mask_data.read_string_in_buffer(mask_header.size as usize)?;
    mask.make_ascii_lowercase();

    let handle = lookup(&name, &mask);
    Ok(Texture { name, mask, filter, handle })
}
