//! Geometry reading: vertex data, triangles, materials, and the bin-mesh
//! extension.

use glam::{Vec2, Vec3};
use rwclump_common::BinaryReader;

use crate::chunk::{self, expect_chunk, find_chunk, next_chunk, ChunkHeader};
use crate::material::{read_material_list, Material, Rgba, TextureLookup};
use crate::{Error, Result};

/// Geometry format flags (low 16 bits of the format word).
pub mod flags {
    pub const TRISTRIP: u16 = 0x01;
    pub const TEXTURED: u16 = 0x04;
    pub const PRELIT: u16 = 0x08;
    pub const NORMALS: u16 = 0x10;
    pub const LIGHT: u16 = 0x20;
    pub const MODULATE_COLOR: u16 = 0x40;
    pub const TEXTURED2: u16 = 0x80;
}

/// Newest geometry layout this loader understands structurally. Geometry
/// chunks stamped with a later version are rejected rather than misread;
/// unknown-but-structurally-compatible versions below this pass through.
pub const MAX_GEOMETRY_VERSION: u32 = 0x1803_FFFF;

/// Geometry struct versions older than this carry 12 legacy bytes of
/// geometry-level lighting scalars (superseded by per-material ones).
const LEGACY_SURFACE_PROPS_VERSION: u32 = 0x1003_FFFF;

/// One triangle: three vertex indices and the index of the material it is
/// drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub vertices: [u16; 3],
    pub material: u16,
}

/// Bounding sphere of a geometry's vertex data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub const ZERO: Self = Self { center: Vec3::ZERO, radius: 0.0 };
}

/// Primitive topology of a bin-mesh split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    TriangleList,
    TriangleStrip,
}

/// One bin-mesh split: the indices drawn with a single material.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinMeshSplit {
    pub material: u32,
    pub indices: Vec<u32>,
}

/// Mesh-binding extension data: triangle indices grouped by material for
/// efficient draw submission.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinMesh {
    pub primitive: Primitive,
    pub splits: Vec<BinMeshSplit>,
}

/// One mesh of a clump.
///
/// Owned exclusively by the clump's geometry list and referenced by index
/// from atomics. Empty vertex/triangle arrays are valid.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry<H = ()> {
    /// Raw format flags; see [`flags`].
    pub flags: u16,
    pub vertices: Vec<Vec3>,
    /// Per-vertex normals; empty when the geometry has none.
    pub normals: Vec<Vec3>,
    /// Per-vertex prelit colors; empty when the geometry has none.
    pub prelit_colors: Vec<Rgba>,
    /// Zero or more UV sets, each with one coordinate pair per vertex.
    pub uv_sets: Vec<Vec<Vec2>>,
    pub triangles: Vec<Triangle>,
    pub materials: Vec<Material<H>>,
    pub bounds: Sphere,
    /// Bin-mesh extension data, when the exporter attached it.
    pub bin_mesh: Option<BinMesh>,
}

impl<H> Geometry<H> {
    pub fn is_prelit(&self) -> bool {
        self.flags & flags::PRELIT != 0
    }

    pub fn is_tristrip(&self) -> bool {
        self.flags & flags::TRISTRIP != 0
    }
}

/// Read a geometry list chunk payload: a struct with the geometry count,
/// then that many geometry chunks.
pub(crate) fn read_geometry_list<H>(
    reader: &mut BinaryReader<'_>,
    lookup: &mut TextureLookup<'_, H>,
) -> Result<Vec<Geometry<H>>> {
    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "geometry list struct")?;
    let count = data.read_u32()? as usize;

    // A geometry chunk is at least a 12-byte header; see the capacity note
    // in read_geometry.
    let mut geometries = Vec::with_capacity(reader.clamped_capacity(count, 12));
    for _ in 0..count {
        let offset = reader.offset();
        let Some((header, mut payload)) = find_chunk(reader, chunk::id::GEOMETRY)? else {
            return Err(Error::UnexpectedChunk {
                offset,
                expected: "geometry",
                found: "end of chunk".into(),
            });
        };
        geometries.push(read_geometry(&header, &mut payload, lookup)?);
    }
    Ok(geometries)
}

/// Read one geometry chunk payload.
///
/// Field order is mandated by the format: flags and counts, prelit colors,
/// UV sets, triangles, morph targets (positions/normals), then the material
/// list, then extension chunks.
pub(crate) fn read_geometry<H>(
    header: &ChunkHeader,
    reader: &mut BinaryReader<'_>,
    lookup: &mut TextureLookup<'_, H>,
) -> Result<Geometry<H>> {
    if header.version > MAX_GEOMETRY_VERSION {
        return Err(Error::UnsupportedVersion {
            offset: header.offset,
            chunk: "geometry",
            version: header.version,
        });
    }

    let (_, mut data) = expect_chunk(reader, chunk::id::STRUCT, "geometry struct")?;

    let format = data.read_u32()?;
    let geo_flags = (format & 0xFFFF) as u16;
    let mut uv_count = ((format >> 16) & 0xFF) as usize;
    if uv_count == 0 {
        // Old exporters leave the UV-set count at zero and rely on the
        // textured flags alone.
        if geo_flags & flags::TEXTURED2 != 0 {
            uv_count = 2;
        } else if geo_flags & flags::TEXTURED != 0 {
            uv_count = 1;
        }
    }

    let triangle_count = data.read_u32()? as usize;
    let vertex_count = data.read_u32()? as usize;
    let morph_count = data.read_u32()? as usize;

    if header.version < LEGACY_SURFACE_PROPS_VERSION {
        data.skip(12)?;
    }

    // Counts are attacker-controlled; capacities are clamped to what the
    // bounded payload could possibly supply so the checked reads fail
    // before any outsized allocation.
    let mut prelit_colors = Vec::new();
    if geo_flags & flags::PRELIT != 0 {
        prelit_colors.reserve(data.clamped_capacity(vertex_count, 4));
        for _ in 0..vertex_count {
            prelit_colors.push(Rgba::read(&mut data)?);
        }
    }

    let mut uv_sets = Vec::with_capacity(uv_count);
    for _ in 0..uv_count {
        let mut set = Vec::with_capacity(data.clamped_capacity(vertex_count, 8));
        for _ in 0..vertex_count {
            let u = data.read_f32()?;
            let v = data.read_f32()?;
            set.push(Vec2::new(u, v));
        }
        uv_sets.push(set);
    }

    let mut triangles = Vec::with_capacity(data.clamped_capacity(triangle_count, 8));
    for _ in 0..triangle_count {
        // Disk order: second vertex, first vertex, material, third vertex.
        let b = data.read_u16()?;
        let a = data.read_u16()?;
        let material = data.read_u16()?;
        let c = data.read_u16()?;
        triangles.push(Triangle { vertices: [a, b, c], material });
    }

    // Morph targets beyond the first are consumed to keep the cursor
    // aligned but their data is discarded; nothing downstream animates
    // morphs.
    let mut bounds = Sphere::ZERO;
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    for target in 0..morph_count {
        let center = Vec3::new(data.read_f32()?, data.read_f32()?, data.read_f32()?);
        let radius = data.read_f32()?;
        let has_positions = data.read_u32()? != 0;
        let has_normals = data.read_u32()? != 0;

        let mut positions = Vec::new();
        if has_positions {
            positions.reserve(data.clamped_capacity(vertex_count, 12));
            for _ in 0..vertex_count {
                positions.push(Vec3::new(
                    data.read_f32()?,
                    data.read_f32()?,
                    data.read_f32()?,
                ));
            }
        }
        let mut target_normals = Vec::new();
        if has_normals {
            target_normals.reserve(data.clamped_capacity(vertex_count, 12));
            for _ in 0..vertex_count {
                target_normals.push(Vec3::new(
                    data.read_f32()?,
                    data.read_f32()?,
                    data.read_f32()?,
                ));
            }
        }

        if target == 0 {
            bounds = Sphere { center, radius };
            vertices = positions;
            normals = target_normals;
        }
    }

    let (_, mut list_payload) =
        expect_chunk(reader, chunk::id::MATERIAL_LIST, "material list")?;
    let materials = read_material_list(&mut list_payload, lookup)?;

    let mut geometry = Geometry {
        flags: geo_flags,
        vertices,
        normals,
        prelit_colors,
        uv_sets,
        triangles,
        materials,
        bounds,
        bin_mesh: None,
    };

    // Trailing extension chunks; only the bin mesh is decoded, everything
    // else is skipped by declared size.
    while !reader.is_empty() {
        let (ext_header, mut ext) = next_chunk(reader)?;
        if ext_header.id != chunk::id::EXTENSION {
            continue;
        }
        while !ext.is_empty() {
            let (sub_header, mut sub) = next_chunk(&mut ext)?;
            if sub_header.id == chunk::id::BIN_MESH {
                geometry.bin_mesh = Some(read_bin_mesh(&mut sub)?);
            }
        }
    }

    Ok(geometry)
}

/// Read a bin-mesh extension payload.
fn read_bin_mesh(data: &mut BinaryReader<'_>) -> Result<BinMesh> {
    let primitive = match data.read_u32()? {
        1 => Primitive::TriangleStrip,
        _ => Primitive::TriangleList,
    };
    let split_count = data.read_u32()? as usize;
    let _total_indices = data.read_u32()?;

    let mut splits = Vec::with_capacity(data.clamped_capacity(split_count, 8));
    for _ in 0..split_count {
        let index_count = data.read_u32()? as usize;
        let material = data.read_u32()?;
        let mut indices = Vec::with_capacity(data.clamped_capacity(index_count, 4));
        for _ in 0..index_count {
            indices.push(data.read_u32()?);
        }
        splits.push(BinMeshSplit { material, indices });
    }

    Ok(BinMesh { primitive, splits })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_stream::{
        bin_mesh_extension, chunk, geometry_chunk, quad_geometry, GeometrySpec, TEST_VERSION,
    };

    fn no_lookup(_: &str, _: &str) -> Option<()> {
        None
    }

    fn parse(bytes: &[u8]) -> Result<Geometry<()>> {
        let mut reader = BinaryReader::new(bytes);
        let (header, mut payload) = next_chunk(&mut reader).unwrap();
        read_geometry(&header, &mut payload, &mut no_lookup)
    }

    #[test]
    fn test_quad_geometry() {
        let geo = parse(&geometry_chunk(&quad_geometry())).unwrap();
        assert_eq!(geo.vertices.len(), 4);
        assert_eq!(geo.triangles.len(), 2);
        assert_eq!(geo.triangles[0].vertices, [0, 1, 2]);
        assert_eq!(geo.triangles[0].material, 0);
        assert_eq!(geo.uv_sets.len(), 1);
        assert_eq!(geo.uv_sets[0].len(), 4);
        assert_eq!(geo.materials.len(), 1);
        assert_eq!(geo.bounds.radius, 1.0);
        assert!(geo.normals.is_empty());
    }

    #[test]
    fn test_empty_geometry_is_valid() {
        let spec = GeometrySpec::default();
        let geo = parse(&geometry_chunk(&spec)).unwrap();
        assert!(geo.vertices.is_empty());
        assert!(geo.triangles.is_empty());
        assert!(geo.materials.is_empty());
    }

    #[test]
    fn test_huge_declared_counts_are_truncation() {
        // Triangle and vertex counts of u32::MAX backed by an empty payload
        // must surface truncation without preallocating for the counts.
        let mut data = Vec::new();
        data.extend(0u32.to_le_bytes()); // format
        data.extend(u32::MAX.to_le_bytes()); // triangles
        data.extend(u32::MAX.to_le_bytes()); // vertices
        data.extend(1u32.to_le_bytes()); // morph targets
        let body = chunk(crate::chunk::id::STRUCT, TEST_VERSION, &data);
        let bytes = chunk(crate::chunk::id::GEOMETRY, TEST_VERSION, &body);

        assert!(matches!(parse(&bytes), Err(Error::Truncated(_))));
    }

    #[test]
    fn test_huge_bin_mesh_counts_are_truncation() {
        let mut data = Vec::new();
        data.extend(0u32.to_le_bytes()); // triangle list
        data.extend(u32::MAX.to_le_bytes()); // splits
        data.extend(0u32.to_le_bytes()); // total indices
        let mesh = chunk(crate::chunk::id::BIN_MESH, TEST_VERSION, &data);

        let mut spec = quad_geometry();
        spec.extensions = chunk(crate::chunk::id::EXTENSION, TEST_VERSION, &mesh);
        assert!(matches!(
            parse(&geometry_chunk(&spec)),
            Err(Error::Truncated(_))
        ));
    }

    #[test]
    fn test_legacy_version_surface_props_skipped() {
        let mut spec = quad_geometry();
        spec.version = 0x0000_0310;
        let geo = parse(&geometry_chunk(&spec)).unwrap();
        assert_eq!(geo.vertices.len(), 4);
        assert_eq!(geo.triangles.len(), 2);
    }

    #[test]
    fn test_version_gate() {
        let mut spec = quad_geometry();
        spec.version = 0x1C02_0037;
        assert!(matches!(
            parse(&geometry_chunk(&spec)),
            Err(Error::UnsupportedVersion { chunk: "geometry", .. })
        ));
    }

    #[test]
    fn test_bin_mesh_extension() {
        let mut spec = quad_geometry();
        spec.extensions = bin_mesh_extension(&[(0, &[0, 1, 2]), (0, &[0, 2, 3])]);
        let geo = parse(&geometry_chunk(&spec)).unwrap();

        let mesh = geo.bin_mesh.unwrap();
        assert_eq!(mesh.primitive, Primitive::TriangleList);
        assert_eq!(mesh.splits.len(), 2);
        assert_eq!(mesh.splits[1].indices, vec![0, 2, 3]);
    }

    #[test]
    fn test_unknown_extension_skipped() {
        let mut spec = quad_geometry();
        spec.extensions = chunk(
            crate::chunk::id::EXTENSION,
            TEST_VERSION,
            &chunk(0x011D, TEST_VERSION, &[0u8; 24]),
        );
        let geo = parse(&geometry_chunk(&spec)).unwrap();
        assert!(geo.bin_mesh.is_none());
        assert_eq!(geo.vertices.len(), 4);
    }
}
