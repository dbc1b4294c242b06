//! Synthetic chunk stream builders shared by the unit tests.

use crate::chunk::id;
use crate::material::Rgba;

/// Version stamp written on synthetic chunks; the newest layout the loader
/// accepts.
pub const TEST_VERSION: u32 = 0x1803_FFFF;

/// Encode one chunk: 12-byte header plus payload.
pub fn chunk(chunk_id: u32, version: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(12 + payload.len());
    out.extend(chunk_id.to_le_bytes());
    out.extend((payload.len() as u32).to_le_bytes());
    out.extend(version.to_le_bytes());
    out.extend(payload);
    out
}

fn struct_chunk(payload: &[u8]) -> Vec<u8> {
    chunk(id::STRUCT, TEST_VERSION, payload)
}

/// NUL-padded string chunk, padded to a four-byte multiple as real
/// exporters do.
pub fn string_chunk(text: &str) -> Vec<u8> {
    let mut payload = text.as_bytes().to_vec();
    let padded = (payload.len() + 4) & !3;
    payload.resize(padded, 0);
    chunk(id::STRING, TEST_VERSION, &payload)
}

/// One 44-byte frame record with an identity rotation.
pub fn frame_record(parent: i32, translation: [f32; 3]) -> Vec<u8> {
    let rotation: [f32; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    let mut out = Vec::with_capacity(44);
    for v in rotation {
        out.extend(v.to_le_bytes());
    }
    for v in translation {
        out.extend(v.to_le_bytes());
    }
    out.extend(parent.to_le_bytes());
    out.extend(0u32.to_le_bytes()); // matrix flags
    out
}

/// A frame list chunk with one empty extension per frame.
pub fn frame_list_chunk(records: &[Vec<u8>]) -> Vec<u8> {
    let mut data = (records.len() as u32).to_le_bytes().to_vec();
    for record in records {
        data.extend(record);
    }
    let mut body = struct_chunk(&data);
    for _ in records {
        body.extend(chunk(id::EXTENSION, TEST_VERSION, &[]));
    }
    chunk(id::FRAME_LIST, TEST_VERSION, &body)
}

/// A material chunk, optionally carrying a texture with the given
/// diffuse/mask name pair.
pub fn material_chunk(color: Rgba, texture: Option<(&str, &str)>) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(0u32.to_le_bytes()); // unused flags
    data.extend([color.r, color.g, color.b, color.a]);
    data.extend(0u32.to_le_bytes()); // unused
    data.extend((texture.is_some() as u32).to_le_bytes());
    for scalar in [1.0f32, 1.0, 1.0] {
        data.extend(scalar.to_le_bytes()); // ambient, specular, diffuse
    }

    let mut body = struct_chunk(&data);
    if let Some((name, mask)) = texture {
        let mut tex = struct_chunk(&0u32.to_le_bytes()); // filter flags
        tex.extend(string_chunk(name));
        tex.extend(string_chunk(mask));
        body.extend(chunk(id::TEXTURE, TEST_VERSION, &tex));
    }
    chunk(id::MATERIAL, TEST_VERSION, &body)
}

/// A material list chunk wrapping pre-encoded material chunks.
pub fn material_list_chunk(materials: &[Vec<u8>]) -> Vec<u8> {
    let mut data = (materials.len() as u32).to_le_bytes().to_vec();
    for _ in materials {
        data.extend((-1i32).to_le_bytes()); // inline instance ref
    }
    let mut body = struct_chunk(&data);
    for material in materials {
        body.extend(material);
    }
    chunk(id::MATERIAL_LIST, TEST_VERSION, &body)
}

/// Declarative geometry contents for [`geometry_chunk`].
pub struct GeometrySpec {
    pub version: u32,
    pub flags: u16,
    pub vertices: Vec<[f32; 3]>,
    pub prelit: Vec<[u8; 4]>,
    pub uv_sets: Vec<Vec<[f32; 2]>>,
    pub triangles: Vec<([u16; 3], u16)>,
    pub materials: Vec<Vec<u8>>,
    /// Raw pre-encoded extension chunks appended after the material list.
    pub extensions: Vec<u8>,
    pub radius: f32,
}

impl Default for GeometrySpec {
    fn default() -> Self {
        Self {
            version: TEST_VERSION,
            flags: 0,
            vertices: Vec::new(),
            prelit: Vec::new(),
            uv_sets: Vec::new(),
            triangles: Vec::new(),
            materials: Vec::new(),
            extensions: Vec::new(),
            radius: 0.0,
        }
    }
}

/// A textured unit quad: four vertices, one UV set, two triangles, one
/// white material.
pub fn quad_geometry() -> GeometrySpec {
    GeometrySpec {
        flags: crate::geometry::flags::TEXTURED,
        vertices: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ],
        uv_sets: vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]],
        triangles: vec![([0, 1, 2], 0), ([0, 2, 3], 0)],
        materials: vec![material_chunk(Rgba::WHITE, None)],
        radius: 1.0,
        ..Default::default()
    }
}

/// Encode a geometry chunk from a spec.
pub fn geometry_chunk(spec: &GeometrySpec) -> Vec<u8> {
    let format = spec.flags as u32 | ((spec.uv_sets.len() as u32) << 16);
    let mut data = Vec::new();
    data.extend(format.to_le_bytes());
    data.extend((spec.triangles.len() as u32).to_le_bytes());
    data.extend((spec.vertices.len() as u32).to_le_bytes());
    data.extend(1u32.to_le_bytes()); // morph targets

    if spec.version < 0x1003_FFFF {
        data.extend([0u8; 12]); // legacy geometry-level surface props
    }

    for color in &spec.prelit {
        data.extend(color);
    }
    for set in &spec.uv_sets {
        for uv in set {
            data.extend(uv[0].to_le_bytes());
            data.extend(uv[1].to_le_bytes());
        }
    }
    for &([a, b, c], material) in &spec.triangles {
        // Disk order: second vertex, first vertex, material, third vertex.
        data.extend(b.to_le_bytes());
        data.extend(a.to_le_bytes());
        data.extend(material.to_le_bytes());
        data.extend(c.to_le_bytes());
    }

    // One morph target: bounding sphere, positions, no normals.
    for v in [0.0f32, 0.0, 0.0, spec.radius] {
        data.extend(v.to_le_bytes());
    }
    data.extend(1u32.to_le_bytes()); // has positions
    data.extend(0u32.to_le_bytes()); // has normals
    for vertex in &spec.vertices {
        for v in vertex {
            data.extend(v.to_le_bytes());
        }
    }

    let mut body = struct_chunk(&data);
    body.extend(material_list_chunk(&spec.materials));
    body.extend(&spec.extensions);
    chunk(id::GEOMETRY, spec.version, &body)
}

/// An extension chunk carrying a bin mesh with the given
/// `(material, indices)` splits, triangle-list topology.
pub fn bin_mesh_extension(splits: &[(u32, &[u32])]) -> Vec<u8> {
    let total: usize = splits.iter().map(|(_, idx)| idx.len()).sum();
    let mut data = Vec::new();
    data.extend(0u32.to_le_bytes()); // triangle list
    data.extend((splits.len() as u32).to_le_bytes());
    data.extend((total as u32).to_le_bytes());
    for (material, indices) in splits {
        data.extend((indices.len() as u32).to_le_bytes());
        data.extend(material.to_le_bytes());
        for index in *indices {
            data.extend(index.to_le_bytes());
        }
    }
    let mesh = chunk(id::BIN_MESH, TEST_VERSION, &data);
    chunk(id::EXTENSION, TEST_VERSION, &mesh)
}

/// A geometry list chunk wrapping pre-encoded geometry chunks.
pub fn geometry_list_chunk(geometries: &[Vec<u8>]) -> Vec<u8> {
    let mut body = struct_chunk(&(geometries.len() as u32).to_le_bytes());
    for geometry in geometries {
        body.extend(geometry);
    }
    chunk(id::GEOMETRY_LIST, TEST_VERSION, &body)
}

/// An atomic chunk binding the given frame and geometry indices.
pub fn atomic_chunk(frame: u32, geometry: u32, flags: u32) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend(frame.to_le_bytes());
    data.extend(geometry.to_le_bytes());
    data.extend(flags.to_le_bytes());
    data.extend(0u32.to_le_bytes()); // unused
    chunk(id::ATOMIC, TEST_VERSION, &struct_chunk(&data))
}

/// A clump chunk assembled from pre-encoded body parts, preceded by its
/// atomic-count struct.
pub fn clump_from_parts(atomic_count: u32, parts: &[&[u8]]) -> Vec<u8> {
    let mut info = atomic_count.to_le_bytes().to_vec();
    info.extend(0u32.to_le_bytes()); // lights
    info.extend(0u32.to_le_bytes()); // cameras
    let mut body = struct_chunk(&info);
    for part in parts {
        body.extend(*part);
    }
    chunk(id::CLUMP, TEST_VERSION, &body)
}

/// A complete well-formed clump file.
pub fn clump_file(
    frame_records: &[Vec<u8>],
    geometry_chunks: &[Vec<u8>],
    atomics: &[(u32, u32, u32)],
) -> Vec<u8> {
    let frames = frame_list_chunk(frame_records);
    let geometries = geometry_list_chunk(geometry_chunks);
    let mut parts: Vec<Vec<u8>> = vec![frames, geometries];
    for &(frame, geometry, flags) in atomics {
        parts.push(atomic_chunk(frame, geometry, flags));
    }
    let refs: Vec<&[u8]> = parts.iter().map(|p| p.as_slice()).collect();
    clump_from_parts(atomics.len() as u32, &refs)
}
