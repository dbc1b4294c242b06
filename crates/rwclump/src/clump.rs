//! Clump loading: top-level orchestration and the owned scene-graph
//! aggregate.
//!
//! A clump file carries one clump chunk whose body follows a single legal
//! order: a struct with the atomic count, the frame list, the geometry
//! list, the atomics, then optional extensions. The loader walks that body
//! as a state machine, single-pass and without backtracking; cross
//! references are resolved by index into the lists built earlier in the
//! same pass. A failed load discards everything; no partial clump escapes.

use glam::{Affine3A, Mat4};
use rwclump_common::BinaryReader;

use crate::atomic::{read_atomic, Atomic, DanglingPolicy};
use crate::chunk::{self, expect_chunk, find_chunk, next_chunk};
use crate::frame::{read_frame_list, Frame};
use crate::geometry::{read_geometry_list, Geometry};
use crate::material::TextureLookup;
use crate::{Error, Result};

/// The parsed scene graph: ordered frames, geometries, and atomics.
///
/// The clump exclusively owns its frames and geometries; atomics hold
/// validated indices into those lists. Constructed once per successful
/// parse and immutable from the loader's perspective.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clump<H = ()> {
    frames: Vec<Frame>,
    geometries: Vec<Geometry<H>>,
    atomics: Vec<Atomic>,
}

/// One resolved renderable part: an atomic's frame and geometry.
#[derive(Debug)]
pub struct AtomicView<'a, H = ()> {
    pub frame_index: usize,
    pub frame: &'a Frame,
    pub geometry: &'a Geometry<H>,
    pub flags: u32,
}

impl Clump<()> {
    /// Load a clump without texture resolution; every texture reference is
    /// left unresolved.
    pub fn parse(data: &[u8]) -> Result<Self> {
        ClumpLoader::new().load(data, |_, _| None)
    }
}

impl<H> Clump<H> {
    /// Ordered transform hierarchy nodes, in file order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Ordered geometries, in file order.
    pub fn geometries(&self) -> &[Geometry<H>] {
        &self.geometries
    }

    /// Ordered frame/geometry bindings. Indices are always in range.
    pub fn atomics(&self) -> &[Atomic] {
        &self.atomics
    }

    /// Resolved views of every atomic, for hierarchical/multi-part
    /// consumers.
    pub fn parts(&self) -> impl Iterator<Item = AtomicView<'_, H>> {
        self.atomics.iter().map(|a| AtomicView {
            frame_index: a.frame,
            frame: &self.frames[a.frame],
            geometry: &self.geometries[a.geometry],
            flags: a.flags,
        })
    }

    /// The first atomic's resolved view, for simple single-mesh objects.
    pub fn single_mesh(&self) -> Option<AtomicView<'_, H>> {
        self.parts().next()
    }

    /// Compose a frame's local transforms up the parent chain into a world
    /// transform. Parent links are validated at load time to strictly
    /// decrease, so this walk terminates.
    pub fn world_transform(&self, index: usize) -> Option<Mat4> {
        let mut frame = self.frames.get(index)?;
        let mut world = local_transform(frame);
        while let Some(parent) = frame.parent {
            frame = &self.frames[parent];
            world = local_transform(frame) * world;
        }
        Some(world)
    }
}

fn local_transform(frame: &Frame) -> Mat4 {
    Mat4::from(Affine3A::from_mat3_translation(frame.rotation, frame.translation))
}

/// Progress through the mandated clump body order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FrameList,
    GeometryList,
    Atomics,
    Extensions,
}

impl State {
    fn expected(self) -> &'static str {
        match self {
            State::FrameList => "frame list",
            State::GeometryList => "geometry list",
            State::Atomics => "atomic or extension",
            State::Extensions => "extension",
        }
    }
}

/// Clump loader.
///
/// Re-entrant across independent calls; holds no state besides
/// configuration, so separate loads may run on separate threads with their
/// own buffers and callbacks.
#[derive(Debug, Clone, Default)]
pub struct ClumpLoader {
    dangling: DanglingPolicy,
}

impl ClumpLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure how an out-of-range atomic index is handled.
    pub fn dangling_policy(mut self, policy: DanglingPolicy) -> Self {
        self.dangling = policy;
        self
    }

    /// Load one clump from a fully materialized byte buffer.
    ///
    /// `lookup` resolves `(diffuse_name, mask_name)` pairs into
    /// externally-owned texture handles; it is invoked synchronously while
    /// materials are read and a `None` result records the texture as
    /// absent rather than failing.
    pub fn load<H>(
        &self,
        data: &[u8],
        mut lookup: impl FnMut(&str, &str) -> Option<H>,
    ) -> Result<Clump<H>> {
        self.load_dyn(data, &mut lookup)
    }

    fn load_dyn<H>(&self, data: &[u8], lookup: &mut TextureLookup<'_, H>) -> Result<Clump<H>> {
        let mut reader = BinaryReader::new(data);
        let Some((_, mut body)) = find_chunk(&mut reader, chunk::id::CLUMP)? else {
            return Err(Error::UnexpectedChunk {
                offset: reader.offset(),
                expected: "clump",
                found: "end of stream".into(),
            });
        };

        let (_, mut info) = expect_chunk(&mut body, chunk::id::STRUCT, "clump struct")?;
        let atomic_count = info.read_u32()? as usize;
        // Later format revisions append light and camera counts; neither is
        // loaded here.

        let mut frames: Vec<Frame> = Vec::new();
        let mut geometries: Vec<Geometry<H>> = Vec::new();
        // An atomic chunk is at least a 12-byte header; the declared count
        // must not drive preallocation beyond what the body could hold.
        let mut atomics = Vec::with_capacity(body.clamped_capacity(atomic_count, 12));
        let mut state = State::FrameList;

        while !body.is_empty() {
            let (header, mut payload) = next_chunk(&mut body)?;
            match header.id {
                chunk::id::FRAME_LIST if state == State::FrameList => {
                    frames = read_frame_list(&mut payload)?;
                    state = State::GeometryList;
                }
                chunk::id::GEOMETRY_LIST if state == State::GeometryList => {
                    geometries = read_geometry_list(&mut payload, lookup)?;
                    state = State::Atomics;
                }
                chunk::id::ATOMIC if state == State::Atomics => {
                    if let Some(atomic) = read_atomic(
                        &mut payload,
                        frames.len(),
                        geometries.len(),
                        self.dangling,
                    )? {
                        atomics.push(atomic);
                    }
                }
                chunk::id::EXTENSION => {
                    // Recognized-but-optional in every state; trailing
                    // extensions close the atomic sequence.
                    if state == State::Atomics {
                        state = State::Extensions;
                    }
                }
                chunk::id::FRAME_LIST | chunk::id::GEOMETRY_LIST | chunk::id::ATOMIC => {
                    return Err(Error::UnexpectedChunk {
                        offset: header.offset,
                        expected: state.expected(),
                        found: format!("{:#06x}", header.id),
                    });
                }
                // Unknown chunk kinds are skipped by declared size in any
                // state without affecting the sequence.
                _ => {}
            }
        }

        if matches!(state, State::FrameList | State::GeometryList) {
            return Err(Error::UnexpectedChunk {
                offset: body.offset(),
                expected: state.expected(),
                found: "end of chunk".into(),
            });
        }

        Ok(Clump { frames, geometries, atomics })
    }
}
