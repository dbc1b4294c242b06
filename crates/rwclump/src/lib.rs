//! Loader for chunked "clump" scene binaries.
//!
//! A clump file is a tree of length-delimited, versioned chunks describing
//! one scene graph: a hierarchy of transform frames, a list of mesh
//! geometries with materials and texture references, and atomics binding
//! frames to geometries into renderable parts.
//!
//! # File Format
//!
//! Every chunk starts with a 12-byte little-endian header:
//! - 4 bytes: type code
//! - 4 bytes: payload size
//! - 4 bytes: format version
//!
//! Payloads nest further chunks. The clump chunk's body follows a single
//! legal order (frame list, geometry list, atomics, optional extensions);
//! unknown chunk kinds anywhere are skipped by their declared size, which
//! is what keeps the loader compatible with exporter plugins it does not
//! understand.
//!
//! # Texture resolution
//!
//! Textures are referenced by name and resolved through a caller-supplied
//! callback into handles the embedding application owns; the loader never
//! touches pixel data and an unresolved texture is not an error.
//!
//! # Example
//!
//! ```no_run
//! use rwclump::Clump;
//!
//! let data = std::fs::read("model.dff")?;
//! let clump = Clump::parse(&data)?;
//! println!(
//!     "{} frames, {} geometries, {} atomics",
//!     clump.frames().len(),
//!     clump.geometries().len(),
//!     clump.atomics().len(),
//! );
//!
//! // Resolve textures against an application-owned cache.
//! let textured = rwclump::ClumpLoader::new()
//!     .load(&data, |name, _mask| texture_cache_id(name))?;
//! # fn texture_cache_id(_: &str) -> Option<u32> { None }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod chunk;
mod error;

mod atomic;
mod clump;
mod frame;
mod geometry;
mod material;

#[cfg(test)]
pub(crate) mod test_stream;

pub use atomic::{Atomic, DanglingPolicy, ATOMIC_RENDER};
pub use clump::{AtomicView, Clump, ClumpLoader};
pub use error::{Error, Result};
pub use frame::Frame;
pub use geometry::{
    flags, BinMesh, BinMeshSplit, Geometry, Primitive, Sphere, Triangle, MAX_GEOMETRY_VERSION,
};
pub use material::{Material, Rgba, SurfaceProperties, Texture, TextureLookup};

/// Re-export the math types appearing in the parsed data model.
pub use glam::{Mat3, Mat4, Vec2, Vec3};
