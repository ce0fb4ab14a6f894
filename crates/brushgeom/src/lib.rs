//! Convex brush geometry kernel.
//!
//! A brush is a convex solid given as the intersection of half-spaces and
//! kept as an explicit vertex/edge/face mesh that stays valid while planes
//! are added, vertices are dragged and the solid is clipped.
//!
//! Modules
//! - `geom3`: planes, boxes, tolerances.
//! - `polytope`: the mesh and every editing operation.
//! - `clip`: slicing a brush by one plane.
//! - `rand3`: reproducible random brushes for tests and benchmarks.
//!
//! The kernel is single-threaded and never installs a tracing subscriber;
//! callers decide where events go.

pub mod api;
pub mod clip;
pub mod error;
pub mod geom3;
pub mod polytope;
pub mod rand3;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{GeometryError, GeometryResult};
pub use nalgebra::Vector3 as Vec3;

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::clip::{clip, ClipResult};
    pub use crate::error::{GeometryError, GeometryResult};
    pub use crate::geom3::{BBox3, Hs3, PointStatus};
    pub use crate::polytope::{
        AddFacesResult, HalfSpace, Intersection, MoveOutcome, MoveVerticesResult, Polytope,
    };
    pub use nalgebra::Vector3 as Vec3;
}
