//! Curated surface for the CLI and other in-workspace callers (unstable).
//!
//! Prefer these re-exports over reaching into module internals.

// Numeric layer
pub use crate::geom3::{cfg as tolerances, correct, snap_to_grid, BBox3, Hs3, PointStatus};
// Kernel
pub use crate::polytope::special::{cuboid, tetrahedron, wedge};
pub use crate::polytope::{
    AddFacesResult, EdgeId, FaceId, FaceView, HalfSpace, Intersection, MoveOutcome,
    MoveVerticesResult, Polytope, VertexId,
};
// Clipping
pub use crate::clip::{clip, ClipResult};
// Random brushes
pub use crate::rand3::{draw_brush, FaceCount, GeneratorError, RandomBrushCfg, ReplayToken};
// Errors
pub use crate::error::{GeometryError, GeometryResult};
