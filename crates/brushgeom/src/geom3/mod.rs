//! 3D numeric layer: half-spaces, boxes, tolerances.
//!
//! Purpose
//! - Everything the brush kernel needs below the topology level: plane
//!   classification with an epsilon band, axis-aligned boxes for world
//!   bounds, and round-off correction of computed positions.
//!
//! Conventions
//! - Half-spaces use `n·x <= c` with unit `n`; `n` is the outward normal of
//!   the face the half-space produces.
//! - Positions are `nalgebra::Vector3<f64>` throughout.

pub mod cfg;
mod types;
mod util;

pub use types::{BBox3, Hs3, PointStatus};
pub use util::{correct, snap_to_grid};
pub(crate) use util::{centroid, combinations};

#[cfg(test)]
mod tests;
