//! Special brushes used in tests, benchmarks and the CLI.
//!
//! Purpose
//! - Small explicit constructors with known vertex/edge/face counts:
//!   - cuboid: 8 / 12 / 6,
//!   - wedge (triangular prism): 6 / 9 / 5,
//!   - tetrahedron: 4 / 6 / 4.

use nalgebra::Vector3;

use super::types::HalfSpace;
use super::Polytope;
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::{BBox3, Hs3};

/// Axis-aligned box; every face gets a clone of `attribs`.
pub fn cuboid<A: Clone>(
    world_bounds: BBox3,
    bounds: BBox3,
    attribs: A,
) -> GeometryResult<Polytope<A>> {
    let hs: Vec<HalfSpace<A>> = bounds
        .half_spaces()
        .into_iter()
        .map(|plane| HalfSpace::new(plane, attribs.clone()))
        .collect();
    Polytope::from_half_spaces(world_bounds, &hs)
}

/// Box `bounds` cut by the plane through its edges `x = max, z = min` and `x = min, z = max`.
pub fn wedge<A: Clone>(
    world_bounds: BBox3,
    bounds: BBox3,
    attribs: A,
) -> GeometryResult<Polytope<A>> {
    let size = bounds.size();
    let slope = Hs3::new(
        Vector3::new(size.z, 0.0, size.x),
        size.z * bounds.max.x + size.x * bounds.min.z,
    )
    .ok_or(GeometryError::BrushIsEmpty)?;
    let mut hs: Vec<HalfSpace<A>> = bounds
        .half_spaces()
        .into_iter()
        .enumerate()
        // +x and +z are replaced by the slope.
        .filter(|(i, _)| *i != 1 && *i != 5)
        .map(|(_, plane)| HalfSpace::new(plane, attribs.clone()))
        .collect();
    hs.push(HalfSpace::new(slope, attribs));
    Polytope::from_half_spaces(world_bounds, &hs)
}

/// Corner tetrahedron `{x, y, z >= 0, x + y + z <= size}` shifted by `origin`.
pub fn tetrahedron<A: Clone>(
    world_bounds: BBox3,
    origin: Vector3<f64>,
    size: f64,
    attribs: A,
) -> GeometryResult<Polytope<A>> {
    let mut planes: Vec<Hs3> = (0..3).map(|axis| Hs3::axis(axis, -1.0, 0.0)).collect();
    planes.push(Hs3::new(Vector3::repeat(1.0), size).ok_or(GeometryError::BrushIsEmpty)?);
    let hs: Vec<HalfSpace<A>> = planes
        .into_iter()
        .map(|plane| HalfSpace::new(plane.translated(origin), attribs.clone()))
        .collect();
    Polytope::from_half_spaces(world_bounds, &hs)
}
