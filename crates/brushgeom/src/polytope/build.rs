//! Builders: the world-bounds seed and the half-space builder.

use std::collections::HashMap;

use nalgebra::Vector3;

use super::arena::Arena;
use super::types::{Edge, FaceGeometry, HalfSpace, Intersection, Vertex};
use super::{EdgeId, Polytope, VertexId};
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::BBox3;

/// Corner loops of a box, counter-clockwise seen from outside, in the order
/// of `BBox3::half_spaces` (-x, +x, -y, +y, -z, +z).
const BOX_LOOPS: [[usize; 4]; 6] = [
    [0, 4, 6, 2],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 2, 3, 1],
    [4, 5, 7, 6],
];

impl<A> Polytope<A> {
    /// The world-bounds box with attribute-less faces: no half-space added yet.
    pub fn new(world_bounds: BBox3) -> Self {
        let mut vertices = Arena::new();
        let corners: Vec<VertexId> = (0..8)
            .map(|i| {
                vertices.insert(Vertex {
                    position: world_bounds.corner(i),
                })
            })
            .collect();
        let mut edges: Arena<EdgeId, Edge> = Arena::new();
        let mut faces = Arena::new();
        // Each undirected edge shows up once per direction; the second
        // occurrence becomes the right side of the edge created by the first.
        let mut directed: HashMap<(usize, usize), EdgeId> = HashMap::new();

        for (corner_loop, plane) in BOX_LOOPS.iter().zip(world_bounds.half_spaces()) {
            let f = faces.insert(FaceGeometry::new(Vec::new(), plane, None));
            let mut boundary = Vec::with_capacity(4);
            for i in 0..4 {
                let (a, b) = (corner_loop[i], corner_loop[(i + 1) % 4]);
                let e = match directed.get(&(b, a)).copied() {
                    Some(e) => {
                        if let Some(edge) = edges.get_mut(e) {
                            edge.right = Some(f);
                        }
                        e
                    }
                    None => {
                        let mut edge = Edge::new(corners[a], corners[b]);
                        edge.left = Some(f);
                        edges.insert(edge)
                    }
                };
                directed.insert((a, b), e);
                boundary.push(e);
            }
            if let Some(face) = faces.get_mut(f) {
                face.boundary = boundary;
            }
        }

        Self {
            world_bounds,
            vertices,
            edges,
            faces,
        }
    }

    /// The world box shrunk to `bounds`, keeping `world_bounds` as the limit.
    pub(crate) fn seed_box(world_bounds: BBox3, bounds: BBox3) -> Self {
        let mut seed = Self::new(bounds);
        seed.world_bounds = world_bounds;
        seed
    }
}

impl<A: Clone> Polytope<A> {
    /// Intersect the world box with `half_spaces`; `BrushIsEmpty` if nothing remains.
    pub fn from_half_spaces(
        world_bounds: BBox3,
        half_spaces: &[HalfSpace<A>],
    ) -> GeometryResult<Self> {
        let mut polytope = Self::new(world_bounds);
        let result = polytope.add_faces(half_spaces)?;
        if result.outcome == Intersection::BrushIsEmpty {
            return Err(GeometryError::BrushIsEmpty);
        }
        Ok(polytope)
    }

    /// Intersect the box spanned by `points` with the given planes.
    ///
    /// Used by the manipulation rebuild: starting from the tight box instead
    /// of the world box keeps the intermediate cuts short.
    pub(crate) fn from_planes_in_box(
        world_bounds: BBox3,
        points: &[Vector3<f64>],
        planes: &[(crate::geom3::Hs3, Option<A>)],
    ) -> GeometryResult<Option<Self>> {
        let Some(bounds) = BBox3::from_points(points.iter().copied()) else {
            return Ok(None);
        };
        let mut polytope = Self::seed_box(world_bounds, bounds);
        for (plane, attribs) in planes {
            if !polytope.add_face(plane, attribs.as_ref())?.is_solid() {
                return Ok(None);
            }
        }
        Ok(Some(polytope))
    }
}
