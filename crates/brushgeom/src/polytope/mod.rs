//! Convex brush polytope: explicit vertex/edge/face topology under editing.
//!
//! Purpose
//! - Represent one convex solid (a brush) as the intersection of half-spaces
//!   *and* as a closed 2-manifold mesh, and keep the two consistent while
//!   planes are added, vertices are dragged and the solid is clipped.
//!
//! Layout
//! - Per-polytope arenas (`arena.rs`) with generation-checked ids. All
//!   cross references (edge → vertex, edge → face, face → edge) are ids into
//!   the owning polytope, so `Clone` yields an independent snapshot.
//! - `types.rs`: primitives and result types. `build.rs`: seed box and the
//!   loop builder. `intersect.rs`: incremental half-space intersection.
//!   `hull.rs` + `manip.rs`: vertex, edge and face manipulation through a
//!   convex-hull rebuild. `validate.rs`: structural and geometric checks.
//!
//! Conventions
//! - Face loops are counter-clockwise seen from outside. An edge runs
//!   `start → end` in its `left` face and `end → start` in its `right` face.
//! - The "empty" polytope is the world-bounds box whose faces carry no
//!   attributes. Adding a half-space that coincides with such a face adopts it.
//! - Every mutator works on a clone and swaps it in only after the final
//!   invariant check; on error the polytope is unchanged.

mod arena;
mod build;
mod hull;
mod intersect;
mod manip;
pub mod special;
mod types;
mod validate;

use nalgebra::Vector3;

use crate::error::{GeometryError, GeometryResult};
use crate::geom3::cfg::ALMOST_ZERO;
use crate::geom3::{centroid, BBox3, Hs3};

pub use arena::{EdgeId, FaceId, VertexId};
pub use types::{
    AddFacesResult, Edge, EdgeMark, FaceGeometry, FaceMark, FaceView, HalfSpace, Intersection,
    MoveOutcome, MoveVerticesResult, Vertex, VertexMark,
};

use arena::Arena;

/// Convex solid with explicit topology; `A` is the opaque per-face payload.
///
/// Invariants (checked by `check_invariants` after every mutation):
/// - closed 2-manifold: every edge has two distinct faces, every face loop is
///   closed with at least three edges, `V - E + F = 2`;
/// - convex: every vertex lies on the inner side of every face plane;
/// - every vertex lies inside `world_bounds`.
#[derive(Clone, Debug)]
pub struct Polytope<A> {
    pub(crate) world_bounds: BBox3,
    pub(crate) vertices: Arena<VertexId, Vertex>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) faces: Arena<FaceId, FaceGeometry<A>>,
}

impl<A> Polytope<A> {
    #[inline]
    pub fn world_bounds(&self) -> &BBox3 {
        &self.world_bounds
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> Option<&FaceGeometry<A>> {
        self.faces.get(id)
    }

    pub fn vertex_positions(&self) -> Vec<Vector3<f64>> {
        self.vertices.values().map(|v| v.position).collect()
    }

    pub fn edge_segments(&self) -> Vec<(Vector3<f64>, Vector3<f64>)> {
        self.edges
            .values()
            .filter_map(|e| Some((self.position(e.start)?, self.position(e.end)?)))
            .collect()
    }

    /// Every face with its boundary positions in loop order.
    pub fn faces(&self) -> Vec<FaceView<'_, A>> {
        self.faces
            .iter()
            .map(|(id, face)| FaceView {
                id,
                plane: face.plane,
                attribs: face.attribs.as_ref(),
                vertices: self
                    .face_vertices(id)
                    .into_iter()
                    .filter_map(|v| self.position(v))
                    .collect(),
            })
            .collect()
    }

    /// `true` once no face of the world-bounds seed is left.
    pub fn is_closed(&self) -> bool {
        self.faces.values().all(|f| f.attribs.is_some())
    }

    pub fn bounds(&self) -> BBox3 {
        BBox3::from_points(self.vertices.values().map(|v| v.position))
            .unwrap_or(self.world_bounds)
    }

    /// Mean of the vertex positions.
    pub fn center(&self) -> Vector3<f64> {
        centroid(self.vertices.values().map(|v| v.position)).unwrap_or_else(Vector3::zeros)
    }

    /// Inside or on the boundary (plane band).
    pub fn contains_point(&self, p: Vector3<f64>) -> bool {
        self.faces.values().all(|f| f.plane.contains(p))
    }

    /// Planes of all faces, paired with their attributes.
    pub fn planes(&self) -> Vec<(Hs3, Option<&A>)> {
        self.faces
            .values()
            .map(|f| (f.plane, f.attribs.as_ref()))
            .collect()
    }

    pub fn find_vertex(&self, p: Vector3<f64>) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| (v.position - p).norm() <= ALMOST_ZERO)
            .map(|(id, _)| id)
    }

    pub fn find_edge(&self, a: Vector3<f64>, b: Vector3<f64>) -> Option<EdgeId> {
        let va = self.find_vertex(a)?;
        let vb = self.find_vertex(b)?;
        self.edges
            .iter()
            .find(|(_, e)| e.connects(va, vb))
            .map(|(id, _)| id)
    }

    /// Face whose vertex set equals `positions` (any order).
    pub fn find_face(&self, positions: &[Vector3<f64>]) -> Option<FaceId> {
        let wanted = positions
            .iter()
            .map(|&p| self.find_vertex(p))
            .collect::<Option<Vec<_>>>()?;
        self.faces.keys().find(|&f| {
            let loop_vertices = self.face_vertices(f);
            loop_vertices.len() == wanted.len() && wanted.iter().all(|v| loop_vertices.contains(v))
        })
    }

    #[inline]
    pub fn has_vertex(&self, p: Vector3<f64>) -> bool {
        self.find_vertex(p).is_some()
    }

    #[inline]
    pub fn has_edge(&self, a: Vector3<f64>, b: Vector3<f64>) -> bool {
        self.find_edge(a, b).is_some()
    }

    #[inline]
    pub fn has_face(&self, positions: &[Vector3<f64>]) -> bool {
        self.find_face(positions).is_some()
    }

    /// Faces around the vertex at `p`.
    pub fn incident_faces(&self, p: Vector3<f64>) -> GeometryResult<Vec<FaceId>> {
        let v = self
            .find_vertex(p)
            .ok_or(GeometryError::UnknownVertex { position: p })?;
        Ok(self.faces_of_vertex(v))
    }

    /// Move the whole solid; fails without mutating if it would leave the world.
    pub fn translate(&mut self, delta: Vector3<f64>) -> GeometryResult<()> {
        if let Some(v) = self
            .vertices
            .values()
            .find(|v| !self.world_bounds.contains_point(v.position + delta))
        {
            return Err(GeometryError::OutOfWorldBounds {
                position: v.position + delta,
            });
        }
        for (_, v) in self.vertices.iter_mut() {
            v.position += delta;
        }
        for (_, f) in self.faces.iter_mut() {
            f.plane = f.plane.translated(delta);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn position(&self, v: VertexId) -> Option<Vector3<f64>> {
        self.vertices.get(v).map(|v| v.position)
    }

    /// Vertices of a face in loop order.
    pub(crate) fn face_vertices(&self, f: FaceId) -> Vec<VertexId> {
        let Some(face) = self.faces.get(f) else {
            return Vec::new();
        };
        face.boundary
            .iter()
            .filter_map(|&e| self.edges.get(e).map(|edge| edge.start_in(f)))
            .collect()
    }

    pub(crate) fn faces_of_vertex(&self, v: VertexId) -> Vec<FaceId> {
        let mut out = Vec::new();
        for edge in self.edges.values().filter(|e| e.has_vertex(v)) {
            for f in [edge.left, edge.right].into_iter().flatten() {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }
}
