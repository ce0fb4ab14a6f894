//! Kernel data types: vertices, edges, face loops, marks and operation results.
//!
//! Ownership: a `Polytope` owns three arenas. Edges refer to vertices and
//! faces by id, faces refer to their boundary edges by id. Nothing outside
//! the owning polytope holds ids across mutations.

use std::collections::HashMap;

use nalgebra::Vector3;

use super::arena::{Arena, EdgeId, FaceId, VertexId};
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::cfg::COLINEAR_EPS;
use crate::geom3::{correct, Hs3};

/// Vertex classification during one intersection pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexMark {
    Keep,
    Drop,
    Undecided,
    /// Created on the cutting plane by an edge split.
    New,
}

impl VertexMark {
    fn name(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Drop => "drop",
            Self::Undecided => "undecided",
            Self::New => "new",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeMark {
    Keep,
    Drop,
    Split,
    Undecided,
    New,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceMark {
    Keep,
    Drop,
    Split,
    Undecided,
    New,
}

/// Pass-local marks. Created at the start of a pass and dropped at its end.
#[derive(Clone, Debug, Default)]
pub(crate) struct MarkTable {
    pub vertices: HashMap<VertexId, VertexMark>,
    pub edges: HashMap<EdgeId, EdgeMark>,
    pub faces: HashMap<FaceId, FaceMark>,
}

impl MarkTable {
    #[inline]
    pub fn vertex(&self, v: VertexId) -> Option<VertexMark> {
        self.vertices.get(&v).copied()
    }

    #[inline]
    pub fn face(&self, f: FaceId) -> Option<FaceMark> {
        self.faces.get(&f).copied()
    }

    /// On the cutting plane: undecided from the start or created by a split.
    #[inline]
    pub fn on_plane(&self, v: VertexId) -> bool {
        matches!(
            self.vertex(v),
            Some(VertexMark::Undecided) | Some(VertexMark::New)
        )
    }

    /// Whether edge `id` is still part of the solid after the splits.
    ///
    /// Split edges already had their dropped endpoint replaced. An undecided
    /// edge survives unless its other endpoint is dropped.
    pub fn edge_survives(&self, id: EdgeId, edge: &Edge) -> bool {
        match self.edges.get(&id) {
            Some(EdgeMark::Drop) => false,
            Some(EdgeMark::Keep | EdgeMark::Split | EdgeMark::New) => true,
            Some(EdgeMark::Undecided) | None => {
                self.vertex(edge.start) != Some(VertexMark::Drop)
                    && self.vertex(edge.end) != Some(VertexMark::Drop)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f64>,
}

/// Undirected topological edge.
///
/// Orientation: the edge runs `start → end` in the boundary loop of `left`
/// and `end → start` in the loop of `right`.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub start: VertexId,
    pub end: VertexId,
    pub left: Option<FaceId>,
    pub right: Option<FaceId>,
}

impl Edge {
    pub(crate) fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            left: None,
            right: None,
        }
    }

    /// First vertex of this edge when walking the loop of `face`.
    #[inline]
    pub fn start_in(&self, face: FaceId) -> VertexId {
        if self.left == Some(face) {
            self.start
        } else {
            self.end
        }
    }

    #[inline]
    pub fn end_in(&self, face: FaceId) -> VertexId {
        if self.left == Some(face) {
            self.end
        } else {
            self.start
        }
    }

    #[inline]
    pub fn other_face(&self, face: FaceId) -> Option<FaceId> {
        if self.left == Some(face) {
            self.right
        } else {
            self.left
        }
    }

    #[inline]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.start == v || self.end == v
    }

    #[inline]
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    /// Clears the side that refers to `face`.
    pub(crate) fn detach(&mut self, face: FaceId) {
        if self.left == Some(face) {
            self.left = None;
        }
        if self.right == Some(face) {
            self.right = None;
        }
    }

    /// Swaps direction and sides; the loop walks of both faces stay valid.
    pub(crate) fn flip(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        std::mem::swap(&mut self.left, &mut self.right);
    }

    /// Edge mark from its endpoint marks.
    pub(crate) fn classify(&self, marks: &MarkTable) -> GeometryResult<EdgeMark> {
        use VertexMark::*;
        let (Some(s), Some(e)) = (marks.vertex(self.start), marks.vertex(self.end)) else {
            return Err(GeometryError::InvalidMarkState {
                start: "unmarked",
                end: "unmarked",
            });
        };
        match (s, e) {
            (Drop, Drop) => Ok(EdgeMark::Drop),
            (Keep, Keep) => Ok(EdgeMark::Keep),
            (Keep, Drop) | (Drop, Keep) => Ok(EdgeMark::Split),
            (Undecided, Undecided | Keep | Drop) | (Keep | Drop, Undecided) => {
                Ok(EdgeMark::Undecided)
            }
            _ => Err(GeometryError::InvalidMarkState {
                start: s.name(),
                end: e.name(),
            }),
        }
    }

    /// Point where `plane` crosses this edge.
    ///
    /// Interpolated at `t = d0 / (d0 - d1)`. A coordinate along which the
    /// plane is axis-aligned is read from the plane constant instead, and the
    /// result is corrected for round-off.
    pub(crate) fn crossing(
        &self,
        plane: &Hs3,
        vertices: &Arena<VertexId, Vertex>,
    ) -> GeometryResult<Vector3<f64>> {
        let (Some(a), Some(b)) = (vertices.get(self.start), vertices.get(self.end)) else {
            return Err(GeometryError::invalid("edge refers to a missing vertex"));
        };
        let (p0, p1) = (a.position, b.position);
        let d0 = plane.distance(p0);
        let d1 = plane.distance(p1);
        if (d0 - d1).abs() < COLINEAR_EPS {
            return Err(GeometryError::NotSplittable);
        }
        let t = d0 / (d0 - d1);
        let mut position = p0 + (p1 - p0) * t;
        if let Some(axis) = plane.aligned_axis() {
            position[axis] = plane.axis_value(axis);
        }
        Ok(correct(position))
    }

    /// Cut this edge with `plane`, replacing the dropped endpoint with a new vertex.
    pub(crate) fn split(
        &mut self,
        mark: EdgeMark,
        plane: &Hs3,
        vertices: &mut Arena<VertexId, Vertex>,
        marks: &mut MarkTable,
    ) -> GeometryResult<VertexId> {
        if mark != EdgeMark::Split {
            return Err(GeometryError::NotSplittable);
        }
        let position = self.crossing(plane, vertices)?;
        let new_vertex = vertices.insert(Vertex { position });
        marks.vertices.insert(new_vertex, VertexMark::New);
        if marks.vertex(self.start) == Some(VertexMark::Drop) {
            self.start = new_vertex;
        } else {
            self.end = new_vertex;
        }
        Ok(new_vertex)
    }
}

/// One planar face: a counter-clockwise (seen from outside) loop of edges.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceGeometry<A> {
    pub(crate) boundary: Vec<EdgeId>,
    pub(crate) plane: Hs3,
    /// `None` for faces of the world-bounds seed.
    pub(crate) attribs: Option<A>,
}

impl<A> FaceGeometry<A> {
    pub(crate) fn new(boundary: Vec<EdgeId>, plane: Hs3, attribs: Option<A>) -> Self {
        Self {
            boundary,
            plane,
            attribs,
        }
    }

    #[inline]
    pub fn boundary(&self) -> &[EdgeId] {
        &self.boundary
    }

    #[inline]
    pub fn plane(&self) -> &Hs3 {
        &self.plane
    }

    #[inline]
    pub fn attribs(&self) -> Option<&A> {
        self.attribs.as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.boundary.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty()
    }

    pub fn position_of(&self, edge: EdgeId) -> Option<usize> {
        self.boundary.iter().position(|&e| e == edge)
    }

    /// Face mark after the edges were split.
    ///
    /// `Drop` without a kept vertex, `Keep` when every edge survives and the
    /// loop is still closed, `Split` otherwise (a dropped run or a gap left
    /// where a single vertex was cut off).
    pub(crate) fn classify(
        &self,
        id: FaceId,
        edges: &Arena<EdgeId, Edge>,
        marks: &MarkTable,
    ) -> GeometryResult<FaceMark> {
        let n = self.boundary.len();
        let mut has_keep = false;
        let mut intact = true;
        for (i, &e) in self.boundary.iter().enumerate() {
            let (Some(edge), Some(next)) = (edges.get(e), edges.get(self.boundary[(i + 1) % n]))
            else {
                return Err(GeometryError::invalid("face refers to a missing edge"));
            };
            has_keep |= marks.vertex(edge.start) == Some(VertexMark::Keep)
                || marks.vertex(edge.end) == Some(VertexMark::Keep);
            intact &= marks.edge_survives(e, edge) && edge.end_in(id) == next.start_in(id);
        }
        Ok(match (has_keep, intact) {
            (false, _) => FaceMark::Drop,
            (true, true) => FaceMark::Keep,
            (true, false) => FaceMark::Split,
        })
    }

    /// Rotate the loop so that index `offset` becomes the first edge.
    pub(crate) fn shift(&mut self, offset: usize) {
        let n = self.boundary.len();
        if n > 0 {
            self.boundary.rotate_left(offset % n);
        }
    }

    /// Replace `remove` consecutive edges starting at `at` (cyclically) by `insert`.
    ///
    /// The loop is left untouched if the result would have fewer than three edges.
    pub(crate) fn splice(
        &mut self,
        at: usize,
        remove: usize,
        insert: &[EdgeId],
    ) -> GeometryResult<()> {
        let n = self.boundary.len();
        if remove > n || n - remove + insert.len() < 3 {
            return Err(GeometryError::invalid(format!(
                "splicing {remove} of {n} edges would leave a face with fewer than 3 edges"
            )));
        }
        self.shift(at);
        self.boundary.splice(0..remove, insert.iter().copied());
        Ok(())
    }
}

/// Input half-space with its opaque face attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct HalfSpace<A> {
    pub plane: Hs3,
    pub attribs: A,
}

impl<A> HalfSpace<A> {
    pub fn new(plane: Hs3, attribs: A) -> Self {
        Self { plane, attribs }
    }
}

/// Result of intersecting the solid with one or more half-spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intersection {
    /// Every plane was redundant.
    Unchanged,
    /// At least one plane cut the solid.
    BrushIsSplit,
    /// The solid has no volume left; the polytope was not modified.
    BrushIsEmpty,
}

/// Bookkeeping returned by `Polytope::add_faces`.
#[derive(Clone, Debug, PartialEq)]
pub struct AddFacesResult<A> {
    pub outcome: Intersection,
    /// Indices (into the input) of half-spaces that now bound a face.
    pub added: Vec<usize>,
    /// Indices of half-spaces implied by the solid.
    pub redundant: Vec<usize>,
    /// Attributes of faces that were cut away.
    pub dropped: Vec<A>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    Moved,
    /// The moved points are flat; the polytope was not modified.
    BrushIsEmpty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveVerticesResult {
    pub outcome: MoveOutcome,
    /// Post-move positions of the moved vertices that survived.
    pub new_vertex_positions: Vec<Vector3<f64>>,
}

/// Read-only view of one face for rendering and export.
#[derive(Clone, Debug)]
pub struct FaceView<'a, A> {
    pub id: FaceId,
    pub plane: Hs3,
    pub attribs: Option<&'a A>,
    /// Boundary positions, counter-clockwise seen from outside.
    pub vertices: Vec<Vector3<f64>>,
}
