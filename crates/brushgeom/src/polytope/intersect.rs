//! Incremental half-space intersection (`add_faces`).
//!
//! One pass per plane:
//! 1. mark vertices against the plane (`Drop` above, `Keep` below, `Undecided` in the band);
//! 2. put endpoints on the plane when a crossing lands next to them;
//! 3. mark edges from their endpoints and split the crossing ones;
//! 4. drop faces without a kept vertex, shorten the cut ones by one seam edge;
//! 5. chain the seam edges into the new face;
//! 6. remove orphaned edges and vertices.
//!
//! The pass runs on a scratch copy; `add_faces` swaps it in only after the
//! whole batch succeeded and the invariant check passed.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use super::types::{
    AddFacesResult, Edge, EdgeMark, FaceGeometry, FaceMark, HalfSpace, Intersection, MarkTable,
    VertexMark,
};
use super::{EdgeId, FaceId, Polytope, VertexId};
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::cfg::ALMOST_ZERO;
use crate::geom3::{Hs3, PointStatus};

/// What one plane did to the solid.
#[derive(Debug)]
pub(crate) enum FaceAdded<A> {
    /// The plane cut the solid; carries the attributes of faces that vanished.
    Split(Vec<A>),
    /// The plane coincided with a face of the world seed and took it over.
    Adopted,
    Redundant,
    Empty,
}

impl<A> FaceAdded<A> {
    #[inline]
    pub(crate) fn is_solid(&self) -> bool {
        !matches!(self, FaceAdded::Empty)
    }
}

impl<A: Clone> Polytope<A> {
    /// Intersect the solid with every half-space in order.
    ///
    /// All or nothing: on `Err` and on `BrushIsEmpty` the polytope is unchanged.
    /// Primitive failures surface as `BrushIsInvalid`.
    pub fn add_faces(&mut self, half_spaces: &[HalfSpace<A>]) -> GeometryResult<AddFacesResult<A>> {
        let mut scratch = self.clone();
        let mut result = AddFacesResult {
            outcome: Intersection::Unchanged,
            added: Vec::new(),
            redundant: Vec::new(),
            dropped: Vec::new(),
        };

        for (index, hs) in half_spaces.iter().enumerate() {
            let added = scratch
                .add_face(&hs.plane, Some(&hs.attribs))
                .map_err(|err| {
                    let err = err.into_invalid();
                    warn!(index, error = %err, "half-space intersection aborted");
                    err
                })?;
            match added {
                FaceAdded::Split(dropped) => {
                    debug!(index, dropped = dropped.len(), "plane cut the brush");
                    result.added.push(index);
                    result.dropped.extend(dropped);
                }
                FaceAdded::Adopted => {
                    debug!(index, "plane took over a world-bounds face");
                    result.added.push(index);
                }
                FaceAdded::Redundant => {
                    debug!(index, "plane is redundant");
                    result.redundant.push(index);
                }
                FaceAdded::Empty => {
                    debug!(index, "plane leaves nothing of the brush");
                    result.outcome = Intersection::BrushIsEmpty;
                    return Ok(result);
                }
            }
        }

        if result.added.is_empty() {
            return Ok(result);
        }
        scratch.check_world_bounds()?;
        scratch.check_invariants().map_err(|err| {
            warn!(error = %err, "intersection produced an invalid brush");
            err
        })?;
        result.outcome = Intersection::BrushIsSplit;
        *self = scratch;
        Ok(result)
    }

    /// One intersection pass, in place. Callers own the rollback (work on a clone).
    pub(crate) fn add_face(
        &mut self,
        plane: &Hs3,
        attribs: Option<&A>,
    ) -> GeometryResult<FaceAdded<A>> {
        let mut marks = MarkTable::default();
        for (id, v) in self.vertices.iter() {
            let mark = match plane.status(v.position) {
                PointStatus::Above => VertexMark::Drop,
                PointStatus::Below => VertexMark::Keep,
                PointStatus::Inside => VertexMark::Undecided,
            };
            marks.vertices.insert(id, mark);
        }
        self.settle_near_crossings(plane, &mut marks)?;
        let count = |mark| marks.vertices.values().filter(|&&m| m == mark).count();
        let (keep, drop) = (count(VertexMark::Keep), count(VertexMark::Drop));
        trace!(
            keep,
            drop,
            undecided = count(VertexMark::Undecided),
            "vertices classified"
        );

        if drop == 0 {
            return Ok(self.adopt_seed_face(plane, attribs));
        }
        if keep == 0 {
            return Ok(FaceAdded::Empty);
        }

        self.split_edges(plane, &mut marks)?;
        let dropped = self.cut_faces(&mut marks)?;
        self.close_with_face(plane, attribs, &mut marks)?;
        self.remove_orphans(&marks);
        Ok(FaceAdded::Split(dropped))
    }

    /// A crossing closer than `ALMOST_ZERO` to an endpoint would create a
    /// vertex coinciding with it; that endpoint is put on the plane instead.
    fn settle_near_crossings(&self, plane: &Hs3, marks: &mut MarkTable) -> GeometryResult<()> {
        for edge in self.edges.values() {
            if edge.classify(marks)? != EdgeMark::Split {
                continue;
            }
            let crossing = edge.crossing(plane, &self.vertices)?;
            for v in [edge.start, edge.end] {
                if self
                    .position(v)
                    .is_some_and(|p| (p - crossing).norm() <= ALMOST_ZERO)
                {
                    marks.vertices.insert(v, VertexMark::Undecided);
                }
            }
        }
        Ok(())
    }

    fn adopt_seed_face(&mut self, plane: &Hs3, attribs: Option<&A>) -> FaceAdded<A> {
        let Some(attribs) = attribs else {
            return FaceAdded::Redundant;
        };
        let seed = self
            .faces
            .iter_mut()
            .find(|(_, f)| f.attribs.is_none() && f.plane.approx_eq(plane));
        match seed {
            Some((_, face)) => {
                face.plane = *plane;
                face.attribs = Some(attribs.clone());
                FaceAdded::Adopted
            }
            None => FaceAdded::Redundant,
        }
    }

    fn split_edges(&mut self, plane: &Hs3, marks: &mut MarkTable) -> GeometryResult<()> {
        let ids: Vec<EdgeId> = self.edges.keys().collect();
        for e in ids {
            let Some(edge) = self.edges.get_mut(e) else {
                continue;
            };
            let mark = edge.classify(marks)?;
            marks.edges.insert(e, mark);
            if mark == EdgeMark::Split {
                edge.split(mark, plane, &mut self.vertices, marks)?;
            }
        }
        Ok(())
    }

    /// Drop or shorten every face that has vertices above the plane.
    fn cut_faces(&mut self, marks: &mut MarkTable) -> GeometryResult<Vec<A>> {
        let ids: Vec<FaceId> = self.faces.keys().collect();
        for &f in &ids {
            if let Some(face) = self.faces.get(f) {
                let mark = face.classify(f, &self.edges, marks)?;
                marks.faces.insert(f, mark);
            }
        }

        let mut dropped = Vec::new();
        let (mut kept, mut split) = (0usize, 0usize);
        for f in ids {
            match marks.face(f) {
                Some(FaceMark::Drop) => self.remove_face(f, &mut dropped),
                Some(FaceMark::Split) => {
                    self.shorten_face(f, marks)?;
                    split += 1;
                }
                _ => kept += 1,
            }
        }
        trace!(kept, split, dropped = dropped.len(), "faces cut");
        Ok(dropped)
    }

    /// Close the single gap in the loop of `f` with one seam edge.
    ///
    /// The gap is either a run of edges that no longer survive or, when a
    /// single vertex was cut off, the jump between the two split edges.
    fn shorten_face(&mut self, f: FaceId, marks: &mut MarkTable) -> GeometryResult<()> {
        let boundary = self
            .faces
            .get(f)
            .map(|face| face.boundary.clone())
            .ok_or_else(|| GeometryError::invalid("face vanished while cutting"))?;
        let n = boundary.len();
        let mut survivors = Vec::with_capacity(n);
        for (i, &e) in boundary.iter().enumerate() {
            if marks.edge_survives(e, self.edge_or_invalid(e)?) {
                survivors.push(i);
            }
        }
        if survivors.len() < 2 {
            return Err(GeometryError::invalid("cut face keeps fewer than two edges"));
        }

        let mut gaps = Vec::new();
        for (k, &i) in survivors.iter().enumerate() {
            let j = survivors[(k + 1) % survivors.len()];
            let a = self.edge_or_invalid(boundary[i])?.end_in(f);
            let b = self.edge_or_invalid(boundary[j])?.start_in(f);
            if a != b || j != (i + 1) % n {
                gaps.push((i, j, a, b));
            }
        }
        let &[(last, next, a, b)] = gaps.as_slice() else {
            return Err(GeometryError::invalid(format!(
                "face is cut into {} pieces",
                gaps.len()
            )));
        };
        if a == b || !marks.on_plane(a) || !marks.on_plane(b) {
            return Err(GeometryError::invalid("seam edge endpoints are not on the plane"));
        }
        let remove = (next + n - last - 1) % n;

        let mut seam = Edge::new(a, b);
        seam.left = Some(f);
        let seam = self.edges.insert(seam);
        marks.edges.insert(seam, EdgeMark::New);

        let face = self
            .faces
            .get_mut(f)
            .ok_or_else(|| GeometryError::invalid("face vanished while cutting"))?;
        face.splice((last + 1) % n, remove, &[seam])?;
        for k in 1..=remove {
            if let Some(edge) = self.edges.get_mut(boundary[(last + k) % n]) {
                edge.detach(f);
            }
        }
        Ok(())
    }

    /// Chain the edges with one open side into the face contributed by `plane`.
    fn close_with_face(
        &mut self,
        plane: &Hs3,
        attribs: Option<&A>,
        marks: &mut MarkTable,
    ) -> GeometryResult<()> {
        let orphans: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, e)| e.left.is_none() && e.right.is_none())
            .map(|(id, _)| id)
            .collect();
        for e in orphans {
            self.edges.remove(e);
            marks.edges.insert(e, EdgeMark::Drop);
        }

        let open: Vec<EdgeId> = self
            .edges
            .iter()
            .filter(|(_, e)| e.left.is_none() != e.right.is_none())
            .map(|(id, _)| id)
            .collect();
        if open.len() < 3 {
            return Err(GeometryError::invalid(format!(
                "new face would have {} edges",
                open.len()
            )));
        }

        let new_face = self
            .faces
            .insert(FaceGeometry::new(Vec::new(), *plane, attribs.cloned()));
        marks.faces.insert(new_face, FaceMark::New);
        let mut by_start: HashMap<VertexId, EdgeId> = HashMap::with_capacity(open.len());
        for &e in &open {
            let edge = self
                .edges
                .get_mut(e)
                .ok_or_else(|| GeometryError::invalid("open edge vanished"))?;
            if !marks.on_plane(edge.start) || !marks.on_plane(edge.end) {
                return Err(GeometryError::invalid("open edge is not on the cutting plane"));
            }
            if edge.left.is_none() {
                edge.left = Some(new_face);
            } else {
                edge.right = Some(new_face);
            }
            if by_start.insert(edge.start_in(new_face), e).is_some() {
                return Err(GeometryError::invalid("open edges branch at a vertex"));
            }
        }

        let mut boundary = Vec::with_capacity(open.len());
        let first = open[0];
        let mut current = first;
        loop {
            boundary.push(current);
            if boundary.len() > open.len() {
                return Err(GeometryError::invalid("open edges do not form a loop"));
            }
            let end = self.edge_or_invalid(current)?.end_in(new_face);
            current = *by_start
                .get(&end)
                .ok_or_else(|| GeometryError::invalid("open edge chain is broken"))?;
            if current == first {
                break;
            }
        }
        if boundary.len() != open.len() {
            return Err(GeometryError::invalid("open edges form more than one loop"));
        }
        if let Some(face) = self.faces.get_mut(new_face) {
            face.boundary = boundary;
        }
        Ok(())
    }

    /// Remove dropped vertices and every vertex no edge refers to.
    fn remove_orphans(&mut self, marks: &MarkTable) {
        let referenced: HashSet<VertexId> = self
            .edges
            .values()
            .flat_map(|e| [e.start, e.end])
            .collect();
        let stale: Vec<VertexId> = self
            .vertices
            .keys()
            .filter(|v| marks.vertex(*v) == Some(VertexMark::Drop) || !referenced.contains(v))
            .collect();
        for v in stale {
            self.vertices.remove(v);
        }
    }

    fn remove_face(&mut self, f: FaceId, dropped: &mut Vec<A>) {
        let Some(face) = self.faces.remove(f) else {
            return;
        };
        for &e in &face.boundary {
            if let Some(edge) = self.edges.get_mut(e) {
                edge.detach(f);
            }
        }
        if let Some(attribs) = face.attribs {
            dropped.push(attribs);
        }
    }
}

impl<A> Polytope<A> {
    pub(crate) fn edge_or_invalid(&self, e: EdgeId) -> GeometryResult<&Edge> {
        self.edges
            .get(e)
            .ok_or_else(|| GeometryError::invalid("face refers to a missing edge"))
    }

    pub(crate) fn check_world_bounds(&self) -> GeometryResult<()> {
        match self
            .vertices
            .values()
            .find(|v| !self.world_bounds.contains_point(v.position))
        {
            Some(v) => Err(GeometryError::OutOfWorldBounds {
                position: v.position,
            }),
            None => Ok(()),
        }
    }
}
