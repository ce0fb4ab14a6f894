//! Vertex, edge and face manipulation.
//!
//! Every operation reduces to "this point set, some points dragged": the
//! solid is rebuilt from the supporting planes of the new point set, each new
//! face inherits the attributes of the old face it overlaps most, and the
//! result is validated before it replaces the live polytope. `can_*` runs the
//! same pipeline on `&self` and discards the result.
//!
//! Drag policy
//! - Dragged points must stay inside the world bounds.
//! - The dragged and the remaining vertices each span a fragment (point,
//!   edge, polygon or solid). A point dragged onto a polygon and an edge
//!   dragged along an edge are always fine. Otherwise no dragged vertex may
//!   pass through a face of the remaining fragment from below to above; when
//!   the remaining fragment is the smaller one, the roles are swapped and the
//!   delta negated.
//! - Vertex drags may absorb vertices (dragged or not). Edge and face drags
//!   require every dragged vertex to survive.

use nalgebra::Vector3;
use tracing::debug;

use super::hull::{polygon_contains, supporting_planes, Fragment, Hull, HullFace};
use super::types::{MoveOutcome, MoveVerticesResult};
use super::{FaceId, Polytope, VertexId};
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::cfg::ALMOST_ZERO;
use crate::geom3::{centroid, snap_to_grid, BBox3, Hs3, PointStatus};

/// One point of the post-move point set.
#[derive(Clone, Debug)]
struct MovePoint {
    position: Vector3<f64>,
    /// Faces of the old solid this point came from (attribute mapping).
    origin_faces: Vec<FaceId>,
    /// Dragged (or inserted) by the operation.
    moved: bool,
}

/// A validated rebuild waiting to be committed.
struct Plan<A, T> {
    polytope: Polytope<A>,
    output: T,
}

impl<A: Clone> Polytope<A> {
    /// Dry run of `move_vertices`; never mutates.
    pub fn can_move_vertices(
        &self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> bool {
        match self.plan_vertex_move(world_bounds, positions, delta) {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(err) => {
                debug!(error = %err, "vertex move rejected");
                false
            }
        }
    }

    /// Drag the vertices at `positions` by `delta`.
    ///
    /// `new_vertex_positions` lists the dragged vertices that are still
    /// vertices afterwards; merged or absorbed ones are missing. A flat
    /// result is reported as `BrushIsEmpty` and leaves the polytope unchanged.
    pub fn move_vertices(
        &mut self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> GeometryResult<MoveVerticesResult> {
        match self.plan_vertex_move(world_bounds, positions, delta)? {
            Some(plan) => {
                debug!(
                    moved = positions.len(),
                    survived = plan.output.len(),
                    "vertices moved"
                );
                *self = plan.polytope;
                Ok(MoveVerticesResult {
                    outcome: MoveOutcome::Moved,
                    new_vertex_positions: plan.output,
                })
            }
            None => {
                debug!(moved = positions.len(), "vertex move flattens the brush");
                Ok(MoveVerticesResult {
                    outcome: MoveOutcome::BrushIsEmpty,
                    new_vertex_positions: Vec::new(),
                })
            }
        }
    }

    pub fn can_move_edges(
        &self,
        world_bounds: &BBox3,
        edges: &[(Vector3<f64>, Vector3<f64>)],
        delta: Vector3<f64>,
    ) -> bool {
        self.plan_edge_move(world_bounds, edges, delta)
            .map_err(|err| debug!(error = %err, "edge move rejected"))
            .is_ok()
    }

    /// Drag whole edges; every dragged edge must still be an edge afterwards.
    ///
    /// Returns the new segments in input order.
    pub fn move_edges(
        &mut self,
        world_bounds: &BBox3,
        edges: &[(Vector3<f64>, Vector3<f64>)],
        delta: Vector3<f64>,
    ) -> GeometryResult<Vec<(Vector3<f64>, Vector3<f64>)>> {
        let plan = self.plan_edge_move(world_bounds, edges, delta)?;
        debug!(edges = edges.len(), "edges moved");
        *self = plan.polytope;
        Ok(plan.output)
    }

    pub fn can_move_faces(
        &self,
        world_bounds: &BBox3,
        faces: &[Vec<Vector3<f64>>],
        delta: Vector3<f64>,
    ) -> bool {
        self.plan_face_move(world_bounds, faces, delta)
            .map_err(|err| debug!(error = %err, "face move rejected"))
            .is_ok()
    }

    /// Drag whole faces, given by their vertex sets; every dragged face must
    /// still be a face afterwards.
    ///
    /// Returns the vertex loops of the moved faces in input order.
    pub fn move_faces(
        &mut self,
        world_bounds: &BBox3,
        faces: &[Vec<Vector3<f64>>],
        delta: Vector3<f64>,
    ) -> GeometryResult<Vec<Vec<Vector3<f64>>>> {
        let plan = self.plan_face_move(world_bounds, faces, delta)?;
        debug!(faces = faces.len(), "faces moved");
        *self = plan.polytope;
        Ok(plan.output)
    }

    pub fn can_remove_vertices(&self, world_bounds: &BBox3, positions: &[Vector3<f64>]) -> bool {
        self.plan_vertex_removal(world_bounds, positions)
            .map_err(|err| debug!(error = %err, "vertex removal rejected"))
            .is_ok()
    }

    /// Rebuild the brush from every vertex except `positions`.
    pub fn remove_vertices(
        &mut self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
    ) -> GeometryResult<()> {
        let polytope = self.plan_vertex_removal(world_bounds, positions)?;
        debug!(
            removed = positions.len(),
            left = polytope.vertex_count(),
            "vertices removed"
        );
        *self = polytope;
        Ok(())
    }

    pub fn can_remove_faces(&self, faces: &[Vec<Vector3<f64>>]) -> bool {
        self.plan_face_removal(faces)
            .map_err(|err| debug!(error = %err, "face removal rejected"))
            .is_ok()
    }

    /// Drop the half-spaces behind the given faces and intersect the rest
    /// again, starting from the world box.
    ///
    /// The result is open when no remaining half-space bounds it in some
    /// direction; the world box faces fill in there.
    pub fn remove_faces(&mut self, faces: &[Vec<Vector3<f64>>]) -> GeometryResult<()> {
        let polytope = self.plan_face_removal(faces)?;
        debug!(
            removed = faces.len(),
            closed = polytope.is_closed(),
            "half-spaces removed"
        );
        *self = polytope;
        Ok(())
    }

    pub fn can_split_edge(
        &self,
        world_bounds: &BBox3,
        edge: (Vector3<f64>, Vector3<f64>),
        delta: Vector3<f64>,
    ) -> bool {
        self.plan_edge_split(world_bounds, edge, delta)
            .map_err(|err| debug!(error = %err, "edge split rejected"))
            .is_ok()
    }

    /// Insert a vertex at the midpoint of `edge` and drag it by `delta`.
    ///
    /// Returns the position of the new vertex.
    pub fn split_edge(
        &mut self,
        world_bounds: &BBox3,
        edge: (Vector3<f64>, Vector3<f64>),
        delta: Vector3<f64>,
    ) -> GeometryResult<Vector3<f64>> {
        let plan = self.plan_edge_split(world_bounds, edge, delta)?;
        *self = plan.polytope;
        Ok(plan.output)
    }

    pub fn can_split_face(
        &self,
        world_bounds: &BBox3,
        face: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> bool {
        self.plan_face_split(world_bounds, face, delta)
            .map_err(|err| debug!(error = %err, "face split rejected"))
            .is_ok()
    }

    /// Insert a vertex at the centroid of the face with vertex set `face` and drag it.
    pub fn split_face(
        &mut self,
        world_bounds: &BBox3,
        face: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> GeometryResult<Vector3<f64>> {
        let plan = self.plan_face_split(world_bounds, face, delta)?;
        *self = plan.polytope;
        Ok(plan.output)
    }

    pub fn can_snap_vertices(
        &self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
        grid: f64,
    ) -> bool {
        self.clone()
            .snap_vertices(world_bounds, positions, grid)
            .map_err(|err| debug!(error = %err, "snap rejected"))
            .is_ok()
    }

    /// Move each vertex to the nearest multiple of `grid`, one vertex at a time.
    ///
    /// All or nothing: if any single snap is rejected, nothing moves. Returns
    /// the snapped positions of the vertices that are still vertices.
    pub fn snap_vertices(
        &mut self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
        grid: f64,
    ) -> GeometryResult<Vec<Vector3<f64>>> {
        if grid.is_nan() || grid <= 0.0 {
            return Err(GeometryError::rejected(format!("grid size {grid} is not positive")));
        }
        self.resolve_vertices(positions)?;
        let mut scratch = self.clone();
        let mut snapped = Vec::with_capacity(positions.len());
        for &current in positions {
            let target = snap_to_grid(current, grid);
            let delta = target - current;
            if delta.norm() <= ALMOST_ZERO {
                snapped.push(current);
                continue;
            }
            let result = scratch.move_vertices(world_bounds, &[current], delta)?;
            if result.outcome == MoveOutcome::BrushIsEmpty {
                return Err(GeometryError::rejected("snapping flattens the brush"));
            }
            snapped.extend(result.new_vertex_positions);
        }
        debug!(snapped = snapped.len(), grid, "vertices snapped");
        *self = scratch;
        Ok(snapped)
    }

    fn plan_vertex_move(
        &self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> GeometryResult<Option<Plan<A, Vec<Vector3<f64>>>>> {
        check_delta(delta)?;
        let ids = self.resolve_vertices(positions)?;
        let Some(polytope) = self.plan_drag(world_bounds, &ids, delta, true)? else {
            return Ok(None);
        };
        let output = ids
            .iter()
            .filter_map(|&v| self.position(v))
            .filter_map(|p| polytope.find_vertex(p + delta))
            .filter_map(|v| polytope.position(v))
            .collect();
        Ok(Some(Plan { polytope, output }))
    }

    fn plan_edge_move(
        &self,
        world_bounds: &BBox3,
        edges: &[(Vector3<f64>, Vector3<f64>)],
        delta: Vector3<f64>,
    ) -> GeometryResult<Plan<A, Vec<(Vector3<f64>, Vector3<f64>)>>> {
        check_delta(delta)?;
        if edges.is_empty() {
            return Err(GeometryError::rejected("no edges to move"));
        }
        let mut ids: Vec<VertexId> = Vec::new();
        for &(a, b) in edges {
            let e = self
                .find_edge(a, b)
                .and_then(|e| self.edges.get(e))
                .ok_or(GeometryError::UnknownEdge { start: a, end: b })?;
            for v in [e.start, e.end] {
                if !ids.contains(&v) {
                    ids.push(v);
                }
            }
        }
        let polytope = self
            .plan_drag(world_bounds, &ids, delta, false)?
            .ok_or_else(|| GeometryError::rejected("moving the edges flattens the brush"))?;
        let mut output = Vec::with_capacity(edges.len());
        for &(a, b) in edges {
            let (a, b) = (a + delta, b + delta);
            let moved = polytope
                .find_edge(a, b)
                .and_then(|e| polytope.edges.get(e))
                .and_then(|e| Some((polytope.position(e.start)?, polytope.position(e.end)?)))
                .ok_or_else(|| {
                    GeometryError::rejected(format!(
                        "edge to ({}, {}, {}) would not survive the move",
                        b.x, b.y, b.z
                    ))
                })?;
            // Report in the caller's orientation.
            output.push(if (moved.0 - a).norm() <= ALMOST_ZERO {
                moved
            } else {
                (moved.1, moved.0)
            });
        }
        Ok(Plan { polytope, output })
    }

    fn plan_face_move(
        &self,
        world_bounds: &BBox3,
        faces: &[Vec<Vector3<f64>>],
        delta: Vector3<f64>,
    ) -> GeometryResult<Plan<A, Vec<Vec<Vector3<f64>>>>> {
        check_delta(delta)?;
        if faces.is_empty() {
            return Err(GeometryError::rejected("no faces to move"));
        }
        let mut ids: Vec<VertexId> = Vec::new();
        for face in faces {
            let f = self
                .find_face(face)
                .ok_or(GeometryError::UnknownFace { count: face.len() })?;
            for v in self.face_vertices(f) {
                if !ids.contains(&v) {
                    ids.push(v);
                }
            }
        }
        let polytope = self
            .plan_drag(world_bounds, &ids, delta, false)?
            .ok_or_else(|| GeometryError::rejected("moving the faces flattens the brush"))?;
        let mut output = Vec::with_capacity(faces.len());
        for face in faces {
            let moved: Vec<Vector3<f64>> = face.iter().map(|p| p + delta).collect();
            let f = polytope.find_face(&moved).ok_or_else(|| {
                GeometryError::rejected(format!(
                    "face with {} vertices would not survive the move",
                    face.len()
                ))
            })?;
            output.push(
                polytope
                    .face_vertices(f)
                    .into_iter()
                    .filter_map(|v| polytope.position(v))
                    .collect(),
            );
        }
        Ok(Plan { polytope, output })
    }

    fn plan_vertex_removal(
        &self,
        world_bounds: &BBox3,
        positions: &[Vector3<f64>],
    ) -> GeometryResult<Self> {
        let ids = self.resolve_vertices(positions)?;
        let points = self
            .vertices
            .keys()
            .filter(|id| !ids.contains(id))
            .filter_map(|id| {
                Some(MovePoint {
                    position: self.position(id)?,
                    origin_faces: self.faces_of_vertex(id),
                    moved: false,
                })
            })
            .collect();
        self.rebuild(world_bounds, points)?
            .ok_or_else(|| GeometryError::rejected("removing the vertices flattens the brush"))
    }

    fn plan_face_removal(&self, faces: &[Vec<Vector3<f64>>]) -> GeometryResult<Self> {
        if faces.is_empty() {
            return Err(GeometryError::rejected("no faces to remove"));
        }
        let mut removed = Vec::with_capacity(faces.len());
        for face in faces {
            let f = self
                .find_face(face)
                .ok_or(GeometryError::UnknownFace { count: face.len() })?;
            if self.faces.get(f).and_then(|g| g.attribs.as_ref()).is_none() {
                return Err(GeometryError::rejected("face belongs to the world bounds"));
            }
            removed.push(f);
        }
        let mut polytope = Self::new(self.world_bounds);
        for (id, face) in self.faces.iter() {
            let Some(attribs) = face.attribs.as_ref() else {
                continue;
            };
            if removed.contains(&id) {
                continue;
            }
            if !polytope
                .add_face(&face.plane, Some(attribs))
                .map_err(GeometryError::into_invalid)?
                .is_solid()
            {
                return Err(GeometryError::invalid("remaining half-spaces are empty"));
            }
        }
        polytope.check_invariants()?;
        Ok(polytope)
    }

    fn plan_edge_split(
        &self,
        world_bounds: &BBox3,
        (a, b): (Vector3<f64>, Vector3<f64>),
        delta: Vector3<f64>,
    ) -> GeometryResult<Plan<A, Vector3<f64>>> {
        check_delta(delta)?;
        let edge = self
            .find_edge(a, b)
            .and_then(|e| self.edges.get(e))
            .ok_or(GeometryError::UnknownEdge { start: a, end: b })?;
        let origin_faces = [edge.left, edge.right].into_iter().flatten().collect();
        let (Some(pa), Some(pb)) = (self.position(edge.start), self.position(edge.end)) else {
            return Err(GeometryError::UnknownEdge { start: a, end: b });
        };
        self.plan_insertion(world_bounds, (pa + pb) * 0.5 + delta, origin_faces)
    }

    fn plan_face_split(
        &self,
        world_bounds: &BBox3,
        face: &[Vector3<f64>],
        delta: Vector3<f64>,
    ) -> GeometryResult<Plan<A, Vector3<f64>>> {
        check_delta(delta)?;
        let f = self
            .find_face(face)
            .ok_or(GeometryError::UnknownFace { count: face.len() })?;
        let center = centroid(
            self.face_vertices(f)
                .into_iter()
                .filter_map(|v| self.position(v)),
        )
        .ok_or(GeometryError::UnknownFace { count: face.len() })?;
        self.plan_insertion(world_bounds, center + delta, vec![f])
    }

    /// Add one dragged point to the current vertices; it has to become a vertex.
    fn plan_insertion(
        &self,
        world_bounds: &BBox3,
        position: Vector3<f64>,
        origin_faces: Vec<FaceId>,
    ) -> GeometryResult<Plan<A, Vector3<f64>>> {
        let mut points = self.point_set(&[], Vector3::zeros());
        points.push(MovePoint {
            position,
            origin_faces,
            moved: true,
        });
        let polytope = self
            .rebuild(world_bounds, points)?
            .ok_or_else(|| GeometryError::rejected("split flattens the brush"))?;
        let output = polytope
            .find_vertex(position)
            .and_then(|v| polytope.position(v))
            .ok_or_else(|| GeometryError::rejected("inserted vertex would not survive"))?;
        Ok(Plan { polytope, output })
    }

    fn resolve_vertices(&self, positions: &[Vector3<f64>]) -> GeometryResult<Vec<VertexId>> {
        if positions.is_empty() {
            return Err(GeometryError::rejected("no vertices to move"));
        }
        let mut ids = Vec::with_capacity(positions.len());
        for &p in positions {
            let v = self
                .find_vertex(p)
                .ok_or(GeometryError::UnknownVertex { position: p })?;
            if !ids.contains(&v) {
                ids.push(v);
            }
        }
        Ok(ids)
    }

    /// Current vertices, with `moved` dragged by `delta`.
    fn point_set(&self, moved: &[VertexId], delta: Vector3<f64>) -> Vec<MovePoint> {
        self.vertices
            .iter()
            .map(|(id, v)| {
                let is_moved = moved.contains(&id);
                MovePoint {
                    position: if is_moved { v.position + delta } else { v.position },
                    origin_faces: self.faces_of_vertex(id),
                    moved: is_moved,
                }
            })
            .collect()
    }

    /// Drag the vertices `ids` by `delta` and rebuild; `None` if the result is flat.
    fn plan_drag(
        &self,
        world_bounds: &BBox3,
        ids: &[VertexId],
        delta: Vector3<f64>,
        allow_removal: bool,
    ) -> GeometryResult<Option<Self>> {
        let points = self.point_set(ids, delta);
        let Some(rebuilt) = self.rebuild(world_bounds, points)? else {
            return Ok(None);
        };
        if ids.len() == self.vertices.len() {
            return Ok(Some(rebuilt));
        }
        if !allow_removal {
            for p in ids.iter().filter_map(|&v| self.position(v)) {
                let target = p + delta;
                if !rebuilt.has_vertex(target) {
                    return Err(GeometryError::rejected(format!(
                        "vertex dragged to ({}, {}, {}) would be removed",
                        target.x, target.y, target.z
                    )));
                }
            }
        }
        self.check_pass_through(ids, delta)?;
        Ok(Some(rebuilt))
    }

    /// Reject a drag that carries a vertex through a face of the fragment
    /// that stays behind (or, swapped, the fragment through the dragged one).
    fn check_pass_through(&self, ids: &[VertexId], delta: Vector3<f64>) -> GeometryResult<()> {
        let (mut moving, mut remaining): (Vec<Vector3<f64>>, Vec<Vector3<f64>>) =
            (Vec::new(), Vec::new());
        for (id, v) in self.vertices.iter() {
            if ids.contains(&id) {
                moving.push(v.position);
            } else {
                remaining.push(v.position);
            }
        }
        let (mut moving_shape, mut remaining_shape) =
            (Fragment::of(&moving), Fragment::of(&remaining));
        if matches!(
            (&moving_shape, &remaining_shape),
            (Fragment::Point, Fragment::Polygon(_)) | (Fragment::Edge, Fragment::Edge)
        ) {
            return Ok(());
        }
        let swap = matches!(remaining_shape, Fragment::Point | Fragment::Edge)
            || matches!(
                (&moving_shape, &remaining_shape),
                (Fragment::Solid(_), Fragment::Polygon(_))
            );
        let delta = if swap {
            std::mem::swap(&mut moving, &mut remaining);
            std::mem::swap(&mut moving_shape, &mut remaining_shape);
            -delta
        } else {
            delta
        };
        for (plane, corners) in remaining_shape.faces(&remaining) {
            for &from in &moving {
                let to = from + delta;
                if plane.status(from) != PointStatus::Below || plane.status(to) != PointStatus::Above
                {
                    continue;
                }
                let (d0, d1) = (plane.distance(from), plane.distance(to));
                let crossing = from + (to - from) * (d0 / (d0 - d1));
                if polygon_contains(&plane, &corners, crossing) {
                    return Err(GeometryError::rejected(format!(
                        "vertex at ({}, {}, {}) would pass through a face",
                        from.x, from.y, from.z
                    )));
                }
            }
        }
        Ok(())
    }

    /// Rebuild the solid spanned by `points` and validate it; `None` if it is flat.
    fn rebuild(
        &self,
        world_bounds: &BBox3,
        points: Vec<MovePoint>,
    ) -> GeometryResult<Option<Self>> {
        if let Some(p) = points
            .iter()
            .find(|p| p.moved && !world_bounds.contains_point(p.position))
        {
            return Err(GeometryError::OutOfWorldBounds {
                position: p.position,
            });
        }
        let points = merge_coincident(points);
        let positions: Vec<Vector3<f64>> = points.iter().map(|p| p.position).collect();
        let Hull::Solid(hull) = supporting_planes(&positions) else {
            return Ok(None);
        };
        let planes: Vec<(Hs3, Option<A>)> = hull
            .iter()
            .map(|face| (face.plane, self.inherited_attribs(face, &points)))
            .collect();
        let Some(rebuilt) = Self::from_planes_in_box(*world_bounds, &positions, &planes)
            .map_err(GeometryError::into_invalid)?
        else {
            return Ok(None);
        };
        rebuilt.check_world_bounds()?;
        rebuilt.check_invariants()?;
        Ok(Some(rebuilt))
    }

    /// Attributes of the old face sharing the most points with `face`;
    /// ties go to the better aligned normal.
    fn inherited_attribs(&self, face: &HullFace, points: &[MovePoint]) -> Option<A> {
        let mut best: Option<(usize, f64, FaceId)> = None;
        for (id, old) in self.faces.iter() {
            let shared = face
                .on_plane
                .iter()
                .filter(|&&i| points[i].origin_faces.contains(&id))
                .count();
            let alignment = old.plane.n.dot(&face.plane.n);
            let better = match best {
                None => true,
                Some((s, a, _)) => shared > s || (shared == s && alignment > a),
            };
            if better {
                best = Some((shared, alignment, id));
            }
        }
        best.and_then(|(_, _, id)| self.faces.get(id))
            .and_then(|f| f.attribs.clone())
    }
}

fn check_delta(delta: Vector3<f64>) -> GeometryResult<()> {
    if delta.norm() <= ALMOST_ZERO {
        return Err(GeometryError::rejected("zero delta"));
    }
    Ok(())
}

/// Merge points closer than `ALMOST_ZERO`; an unmoved vertex keeps its exact position.
fn merge_coincident(points: Vec<MovePoint>) -> Vec<MovePoint> {
    let mut merged: Vec<MovePoint> = Vec::with_capacity(points.len());
    for p in points {
        match merged
            .iter_mut()
            .find(|q| (q.position - p.position).norm() <= ALMOST_ZERO)
        {
            Some(q) => {
                if !p.moved {
                    q.position = p.position;
                }
                q.moved &= p.moved;
                for f in p.origin_faces {
                    if !q.origin_faces.contains(&f) {
                        q.origin_faces.push(f);
                    }
                }
            }
            None => merged.push(p),
        }
    }
    merged
}
