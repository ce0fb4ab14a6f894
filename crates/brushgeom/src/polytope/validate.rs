//! Structural and geometric invariant checks.

use std::collections::{HashMap, HashSet};

use nalgebra::Vector3;

use super::{EdgeId, Polytope, VertexId};
use crate::error::{GeometryError, GeometryResult};
use crate::geom3::cfg::ALMOST_ZERO;

impl<A> Polytope<A> {
    /// Full consistency check; the first violation is reported as `BrushIsInvalid`.
    ///
    /// Covers Euler characteristic, loop closure and orientation, edge/face
    /// incidence, vertex degree, duplicate vertices, coplanarity and convexity.
    pub fn check_invariants(&self) -> GeometryResult<()> {
        let (v, e, f) = (
            self.vertices.len() as i64,
            self.edges.len() as i64,
            self.faces.len() as i64,
        );
        if v - e + f != 2 {
            return Err(GeometryError::invalid(format!(
                "Euler characteristic V - E + F = {v} - {e} + {f} != 2"
            )));
        }
        self.check_edges()?;
        self.check_loops()?;
        self.check_vertices()?;
        self.check_geometry()
    }

    fn check_edges(&self) -> GeometryResult<()> {
        for (id, edge) in self.edges.iter() {
            if edge.start == edge.end {
                return Err(GeometryError::invalid(format!("edge {id:?} is a loop")));
            }
            let (Some(left), Some(right)) = (edge.left, edge.right) else {
                return Err(GeometryError::invalid(format!("edge {id:?} has an open side")));
            };
            if left == right {
                return Err(GeometryError::invalid(format!(
                    "edge {id:?} has the same face on both sides"
                )));
            }
            for side in [left, right] {
                let face = self.faces.get(side).ok_or_else(|| {
                    GeometryError::invalid(format!("edge {id:?} refers to a missing face"))
                })?;
                let count = face.boundary.iter().filter(|&&b| b == id).count();
                if count != 1 {
                    return Err(GeometryError::invalid(format!(
                        "edge {id:?} appears {count} times in face {side:?}"
                    )));
                }
            }
            let (Some(a), Some(b)) = (self.position(edge.start), self.position(edge.end)) else {
                return Err(GeometryError::invalid(format!(
                    "edge {id:?} refers to a missing vertex"
                )));
            };
            if (a - b).norm() <= ALMOST_ZERO {
                return Err(GeometryError::invalid(format!("edge {id:?} has zero length")));
            }
        }
        Ok(())
    }

    fn check_loops(&self) -> GeometryResult<()> {
        for (f, face) in self.faces.iter() {
            let n = face.boundary.len();
            if n < 3 {
                return Err(GeometryError::invalid(format!(
                    "face {f:?} has {n} edges"
                )));
            }
            let distinct: HashSet<EdgeId> = face.boundary.iter().copied().collect();
            if distinct.len() != n {
                return Err(GeometryError::invalid(format!(
                    "face {f:?} repeats an edge"
                )));
            }
            for i in 0..n {
                let edge = self.edge_or_invalid(face.boundary[i])?;
                let next = self.edge_or_invalid(face.boundary[(i + 1) % n])?;
                if edge.left != Some(f) && edge.right != Some(f) {
                    return Err(GeometryError::invalid(format!(
                        "face {f:?} lists an edge that does not refer back to it"
                    )));
                }
                if edge.end_in(f) != next.start_in(f) {
                    return Err(GeometryError::invalid(format!(
                        "face {f:?} boundary is not a closed loop"
                    )));
                }
            }
            let positions: Vec<Vector3<f64>> = self
                .face_vertices(f)
                .into_iter()
                .filter_map(|v| self.position(v))
                .collect();
            if newell_normal(&positions).dot(&face.plane.n) <= 0.0 {
                return Err(GeometryError::invalid(format!(
                    "face {f:?} is wound against its normal"
                )));
            }
        }
        Ok(())
    }

    fn check_vertices(&self) -> GeometryResult<()> {
        let mut degree: HashMap<VertexId, usize> = HashMap::new();
        for edge in self.edges.values() {
            *degree.entry(edge.start).or_default() += 1;
            *degree.entry(edge.end).or_default() += 1;
        }
        for id in self.vertices.keys() {
            let d = degree.get(&id).copied().unwrap_or(0);
            if d < 3 {
                return Err(GeometryError::invalid(format!(
                    "vertex {id:?} has degree {d}"
                )));
            }
        }
        let all: Vec<(VertexId, Vector3<f64>)> = self
            .vertices
            .iter()
            .map(|(id, v)| (id, v.position))
            .collect();
        for (i, (a, pa)) in all.iter().enumerate() {
            if let Some((b, _)) = all[i + 1..]
                .iter()
                .find(|(_, pb)| (pa - pb).norm() <= ALMOST_ZERO)
            {
                return Err(GeometryError::invalid(format!(
                    "vertices {a:?} and {b:?} coincide"
                )));
            }
        }
        Ok(())
    }

    fn check_geometry(&self) -> GeometryResult<()> {
        for (f, face) in self.faces.iter() {
            for v in self.face_vertices(f) {
                let Some(p) = self.position(v) else { continue };
                if face.plane.distance(p).abs() > ALMOST_ZERO {
                    return Err(GeometryError::invalid(format!(
                        "vertex {v:?} is off the plane of face {f:?}"
                    )));
                }
            }
            if let Some((v, _)) = self
                .vertices
                .iter()
                .find(|(_, v)| face.plane.distance(v.position) > ALMOST_ZERO)
            {
                return Err(GeometryError::invalid(format!(
                    "vertex {v:?} lies outside face {f:?}: brush is not convex"
                )));
            }
        }
        Ok(())
    }
}

/// Area-weighted normal of a closed polygon (Newell's method).
pub(crate) fn newell_normal(points: &[Vector3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}
