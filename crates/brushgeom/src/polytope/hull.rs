//! Supporting planes of a point set (V → H).
//!
//! Enumerates point triples and keeps the planes with every point on one
//! side. Candidates that touch the same set of points describe the same hull
//! face; of those the triple with the largest spanned area wins, which keeps
//! near-coplanar faces from turning into several slightly tilted planes.
//!
//! Complexity: O(N^4). Brushes have few vertices and manipulation is a cold
//! path next to rendering, so the simple enumeration is kept.

use std::collections::HashMap;

use nalgebra::Vector3;

use crate::geom3::cfg::{ALMOST_ZERO, POINT_STATUS_EPS};
use crate::geom3::{centroid, combinations, Hs3};

/// A supporting plane and the indices of the points lying on it.
#[derive(Clone, Debug)]
pub(crate) struct HullFace {
    pub plane: Hs3,
    pub on_plane: Vec<usize>,
}

/// Outcome of the enumeration.
#[derive(Clone, Debug)]
pub(crate) enum Hull {
    Solid(Vec<HullFace>),
    /// Fewer than four points or all points coplanar.
    Flat,
}

pub(crate) fn supporting_planes(points: &[Vector3<f64>]) -> Hull {
    if points.len() < 4 {
        return Hull::Flat;
    }
    let indices: Vec<usize> = (0..points.len()).collect();
    let mut faces: Vec<(f64, HullFace)> = Vec::new();
    let mut by_support: HashMap<Vec<usize>, usize> = HashMap::new();

    for tri in combinations(&indices, 3) {
        let (a, b, c) = (points[tri[0]], points[tri[1]], points[tri[2]]);
        let Some(plane) = Hs3::from_points(a, b, c) else {
            continue;
        };
        let distances: Vec<f64> = points.iter().map(|&p| plane.distance(p)).collect();
        let below = distances.iter().all(|&d| d <= POINT_STATUS_EPS);
        let above = distances.iter().all(|&d| d >= -POINT_STATUS_EPS);
        let plane = match (below, above) {
            (true, true) => return Hull::Flat,
            (true, false) => plane,
            (false, true) => plane.flipped(),
            (false, false) => continue,
        };
        let on_plane: Vec<usize> = distances
            .iter()
            .enumerate()
            .filter(|(_, d)| d.abs() <= POINT_STATUS_EPS)
            .map(|(i, _)| i)
            .collect();
        let area = (b - a).cross(&(c - a)).norm();
        match by_support.get(&on_plane) {
            Some(&slot) => {
                if area > faces[slot].0 {
                    faces[slot] = (area, HullFace { plane, on_plane });
                }
            }
            None => {
                by_support.insert(on_plane.clone(), faces.len());
                faces.push((area, HullFace { plane, on_plane }));
            }
        }
    }

    if faces.len() < 4 {
        return Hull::Flat;
    }
    Hull::Solid(faces.into_iter().map(|(_, face)| face).collect())
}

/// Shape of a point set: what the points of a vertex subset span.
#[derive(Clone, Debug)]
pub(crate) enum Fragment {
    Empty,
    Point,
    Edge,
    Polygon(Hs3),
    Solid(Vec<HullFace>),
}

impl Fragment {
    pub(crate) fn of(points: &[Vector3<f64>]) -> Self {
        let Some(&first) = points.first() else {
            return Fragment::Empty;
        };
        if points.iter().all(|p| (p - first).norm() <= ALMOST_ZERO) {
            return Fragment::Point;
        }
        let indices: Vec<usize> = (0..points.len()).collect();
        let plane = combinations(&indices, 3)
            .into_iter()
            .find_map(|t| Hs3::from_points(points[t[0]], points[t[1]], points[t[2]]));
        let Some(plane) = plane else {
            return Fragment::Edge;
        };
        if points
            .iter()
            .all(|&p| plane.distance(p).abs() <= POINT_STATUS_EPS)
        {
            return Fragment::Polygon(plane);
        }
        match supporting_planes(points) {
            Hull::Solid(faces) => Fragment::Solid(faces),
            Hull::Flat => Fragment::Polygon(plane),
        }
    }

    /// Bounding polygons as (outward plane, corner points). A flat fragment
    /// is bounded by its polygon seen from both sides.
    pub(crate) fn faces(&self, points: &[Vector3<f64>]) -> Vec<(Hs3, Vec<Vector3<f64>>)> {
        match self {
            Fragment::Solid(faces) => faces
                .iter()
                .map(|f| (f.plane, f.on_plane.iter().map(|&i| points[i]).collect()))
                .collect(),
            Fragment::Polygon(plane) => vec![
                (*plane, points.to_vec()),
                (plane.flipped(), points.to_vec()),
            ],
            Fragment::Empty | Fragment::Point | Fragment::Edge => Vec::new(),
        }
    }
}

/// Whether `q`, a point on `plane`, lies in the convex polygon spanned by
/// `corners` (boundary included).
pub(crate) fn polygon_contains(plane: &Hs3, corners: &[Vector3<f64>], q: Vector3<f64>) -> bool {
    let Some(center) = centroid(corners.iter().copied()) else {
        return false;
    };
    let n = plane.n;
    let axis = n.iamin();
    let u = n.cross(&Vector3::ith(axis, 1.0)).normalize();
    let v = n.cross(&u);
    let mut ring: Vec<(f64, Vector3<f64>)> = corners
        .iter()
        .map(|&p| {
            let d = p - center;
            (d.dot(&v).atan2(d.dot(&u)), p)
        })
        .collect();
    ring.sort_by(|a, b| a.0.total_cmp(&b.0));
    if ring.len() < 3 {
        return false;
    }
    (0..ring.len()).all(|i| {
        let a = ring[i].1;
        let b = ring[(i + 1) % ring.len()].1;
        n.dot(&(b - a).cross(&(q - a))) >= -ALMOST_ZERO * (b - a).norm()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn cube_corners(h: f64) -> Vec<Vector3<f64>> {
        (0..8)
            .map(|i| {
                vector![
                    if i & 1 == 0 { -h } else { h },
                    if i & 2 == 0 { -h } else { h },
                    if i & 4 == 0 { -h } else { h }
                ]
            })
            .collect()
    }

    #[test]
    fn cube_has_six_faces_with_four_points_each() {
        let Hull::Solid(faces) = supporting_planes(&cube_corners(8.0)) else {
            panic!("cube is not flat");
        };
        assert_eq!(faces.len(), 6);
        for f in &faces {
            assert_eq!(f.on_plane.len(), 4);
            assert!((f.plane.c - 8.0).abs() < 1e-9);
            assert!(f.plane.aligned_axis().is_some());
        }
    }

    #[test]
    fn coplanar_points_are_flat() {
        let pts = vec![
            vector![0.0, 0.0, 1.0],
            vector![4.0, 0.0, 1.0],
            vector![4.0, 4.0, 1.0],
            vector![0.0, 4.0, 1.0],
            vector![2.0, 2.0, 1.0],
        ];
        assert!(matches!(supporting_planes(&pts), Hull::Flat));
        assert!(matches!(supporting_planes(&pts[..3]), Hull::Flat));
    }

    #[test]
    fn fragments_by_dimension() {
        let cube = cube_corners(8.0);
        assert!(matches!(Fragment::of(&[]), Fragment::Empty));
        assert!(matches!(Fragment::of(&cube[..1]), Fragment::Point));
        assert!(matches!(Fragment::of(&cube[..2]), Fragment::Edge));
        assert!(matches!(Fragment::of(&cube[..4]), Fragment::Polygon(_)));
        let Fragment::Solid(faces) = Fragment::of(&cube) else {
            panic!("cube corners span a solid");
        };
        assert_eq!(faces.len(), 6);
        assert_eq!(Fragment::of(&cube[..4]).faces(&cube[..4]).len(), 2);
        assert!(Fragment::of(&cube[..2]).faces(&cube[..2]).is_empty());
    }

    #[test]
    fn polygon_containment_includes_the_boundary() {
        let square = vec![
            vector![-8.0, -8.0, 8.0],
            vector![8.0, 8.0, 8.0],
            vector![8.0, -8.0, 8.0],
            vector![-8.0, 8.0, 8.0],
        ];
        let plane = Hs3::axis(2, 1.0, 8.0);
        assert!(polygon_contains(&plane, &square, vector![1.6, 1.6, 8.0]));
        assert!(polygon_contains(&plane, &square, vector![8.0, 0.0, 8.0]));
        assert!(!polygon_contains(&plane, &square, vector![8.5, 0.0, 8.0]));
        assert!(polygon_contains(&plane.flipped(), &square, vector![-3.0, 7.0, 8.0]));
        assert!(!polygon_contains(&plane.flipped(), &square, vector![-3.0, 9.0, 8.0]));
    }

    #[test]
    fn tetrahedron_planes_are_outward() {
        let pts = vec![
            vector![0.0, 0.0, 0.0],
            vector![8.0, 0.0, 0.0],
            vector![0.0, 8.0, 0.0],
            vector![0.0, 0.0, 8.0],
        ];
        let Hull::Solid(faces) = supporting_planes(&pts) else {
            panic!("tetrahedron is not flat");
        };
        assert_eq!(faces.len(), 4);
        let inside = vector![1.0, 1.0, 1.0];
        for f in &faces {
            assert!(f.plane.distance(inside) < 0.0);
        }
    }
}
