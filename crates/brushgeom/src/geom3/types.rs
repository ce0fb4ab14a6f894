//! Planes (closed half-spaces) and axis-aligned boxes in R³.
//!
//! - `Hs3`: closed half-space `n·x <= c` with a unit normal.
//! - `BBox3`: axis-aligned box, used for world bounds and brush bounds.

use nalgebra::Vector3;

use super::cfg::{ALMOST_ZERO, COLINEAR_EPS, POINT_STATUS_EPS};

/// Position of a point relative to a plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointStatus {
    /// `n·x > c + eps`: outside the half-space.
    Above,
    /// `n·x < c - eps`: strictly inside.
    Below,
    /// Within the epsilon band around the plane.
    Inside,
}

/// Closed half-space `n · x <= c` in R³.
///
/// Invariants:
/// - `n` has unit length (enforced by the constructors).
/// - The outward normal is `n`: a brush keeps the side `n·x <= c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hs3 {
    pub n: Vector3<f64>,
    pub c: f64,
}

impl Hs3 {
    /// Normalizes `(n, c)`; `None` if `n` is (numerically) zero or not finite.
    pub fn new(n: Vector3<f64>, c: f64) -> Option<Self> {
        let norm = n.norm();
        if !norm.is_finite() || norm <= COLINEAR_EPS || !c.is_finite() {
            return None;
        }
        Some(Self {
            n: n / norm,
            c: c / norm,
        })
    }

    /// Plane through three points; the normal is `(b - a) × (c - a)`.
    ///
    /// Seen from the side the normal points to, `a → b → c` runs counter-clockwise.
    pub fn from_points(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Option<Self> {
        let u = b - a;
        let v = c - a;
        let n = u.cross(&v);
        // Reject slivers relative to the spanning edges, not in absolute terms.
        let scale = u.norm() * v.norm();
        if scale <= 0.0 || n.norm() <= COLINEAR_EPS * scale {
            return None;
        }
        let n = n.normalize();
        Some(Self { n, c: n.dot(&a) })
    }

    /// Axis-aligned half-space: `x_axis <= c` (`sign > 0`) or `x_axis >= -c` (`sign < 0`).
    pub fn axis(axis: usize, sign: f64, c: f64) -> Self {
        let mut n = Vector3::zeros();
        n[axis] = sign.signum();
        Self { n, c }
    }

    #[inline]
    pub fn distance(&self, p: Vector3<f64>) -> f64 {
        self.n.dot(&p) - self.c
    }

    #[inline]
    pub fn status(&self, p: Vector3<f64>) -> PointStatus {
        let d = self.distance(p);
        if d > POINT_STATUS_EPS {
            PointStatus::Above
        } else if d < -POINT_STATUS_EPS {
            PointStatus::Below
        } else {
            PointStatus::Inside
        }
    }

    /// Membership with the classification band (`status != Above`).
    #[inline]
    pub fn contains(&self, p: Vector3<f64>) -> bool {
        self.status(p) != PointStatus::Above
    }

    /// The complementary half-space `-n · x <= -c`.
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            n: -self.n,
            c: -self.c,
        }
    }

    #[inline]
    pub fn translated(&self, delta: Vector3<f64>) -> Self {
        Self {
            n: self.n,
            c: self.c + self.n.dot(&delta),
        }
    }

    /// Same oriented plane within tolerance.
    pub fn approx_eq(&self, other: &Hs3) -> bool {
        (self.n - other.n).norm() < COLINEAR_EPS && (self.c - other.c).abs() < ALMOST_ZERO
    }

    /// Index of the axis the normal is aligned with, if any.
    pub fn aligned_axis(&self) -> Option<usize> {
        (0..3).find(|&i| (self.n[i].abs() - 1.0).abs() < COLINEAR_EPS)
    }

    /// The coordinate every point of an axis-aligned plane has along `axis`.
    #[inline]
    pub fn axis_value(&self, axis: usize) -> f64 {
        self.c / self.n[axis]
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox3 {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BBox3 {
    #[inline]
    pub fn new(min: Vector3<f64>, max: Vector3<f64>) -> Self {
        Self { min, max }
    }

    /// Cube `[-half, half]³`.
    pub fn cube(half: f64) -> Self {
        Self::new(Vector3::repeat(-half), Vector3::repeat(half))
    }

    pub fn from_points<I: IntoIterator<Item = Vector3<f64>>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut bounds = Self::new(first, first);
        for p in it {
            bounds.merge_point(p);
        }
        Some(bounds)
    }

    pub fn merge_point(&mut self, p: Vector3<f64>) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    /// Containment with `ALMOST_ZERO` slack.
    pub fn contains_point(&self, p: Vector3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - ALMOST_ZERO && p[i] <= self.max[i] + ALMOST_ZERO)
    }

    pub fn contains(&self, other: &BBox3) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    #[inline]
    pub fn center(&self) -> Vector3<f64> {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Corner by bit index: bit 0 selects max x, bit 1 max y, bit 2 max z.
    pub fn corner(&self, i: usize) -> Vector3<f64> {
        Vector3::new(
            if i & 1 == 0 { self.min.x } else { self.max.x },
            if i & 2 == 0 { self.min.y } else { self.max.y },
            if i & 4 == 0 { self.min.z } else { self.max.z },
        )
    }

    /// The six bounding half-spaces in the order -x, +x, -y, +y, -z, +z.
    pub fn half_spaces(&self) -> [Hs3; 6] {
        [
            Hs3::axis(0, -1.0, -self.min.x),
            Hs3::axis(0, 1.0, self.max.x),
            Hs3::axis(1, -1.0, -self.min.y),
            Hs3::axis(1, 1.0, self.max.y),
            Hs3::axis(2, -1.0, -self.min.z),
            Hs3::axis(2, 1.0, self.max.z),
        ]
    }
}
