//! Random convex brushes (tangent planes of a sphere, replay tokens).
//!
//! Purpose
//! - Reproducible brushes for property tests and benchmarks. Every draw is a
//!   function of `(cfg, ReplayToken)`; the same token yields the same brush.
//!
//! Model
//! - Start from the cube `[-half_extent, half_extent]³` (so the brush is
//!   bounded even with few planes), then add `n` planes `u·x <= r` with `u`
//!   uniform on the sphere and `r` uniform in `[radius_min, radius_max]`.
//! - Directions closer than `min_angle_deg` to an earlier one are redrawn,
//!   which keeps sliver faces out.
//! - Optional grid snapping rounds each plane offset to a multiple of `grid`.
//! - A draw that fails the invariant check is redrawn from the same RNG a
//!   bounded number of times.
//!
//! Face attributes are the plane index: `0..6` for the bounding cube, then
//! `6..` for the random planes in draw order.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::trace;

use crate::error::GeometryError;
use crate::geom3::{BBox3, Hs3};
use crate::polytope::{HalfSpace, Polytope};

const MAX_ATTEMPTS: usize = 16;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid generator params: {reason}")]
    InvalidParams { reason: String },
    #[error("no valid brush after {attempts} attempts: {last}")]
    Degenerate {
        attempts: usize,
        last: GeometryError,
    },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl GeneratorError {
    fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParams {
            reason: reason.into(),
        }
    }
}

/// Number of random planes per brush.
#[derive(Clone, Copy, Debug)]
pub enum FaceCount {
    Fixed(usize),
    Uniform { min: usize, max: usize },
}

impl FaceCount {
    fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        match *self {
            FaceCount::Fixed(n) => n,
            FaceCount::Uniform { min, max } => rng.gen_range(min..=max.max(min)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RandomBrushCfg {
    pub face_count: FaceCount,
    pub radius_min: f64,
    pub radius_max: f64,
    /// Half size of the bounding cube.
    pub half_extent: f64,
    /// Minimum angle between two random normals, in degrees.
    pub min_angle_deg: f64,
    /// Round plane offsets to multiples of this (if set).
    pub grid: Option<f64>,
    pub world_bounds: BBox3,
}

impl Default for RandomBrushCfg {
    fn default() -> Self {
        Self {
            face_count: FaceCount::Uniform { min: 4, max: 14 },
            radius_min: 32.0,
            radius_max: 64.0,
            half_extent: 96.0,
            min_angle_deg: 5.0,
            grid: None,
            world_bounds: BBox3::cube(4096.0),
        }
    }
}

impl RandomBrushCfg {
    fn validate(&self) -> Result<(), GeneratorError> {
        if !(self.radius_min.is_finite() && self.radius_max.is_finite()) {
            return Err(GeneratorError::invalid("radius bounds must be finite"));
        }
        if self.radius_min <= 0.0 {
            return Err(GeneratorError::invalid("radius_min must be > 0"));
        }
        if self.radius_min > self.radius_max {
            return Err(GeneratorError::invalid("radius_min <= radius_max required"));
        }
        if !(0.0..=30.0).contains(&self.min_angle_deg) {
            return Err(GeneratorError::invalid("min_angle_deg must be in [0, 30]"));
        }
        if !(self.half_extent > self.radius_min) {
            return Err(GeneratorError::invalid("half_extent must exceed radius_min"));
        }
        if !self.world_bounds.contains(&BBox3::cube(self.half_extent)) {
            return Err(GeneratorError::invalid("bounding cube leaves the world bounds"));
        }
        if let Some(grid) = self.grid {
            if !(grid > 0.0 && grid < self.radius_min) {
                return Err(GeneratorError::invalid("grid must be in (0, radius_min)"));
            }
        }
        Ok(())
    }
}

/// Replay token `(seed, index)` mixed into a single RNG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Draw one random brush.
pub fn draw_brush(cfg: &RandomBrushCfg, tok: ReplayToken) -> Result<Polytope<usize>, GeneratorError> {
    cfg.validate()?;
    let mut rng = tok.to_std_rng();
    let mut last = None;
    for attempt in 0..MAX_ATTEMPTS {
        let hs = draw_half_spaces(cfg, &mut rng);
        match Polytope::from_half_spaces(cfg.world_bounds, &hs) {
            Ok(brush) => return Ok(brush),
            Err(err @ GeometryError::BrushIsInvalid { .. }) => {
                trace!(attempt, error = %err, "redrawing brush");
                last = Some(err);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(GeneratorError::Degenerate {
        attempts: MAX_ATTEMPTS,
        last: last.unwrap_or(GeometryError::BrushIsEmpty),
    })
}

fn draw_half_spaces(cfg: &RandomBrushCfg, rng: &mut StdRng) -> Vec<HalfSpace<usize>> {
    let mut hs: Vec<HalfSpace<usize>> = BBox3::cube(cfg.half_extent)
        .half_spaces()
        .into_iter()
        .enumerate()
        .map(|(i, plane)| HalfSpace::new(plane, i))
        .collect();
    let min_cos = cfg.min_angle_deg.to_radians().cos();
    let n = cfg.face_count.sample(rng);
    // The cube normals take part in the angle check.
    let mut normals: Vec<Vector3<f64>> = hs.iter().map(|h| h.plane.n).collect();
    let target = normals.len() + n;
    while normals.len() < target {
        let u = sample_unit_vector(rng);
        if normals.iter().any(|m| m.dot(&u) > min_cos) {
            continue;
        }
        let mut r = sample_radius(rng, cfg.radius_min, cfg.radius_max);
        if let Some(grid) = cfg.grid {
            r = ((r / grid).round() * grid).max(grid);
        }
        if let Some(plane) = Hs3::new(u, r) {
            hs.push(HalfSpace::new(plane, hs.len()));
            normals.push(u);
        }
    }
    hs
}

fn sample_unit_vector<R: Rng>(rng: &mut R) -> Vector3<f64> {
    loop {
        let v = Vector3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let norm = v.norm();
        // Rejection from the unit ball keeps the direction uniform.
        if norm > 1e-6 && norm <= 1.0 {
            return v / norm;
        }
    }
}

fn sample_radius<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        return min;
    }
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_token_same_brush() {
        let cfg = RandomBrushCfg::default();
        let tok = ReplayToken::new(7, 3);
        let a = draw_brush(&cfg, tok).unwrap();
        let b = draw_brush(&cfg, tok).unwrap();
        assert_eq!(a.vertex_positions(), b.vertex_positions());
        assert_eq!(a.face_count(), b.face_count());
    }

    #[test]
    fn different_indices_differ() {
        let cfg = RandomBrushCfg::default();
        let a = draw_brush(&cfg, ReplayToken::new(7, 0)).unwrap();
        let b = draw_brush(&cfg, ReplayToken::new(7, 1)).unwrap();
        assert_ne!(a.vertex_positions(), b.vertex_positions());
    }

    #[test]
    fn draws_are_valid_closed_brushes() {
        let cfg = RandomBrushCfg {
            grid: Some(1.0),
            ..RandomBrushCfg::default()
        };
        for index in 0..20 {
            let brush = draw_brush(&cfg, ReplayToken::new(42, index)).unwrap();
            brush.check_invariants().unwrap();
            assert!(brush.is_closed());
            assert!(brush.contains_point(Vector3::zeros()));
            assert!(brush.bounds().max.x <= cfg.half_extent + 1e-9);
        }
    }

    #[test]
    fn rejects_inverted_radii() {
        let cfg = RandomBrushCfg {
            radius_min: 10.0,
            radius_max: 5.0,
            ..RandomBrushCfg::default()
        };
        assert!(matches!(
            draw_brush(&cfg, ReplayToken::new(0, 0)),
            Err(GeneratorError::InvalidParams { .. })
        ));
    }
}
