//! Tolerance defaults for 3D brush geometry.
//!
//! Policy
//! - Fixed constants, not runtime knobs. The values are tuned for map-unit
//!   coordinates (integers up to a few ten thousand) in `f64`.
//! - `CORRECT_EPS` must stay below `POINT_STATUS_EPS`: correcting a vertex may
//!   never move it out of the band of the plane it was computed on.

/// Half-width of the "inside the plane" band for point classification.
pub const POINT_STATUS_EPS: f64 = 1e-4;
/// Position equality and invariant checks.
pub const ALMOST_ZERO: f64 = 1e-3;
/// Round-off correction: snap a coordinate to the nearest integer when closer than this.
pub const CORRECT_EPS: f64 = 1e-5;
/// Degenerate cross products (unit vectors) and parallel directions.
pub const COLINEAR_EPS: f64 = 1e-5;
