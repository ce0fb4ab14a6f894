//! Small utilities: round-off correction, grid snapping, combinations.

use nalgebra::Vector3;

use super::cfg::CORRECT_EPS;

/// Snap each coordinate to the nearest integer when it is within `CORRECT_EPS`.
pub fn correct(v: Vector3<f64>) -> Vector3<f64> {
    v.map(correct_scalar)
}

#[inline]
pub(crate) fn correct_scalar(x: f64) -> f64 {
    let r = x.round();
    if (x - r).abs() < CORRECT_EPS {
        r
    } else {
        x
    }
}

/// Round `v` to the nearest multiple of `grid` (component-wise).
pub fn snap_to_grid(v: Vector3<f64>, grid: f64) -> Vector3<f64> {
    if grid <= 0.0 {
        return v;
    }
    v.map(|x| (x / grid).round() * grid)
}

/// k-combinations of items (lexicographic).
pub(crate) fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    let n = items.len();
    if k > n || k == 0 {
        return Vec::new();
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    let mut out = Vec::new();
    loop {
        out.push(idxs.iter().map(|&i| items[i]).collect());
        // rightmost index that can still advance
        let Some(i) = (0..k).rev().find(|&i| idxs[i] != i + n - k) else {
            break;
        };
        idxs[i] += 1;
        for j in i + 1..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
    out
}

/// Arithmetic mean; `None` for an empty input.
pub(crate) fn centroid<I: IntoIterator<Item = Vector3<f64>>>(points: I) -> Option<Vector3<f64>> {
    let mut sum = Vector3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}
