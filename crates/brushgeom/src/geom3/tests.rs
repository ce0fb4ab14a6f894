use super::cfg::{CORRECT_EPS, POINT_STATUS_EPS};
use super::*;
use nalgebra::{vector, Vector3};

#[test]
fn plane_from_points_is_right_handed() {
    let p = Hs3::from_points(
        vector![0.0, 0.0, 4.0],
        vector![1.0, 0.0, 4.0],
        vector![0.0, 1.0, 4.0],
    )
    .unwrap();
    assert!((p.n - Vector3::z()).norm() < 1e-12);
    assert!((p.c - 4.0).abs() < 1e-12);
    assert_eq!(p.aligned_axis(), Some(2));
    assert!((p.axis_value(2) - 4.0).abs() < 1e-12);
}

#[test]
fn plane_from_collinear_points_is_none() {
    assert!(Hs3::from_points(
        vector![0.0, 0.0, 0.0],
        vector![1.0, 1.0, 1.0],
        vector![2.0, 2.0, 2.0]
    )
    .is_none());
}

#[test]
fn status_uses_epsilon_band() {
    let p = Hs3::new(vector![2.0, 0.0, 0.0], 16.0).unwrap();
    assert!((p.c - 8.0).abs() < 1e-12);
    assert_eq!(p.status(vector![9.0, 0.0, 0.0]), PointStatus::Above);
    assert_eq!(p.status(vector![7.0, 0.0, 0.0]), PointStatus::Below);
    assert_eq!(
        p.status(vector![8.0 + POINT_STATUS_EPS * 0.5, 0.0, 0.0]),
        PointStatus::Inside
    );
    assert!(p.flipped().contains(vector![9.0, 0.0, 0.0]));
    assert!(!p.flipped().contains(vector![7.0, 0.0, 0.0]));
}

#[test]
fn translated_plane_moves_with_points() {
    let p = Hs3::axis(1, 1.0, 4.0);
    let q = p.translated(vector![3.0, 2.0, 1.0]);
    assert!((q.c - 6.0).abs() < 1e-12);
    assert!(q.approx_eq(&Hs3::axis(1, 1.0, 6.0)));
}

#[test]
fn correct_only_touches_round_off_tails() {
    let v = correct(vector![3.0 + CORRECT_EPS * 0.1, -2.5, 7.0 - CORRECT_EPS * 0.5]);
    assert_eq!(v, vector![3.0, -2.5, 7.0]);
    let w = correct(vector![0.01, 0.0, 0.0]);
    assert_eq!(w.x, 0.01);
}

#[test]
fn snap_to_grid_rounds_components() {
    assert_eq!(snap_to_grid(vector![3.9, -4.2, 12.0], 8.0), vector![0.0, -8.0, 16.0]);
    assert_eq!(snap_to_grid(vector![1.5, 0.0, 0.0], 0.0), vector![1.5, 0.0, 0.0]);
}

#[test]
fn bbox_corners_and_half_spaces() {
    let b = BBox3::cube(8.0);
    assert_eq!(b.corner(0), vector![-8.0, -8.0, -8.0]);
    assert_eq!(b.corner(7), vector![8.0, 8.0, 8.0]);
    assert_eq!(b.corner(5), vector![8.0, -8.0, 8.0]);
    for hs in b.half_spaces() {
        for i in 0..8 {
            assert!(hs.contains(b.corner(i)));
        }
        assert!(!hs.contains(b.center() + hs.n * 9.0));
    }
    assert!(b.contains(&BBox3::cube(4.0)));
    assert!(!BBox3::cube(4.0).contains(&b));
}

#[test]
fn combinations_enumerate_all_subsets() {
    let c = combinations(&[0usize, 1, 2, 3], 3);
    assert_eq!(c.len(), 4);
    assert_eq!(c[0], vec![0, 1, 2]);
    assert_eq!(c[3], vec![1, 2, 3]);
    assert!(combinations(&[0usize, 1], 3).is_empty());
    assert_eq!(combinations(&[7usize], 1), vec![vec![7]]);
}
