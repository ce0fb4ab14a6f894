//! Slice a brush by one plane into a front and a back part.
//!
//! Both parts are independent intersections of a copy of the input: `back`
//! keeps `n·x <= c`, `front` keeps the flipped half-space. A side that
//! would be empty is `None`; a side the plane does not touch is an
//! unchanged copy. The input is never mutated.

use tracing::debug;

use crate::error::GeometryResult;
use crate::polytope::{HalfSpace, Intersection, Polytope};

/// The two parts of a clipped brush.
#[derive(Clone, Debug)]
pub struct ClipResult<A> {
    /// Part on the side the plane normal points to.
    pub front: Option<Polytope<A>>,
    /// Part inside the half-space.
    pub back: Option<Polytope<A>>,
}

/// Clip `polytope` by `cut`; both new faces carry a clone of `cut.attribs`.
pub fn clip<A: Clone>(polytope: &Polytope<A>, cut: &HalfSpace<A>) -> GeometryResult<ClipResult<A>> {
    let back = keep_side(polytope, HalfSpace::new(cut.plane, cut.attribs.clone()))?;
    let front = keep_side(
        polytope,
        HalfSpace::new(cut.plane.flipped(), cut.attribs.clone()),
    )?;
    debug!(
        front = front.is_some(),
        back = back.is_some(),
        "brush clipped"
    );
    Ok(ClipResult { front, back })
}

fn keep_side<A: Clone>(
    polytope: &Polytope<A>,
    half_space: HalfSpace<A>,
) -> GeometryResult<Option<Polytope<A>>> {
    let mut side = polytope.clone();
    let result = side.add_faces(std::slice::from_ref(&half_space))?;
    Ok((result.outcome != Intersection::BrushIsEmpty).then_some(side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom3::{BBox3, Hs3};
    use crate::polytope::special::cuboid;
    use nalgebra::{vector, Vector3};

    fn cube() -> Polytope<&'static str> {
        cuboid(BBox3::cube(4096.0), BBox3::cube(8.0), "wall").unwrap()
    }

    #[test]
    fn plane_outside_the_brush_keeps_it_whole() {
        let p = cube();
        let cut = HalfSpace::new(Hs3::axis(2, 1.0, 100.0), "cut");
        let ClipResult { front, back } = clip(&p, &cut).unwrap();
        assert!(front.is_none());
        let back = back.unwrap();
        assert_eq!(back.vertex_positions(), p.vertex_positions());
        assert!(back.faces().iter().all(|f| f.attribs == Some(&"wall")));
    }

    #[test]
    fn plane_on_a_face_keeps_it_whole() {
        let p = cube();
        let cut = HalfSpace::new(Hs3::axis(0, -1.0, 8.0), "cut");
        let ClipResult { front, back } = clip(&p, &cut).unwrap();
        // x >= -8 contains the cube; the other side is flat.
        assert_eq!(back.unwrap().vertex_count(), 8);
        assert!(front.is_none());
    }

    #[test]
    fn plane_through_the_middle_splits_in_two() {
        let p = cube();
        let cut = HalfSpace::new(Hs3::axis(0, 1.0, 2.0), "cut");
        let ClipResult { front, back } = clip(&p, &cut).unwrap();
        let (front, back) = (front.unwrap(), back.unwrap());

        assert_eq!(back.bounds(), BBox3::new(vector![-8.0, -8.0, -8.0], vector![2.0, 8.0, 8.0]));
        assert_eq!(front.bounds(), BBox3::new(vector![2.0, -8.0, -8.0], vector![8.0, 8.0, 8.0]));
        for part in [&front, &back] {
            assert_eq!(part.vertex_count(), 8);
            assert!(part.is_closed());
            part.check_invariants().unwrap();
            let cut_faces = part
                .faces()
                .into_iter()
                .filter(|f| f.attribs == Some(&"cut"))
                .count();
            assert_eq!(cut_faces, 1);
        }
        assert!(back.has_face(&[
            vector![2.0, -8.0, -8.0],
            vector![2.0, 8.0, -8.0],
            vector![2.0, 8.0, 8.0],
            vector![2.0, -8.0, 8.0]
        ]));
    }

    #[test]
    fn parts_reassemble_the_original_vertices() {
        let p = cube();
        let plane = Hs3::new(vector![1.0, 2.0, -1.0], 3.0).unwrap();
        let ClipResult { front, back } = clip(&p, &HalfSpace::new(plane, "cut")).unwrap();
        let (front, back) = (front.unwrap(), back.unwrap());
        let mut merged: Vec<Vector3<f64>> = front.vertex_positions();
        merged.extend(back.vertex_positions());
        // Every original corner is in one of the parts.
        for v in p.vertex_positions() {
            assert!(merged.iter().any(|m| (m - v).norm() < 1e-6));
        }
        // Everything else lies on the cutting plane.
        for m in &merged {
            let original = p.vertex_positions().iter().any(|v| (m - v).norm() < 1e-6);
            assert!(original || plane.distance(*m).abs() < 1e-6);
        }
    }

    #[test]
    fn clip_does_not_mutate_the_input() {
        let p = cube();
        let before = p.vertex_positions();
        clip(&p, &HalfSpace::new(Hs3::axis(1, 1.0, 0.0), "cut")).unwrap();
        assert_eq!(p.vertex_positions(), before);
    }
}
