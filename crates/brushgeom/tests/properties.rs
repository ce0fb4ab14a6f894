//! Property-based tests for brush operations.
//!
//! Brushes come from `draw_brush`; proptest picks the replay token and the
//! cutting planes. A brush the generator cannot produce fails the case.
//!
//! Run with: cargo test -p brushgeom --test properties

use brushgeom::api::{
    clip, draw_brush, FaceCount, HalfSpace, Hs3, Intersection, MoveOutcome, Polytope, RandomBrushCfg,
    ReplayToken,
};
use nalgebra::Vector3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_token() -> impl Strategy<Value = ReplayToken> {
    (any::<u64>(), 0u64..1_000).prop_map(|(seed, index)| ReplayToken::new(seed, index))
}

fn arb_direction() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-1.0..1.0f64)
        .prop_filter("direction too short", |[x, y, z]| {
            Vector3::new(*x, *y, *z).norm() > 0.1
        })
        .prop_map(|[x, y, z]| Vector3::new(x, y, z).normalize())
}

fn small_brushes() -> RandomBrushCfg {
    RandomBrushCfg {
        face_count: FaceCount::Uniform { min: 3, max: 10 },
        ..RandomBrushCfg::default()
    }
}

fn brush(tok: ReplayToken) -> Result<Polytope<usize>, TestCaseError> {
    draw_brush(&small_brushes(), tok)
        .map_err(|err| TestCaseError::fail(format!("{tok:?}: {err}")))
}

fn sorted(mut points: Vec<Vector3<f64>>) -> Vec<Vector3<f64>> {
    points.sort_by(|a, b| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    points
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_brushes_are_closed_and_convex(tok in arb_token()) {
        let p = brush(tok)?;
        prop_assert!(p.is_closed());
        prop_assert!(p.check_invariants().is_ok());
        // Euler characteristic of a convex solid.
        let euler = p.vertex_count() as i64 - p.edge_count() as i64 + p.face_count() as i64;
        prop_assert_eq!(euler, 2);
        for v in p.vertex_positions() {
            for (plane, _) in p.planes() {
                prop_assert!(plane.distance(v) <= 1e-3);
            }
        }
    }

    #[test]
    fn existing_face_planes_are_redundant(tok in arb_token()) {
        let p = brush(tok)?;
        let hs: Vec<HalfSpace<usize>> = p
            .planes()
            .into_iter()
            .map(|(plane, _)| HalfSpace::new(plane, usize::MAX))
            .collect();
        let mut again = p.clone();
        let result = again.add_faces(&hs).unwrap();
        prop_assert_eq!(result.outcome, Intersection::Unchanged);
        prop_assert!(result.added.is_empty());
        prop_assert_eq!(again.vertex_count(), p.vertex_count());
        prop_assert_eq!(again.face_count(), p.face_count());
    }

    #[test]
    fn clip_parts_cover_the_original_vertices(
        tok in arb_token(),
        n in arb_direction(),
        offset in -20.0..20.0f64,
    ) {
        let p = brush(tok)?;
        let plane = Hs3::new(n, offset)
            .ok_or_else(|| TestCaseError::fail("unit normal rejected"))?;
        let parts = clip(&p, &HalfSpace::new(plane, usize::MAX))
            .map_err(|err| TestCaseError::fail(format!("clip failed: {err}")))?;
        let mut merged = Vec::new();
        for part in [&parts.front, &parts.back].into_iter().flatten() {
            prop_assert!(part.check_invariants().is_ok());
            merged.extend(part.vertex_positions());
        }
        for v in p.vertex_positions() {
            let status = plane.distance(v);
            // Vertices close to the cut may be snapped away by the tolerance band.
            if status.abs() > 1e-3 {
                prop_assert!(merged.iter().any(|m| (m - v).norm() < 1e-3));
            }
        }
        if let Some(back) = &parts.back {
            for v in back.vertex_positions() {
                prop_assert!(plane.distance(v) <= 1e-3);
            }
        }
        if let Some(front) = &parts.front {
            for v in front.vertex_positions() {
                prop_assert!(plane.distance(v) >= -1e-3);
            }
        }
    }

    #[test]
    fn dry_runs_never_mutate(
        tok in arb_token(),
        pick in any::<prop::sample::Index>(),
        delta in prop::array::uniform3(-24.0..24.0f64),
    ) {
        let p = brush(tok)?;
        let positions = p.vertex_positions();
        let vertex = positions[pick.index(positions.len())];
        let delta = Vector3::new(delta[0], delta[1], delta[2]);
        let world = *p.world_bounds();
        let before = sorted(p.vertex_positions());

        let _ = p.can_move_vertices(&world, &[vertex], delta);
        prop_assert_eq!(sorted(p.vertex_positions()), before.clone());
        let _ = p.can_snap_vertices(&world, &[vertex], 8.0);
        prop_assert_eq!(sorted(p.vertex_positions()), before.clone());
        let _ = p.can_remove_vertices(&world, &[vertex]);
        prop_assert_eq!(sorted(p.vertex_positions()), before);
    }

    #[test]
    fn accepted_vertex_moves_keep_a_valid_brush(
        tok in arb_token(),
        pick in any::<prop::sample::Index>(),
        delta in prop::array::uniform3(-24.0..24.0f64),
    ) {
        let mut p = brush(tok)?;
        let positions = p.vertex_positions();
        let vertex = positions[pick.index(positions.len())];
        let delta = Vector3::new(delta[0], delta[1], delta[2]);
        let world = *p.world_bounds();
        let predicted = p.can_move_vertices(&world, &[vertex], delta);
        let before = p.clone();
        match p.move_vertices(&world, &[vertex], delta) {
            Ok(result) if result.outcome == MoveOutcome::Moved => {
                prop_assert!(predicted);
                prop_assert!(p.check_invariants().is_ok());
                prop_assert!(p.is_closed());
            }
            _ => {
                prop_assert!(!predicted);
                prop_assert_eq!(sorted(p.vertex_positions()), sorted(before.vertex_positions()));
            }
        }
    }

    #[test]
    fn removed_half_spaces_can_be_added_back(
        tok in arb_token(),
        pick in any::<prop::sample::Index>(),
    ) {
        let p = brush(tok)?;
        let faces = p.faces();
        let face = &faces[pick.index(faces.len())];
        let half_space = HalfSpace::new(face.plane, face.attribs.copied().unwrap_or(usize::MAX));
        let mut opened = p.clone();
        opened
            .remove_faces(&[face.vertices.clone()])
            .map_err(|err| TestCaseError::fail(format!("remove failed: {err}")))?;
        prop_assert!(opened.check_invariants().is_ok());
        opened
            .add_faces(&[half_space])
            .map_err(|err| TestCaseError::fail(format!("add failed: {err}")))?;
        prop_assert!(opened.is_closed());
        prop_assert_eq!(opened.vertex_count(), p.vertex_count());
        for v in p.vertex_positions() {
            prop_assert!(opened.vertex_positions().iter().any(|w| (w - v).norm() < 1e-2));
        }
    }
}
