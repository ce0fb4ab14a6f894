//! Print counts of a few random brushes, then clip each through the origin.
//!
//! Usage:
//!   cargo run -p brushgeom --example random_brushes -- 8
//!
//! The argument is the number of random planes per brush (default 6).

use brushgeom::api::{clip, draw_brush, FaceCount, HalfSpace, Hs3, RandomBrushCfg, ReplayToken};

fn main() {
    let faces = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(6);
    let cfg = RandomBrushCfg {
        face_count: FaceCount::Fixed(faces),
        grid: Some(1.0),
        ..RandomBrushCfg::default()
    };
    let cut = HalfSpace::new(Hs3::axis(2, 1.0, 0.0), usize::MAX);
    for index in 0..5 {
        let brush = match draw_brush(&cfg, ReplayToken::new(2025, index)) {
            Ok(b) => b,
            Err(err) => {
                eprintln!("sample {index}: {err}");
                continue;
            }
        };
        print!(
            "sample {index}: V={}, E={}, F={}",
            brush.vertex_count(),
            brush.edge_count(),
            brush.face_count()
        );
        match clip(&brush, &cut) {
            Ok(parts) => println!(
                "  clip z<=0: back F={:?} front F={:?}",
                parts.back.map(|p| p.face_count()),
                parts.front.map(|p| p.face_count())
            ),
            Err(err) => println!("  clip failed: {err}"),
        }
    }
}
