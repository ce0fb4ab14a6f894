use anyhow::{Context, Result};
use brushgeom::api::{clip, tolerances, HalfSpace, Hs3, MoveOutcome};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::fmt::SubscriberBuilder;

mod doc;
mod provenance;

use doc::{arr, vec3, BrushDoc, BrushOut, TexAttribs};

#[derive(Parser)]
#[command(name = "brush-cli")]
#[command(about = "Build, clip and edit convex brushes from JSON documents")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Intersect the document's faces and write the resulting solid
    Build {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Slice the brush by `nx,ny,nz,c` (keeps n·x <= c as `back`)
    Clip {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_parser = parse_plane, allow_hyphen_values = true)]
        plane: [f64; 4],
        /// Texture of the two new faces
        #[arg(long, default_value = "clip")]
        texture: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Drag vertices `x,y,z` by `dx,dy,dz`
    MoveVertices {
        #[arg(long)]
        input: PathBuf,
        #[arg(long = "vertex", value_parser = parse_point, allow_hyphen_values = true, required = true)]
        vertices: Vec<[f64; 3]>,
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        delta: [f64; 3],
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Build { input, out } => build(input, out),
        Action::Clip {
            input,
            plane,
            texture,
            out,
        } => clip_brush(input, plane, texture, out),
        Action::MoveVertices {
            input,
            vertices,
            delta,
            out,
        } => move_vertices(input, vertices, delta, out),
        Action::Report => report(),
    }
}

fn build(input: PathBuf, out: PathBuf) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), "build");
    let brush = BrushDoc::load(&input)?.build()?;
    let result = BrushOut::from(&brush);
    tracing::info!(
        vertices = brush.vertex_count(),
        edges = brush.edge_count(),
        faces = brush.face_count(),
        closed = result.closed,
        "brush built"
    );
    doc::write_json(&out, &result)?;
    provenance::write_sidecar(&out, &input, json!({ "command": "build" }))?;
    Ok(())
}

fn clip_brush(input: PathBuf, plane: [f64; 4], texture: String, out: PathBuf) -> Result<()> {
    tracing::info!(input = %input.display(), ?plane, texture, "clip");
    let brush = BrushDoc::load(&input)?.build()?;
    let cut = Hs3::new(vec3([plane[0], plane[1], plane[2]]), plane[3])
        .context("cutting plane has a zero normal")?;
    let attribs = TexAttribs {
        texture: texture.clone(),
        offset: [0.0, 0.0],
        scale: [1.0, 1.0],
        rotation: 0.0,
    };
    let parts = clip(&brush, &HalfSpace::new(cut, attribs)).context("clipping brush")?;
    tracing::info!(
        front = parts.front.is_some(),
        back = parts.back.is_some(),
        "brush clipped"
    );
    let result = json!({
        "front": parts.front.as_ref().map(BrushOut::from),
        "back": parts.back.as_ref().map(BrushOut::from),
    });
    doc::write_json(&out, &result)?;
    provenance::write_sidecar(
        &out,
        &input,
        json!({ "command": "clip", "plane": plane, "texture": texture }),
    )?;
    Ok(())
}

fn move_vertices(
    input: PathBuf,
    vertices: Vec<[f64; 3]>,
    delta: [f64; 3],
    out: PathBuf,
) -> Result<()> {
    tracing::info!(input = %input.display(), count = vertices.len(), ?delta, "move-vertices");
    let mut brush = BrushDoc::load(&input)?.build()?;
    let world = *brush.world_bounds();
    let positions: Vec<_> = vertices.iter().map(|v| vec3(*v)).collect();
    let moved = brush
        .move_vertices(&world, &positions, vec3(delta))
        .context("moving vertices")?;
    let outcome = match moved.outcome {
        MoveOutcome::Moved => "moved",
        MoveOutcome::BrushIsEmpty => "brush_is_empty",
    };
    tracing::info!(outcome, survived = moved.new_vertex_positions.len(), "vertices moved");
    let result = json!({
        "outcome": outcome,
        "new_vertex_positions": moved.new_vertex_positions.iter().map(|v| arr(*v)).collect::<Vec<_>>(),
        "brush": BrushOut::from(&brush),
    });
    doc::write_json(&out, &result)?;
    provenance::write_sidecar(
        &out,
        &input,
        json!({ "command": "move-vertices", "vertices": vertices, "delta": delta }),
    )?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "brushgeom": brushgeom::VERSION,
        "tolerances": {
            "point_status_eps": tolerances::POINT_STATUS_EPS,
            "almost_zero": tolerances::ALMOST_ZERO,
            "correct_eps": tolerances::CORRECT_EPS,
        },
        "default_world_half": doc::DEFAULT_WORLD_HALF,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

fn parse_floats<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {N} comma-separated numbers, got {}", parts.len()));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number {part:?}: {e}"))?;
        if !slot.is_finite() {
            return Err(format!("{part:?} is not finite"));
        }
    }
    Ok(out)
}

fn parse_point(s: &str) -> Result<[f64; 3], String> {
    parse_floats::<3>(s)
}

fn parse_plane(s: &str) -> Result<[f64; 4], String> {
    parse_floats::<4>(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_comma_separated_points() {
        assert_eq!(parse_point("1, -2.5,3").unwrap(), [1.0, -2.5, 3.0]);
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("1,2,x").is_err());
        assert!(parse_plane("0,0,1,inf").is_err());
    }

    #[test]
    fn cli_accepts_negative_vectors() {
        let cmd = Cmd::try_parse_from([
            "brush-cli",
            "move-vertices",
            "--input",
            "in.json",
            "--vertex",
            "-16,-16,-16",
            "--vertex",
            "16,16,16",
            "--delta",
            "-4,0,0",
            "--out",
            "out.json",
        ])
        .unwrap();
        match cmd.action {
            Action::MoveVertices {
                vertices, delta, ..
            } => {
                assert_eq!(vertices, vec![[-16.0, -16.0, -16.0], [16.0, 16.0, 16.0]]);
                assert_eq!(delta, [-4.0, 0.0, 0.0]);
            }
            _ => panic!("wrong subcommand"),
        }
    }

    fn write_cube(dir: &std::path::Path) -> PathBuf {
        let faces: Vec<_> = (0..3)
            .flat_map(|axis| {
                [-1.0, 1.0].map(|sign| {
                    let mut n = [0.0; 3];
                    n[axis] = sign;
                    json!({"normal": n, "distance": 16.0, "texture": format!("t{axis}")})
                })
            })
            .collect();
        let input = dir.join("cube.json");
        std::fs::write(&input, serde_json::to_vec(&json!({ "faces": faces })).unwrap()).unwrap();
        input
    }

    #[test]
    fn clip_writes_both_halves_and_a_sidecar() {
        let dir = tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("clip.json");
        clip_brush(input, [1.0, 0.0, 0.0, 4.0], "cut".into(), out.clone()).unwrap();

        let result: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        let back: BrushOut = serde_json::from_value(result["back"].clone()).unwrap();
        let front: BrushOut = serde_json::from_value(result["front"].clone()).unwrap();
        assert_eq!(back.vertices.len(), 8);
        assert_eq!(front.vertices.len(), 8);
        assert!(back.vertices.iter().all(|v| v[0] <= 4.0));
        assert!(dir.path().join("clip.provenance.json").exists());
    }

    #[test]
    fn moving_a_corner_inward_is_reported() {
        let dir = tempdir().unwrap();
        let input = write_cube(dir.path());
        let out = dir.path().join("moved.json");
        move_vertices(input, vec![[16.0, 16.0, 16.0]], [-4.0, -4.0, -4.0], out.clone()).unwrap();

        let result: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        assert_eq!(result["outcome"], "moved");
        assert_eq!(result["new_vertex_positions"][0], json!([12.0, 12.0, 12.0]));
    }
}
