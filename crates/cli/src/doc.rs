//! JSON brush documents read and written by the CLI.
//!
//! Input: `{ "world_bounds"?: {"min": [..], "max": [..]}, "faces": [..] }`
//! where each face is a half-space `normal·x <= distance` plus texture
//! attributes. Output lists the vertices and the faces of the solid, each
//! face with its boundary counter-clockwise seen from outside.

use anyhow::{bail, Context, Result};
use brushgeom::api::{BBox3, HalfSpace, Hs3, Polytope};
use brushgeom::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Quake-family map limit.
pub const DEFAULT_WORLD_HALF: f64 = 65536.0;

/// Texture attributes carried by every face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TexAttribs {
    pub texture: String,
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 2],
    #[serde(default)]
    pub rotation: f64,
}

fn unit_scale() -> [f64; 2] {
    [1.0, 1.0]
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundsDoc {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FaceDoc {
    pub normal: [f64; 3],
    pub distance: f64,
    #[serde(flatten)]
    pub attribs: TexAttribs,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrushDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_bounds: Option<BoundsDoc>,
    pub faces: Vec<FaceDoc>,
}

impl BrushDoc {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn world_bounds(&self) -> Result<BBox3> {
        match self.world_bounds {
            None => Ok(BBox3::cube(DEFAULT_WORLD_HALF)),
            Some(b) => {
                let (min, max) = (vec3(b.min), vec3(b.max));
                if (0..3).any(|i| min[i].is_nan() || min[i] >= max[i]) {
                    bail!("world bounds {:?} are empty", b);
                }
                Ok(BBox3::new(min, max))
            }
        }
    }

    pub fn half_spaces(&self) -> Result<Vec<HalfSpace<TexAttribs>>> {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, face)| {
                let plane = Hs3::new(vec3(face.normal), face.distance)
                    .with_context(|| format!("face {i} has a zero normal"))?;
                Ok(HalfSpace::new(plane, face.attribs.clone()))
            })
            .collect()
    }

    /// Intersect all faces inside the world bounds.
    pub fn build(&self) -> Result<Polytope<TexAttribs>> {
        let world = self.world_bounds()?;
        let hs = self.half_spaces()?;
        Polytope::from_half_spaces(world, &hs).context("building brush")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceOut {
    pub normal: [f64; 3],
    pub distance: f64,
    /// `None` for faces still on the world bounds.
    pub attribs: Option<TexAttribs>,
    pub vertices: Vec<[f64; 3]>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrushOut {
    pub closed: bool,
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<FaceOut>,
}

impl From<&Polytope<TexAttribs>> for BrushOut {
    fn from(p: &Polytope<TexAttribs>) -> Self {
        let faces = p
            .faces()
            .into_iter()
            .map(|f| FaceOut {
                normal: arr(f.plane.n),
                distance: f.plane.c,
                attribs: f.attribs.cloned(),
                vertices: f.vertices.iter().map(|v| arr(*v)).collect(),
            })
            .collect();
        Self {
            closed: p.is_closed(),
            vertices: p.vertex_positions().into_iter().map(arr).collect(),
            faces,
        }
    }
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output dir {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

#[inline]
pub fn vec3(a: [f64; 3]) -> Vec3<f64> {
    Vec3::new(a[0], a[1], a[2])
}

#[inline]
pub fn arr(v: Vec3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}
