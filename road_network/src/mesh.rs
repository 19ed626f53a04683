//! Triangle meshes of the final surfaces, flat on the ground.

use serde::{Deserialize, Serialize};

use geom::Polygon;

use crate::{JunctionSurface, Piece};

/// Vertex attributes and a triangle list, ready for any renderer. Texture coordinates are
/// anchored to the world, so neighboring surfaces tile without seams.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    /// Counter-clockwise seen from above
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn from_polygon(polygon: &Polygon, texture_scale: f64) -> Mesh {
        let tess = polygon.triangulate(texture_scale);
        Mesh {
            positions: tess
                .points()
                .iter()
                .map(|pt| [pt.x(), pt.y(), 0.0])
                .collect(),
            normals: tess.normals(),
            uvs: tess.uvs().clone(),
            indices: tess.indices().clone(),
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Piece {
    pub fn mesh(&self, texture_scale: f64) -> Mesh {
        Mesh::from_polygon(&self.polygon, texture_scale)
    }
}

impl JunctionSurface {
    pub fn mesh(&self, texture_scale: f64) -> Mesh {
        Mesh::from_polygon(&self.polygon, texture_scale)
    }
}
