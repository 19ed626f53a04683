use crate::{Bounds, Polygon, Pt2D};

// Deliberately not serializable
/// A triangulated polygon, ready for a mesh consumer. Texture coordinates are anchored to the
/// world, so adjacent surfaces tile seamlessly no matter how they're cut up.
#[derive(Clone, Debug)]
pub struct Tessellation {
    /// These points aren't in any meaningful order. It's not generally possible to reconstruct a
    /// `Polygon` from this.
    points: Vec<Pt2D>,
    /// Groups of three indices make up the triangles, wound counter-clockwise
    indices: Vec<u32>,
    uvs: Vec<[f64; 2]>,
}

#[derive(Clone, Debug)]
pub struct Triangle {
    pub pt1: Pt2D,
    pub pt2: Pt2D,
    pub pt3: Pt2D,
}

impl Tessellation {
    /// `texture_scale` is how many meters one texture repeat covers.
    pub fn from_polygon(polygon: &Polygon, texture_scale: f64) -> Tessellation {
        // Earcut wants an open ring
        let mut points = polygon.points().clone();
        points.pop();

        let mut vertices = Vec::new();
        for pt in &points {
            vertices.push(pt.x());
            vertices.push(pt.y());
        }
        // A polygon earcut can't handle just covers nothing
        let mut indices: Vec<u32> = earcutr::earcut(&vertices, &[], 2)
            .unwrap_or_default()
            .into_iter()
            .map(|idx| idx as u32)
            .collect();
        // Earcut doesn't promise any winding; normals point up, so force counter-clockwise
        for tri in indices.chunks_exact_mut(3) {
            let (a, b, c) = (
                points[tri[0] as usize],
                points[tri[1] as usize],
                points[tri[2] as usize],
            );
            if crate::clip::signed_area(&[a, b, c]) < 0.0 {
                tri.swap(1, 2);
            }
        }

        let uvs = points
            .iter()
            .map(|pt| [pt.x() / texture_scale, pt.y() / texture_scale])
            .collect();

        Tessellation {
            points,
            indices,
            uvs,
        }
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.points
    }

    pub fn indices(&self) -> &Vec<u32> {
        &self.indices
    }

    pub fn uvs(&self) -> &Vec<[f64; 2]> {
        &self.uvs
    }

    /// Every surface is flat on the ground, so every normal points straight up.
    pub fn normals(&self) -> Vec<[f64; 3]> {
        vec![[0.0, 0.0, 1.0]; self.points.len()]
    }

    pub fn triangles(&self) -> Vec<Triangle> {
        let mut triangles: Vec<Triangle> = Vec::new();
        for slice in self.indices.chunks_exact(3) {
            triangles.push(Triangle {
                pt1: self.points[slice[0] as usize],
                pt2: self.points[slice[1] as usize],
                pt3: self.points[slice[2] as usize],
            });
        }
        triangles
    }

    /// The total area covered by the triangles.
    pub fn area(&self) -> f64 {
        self.triangles()
            .into_iter()
            .map(|tri| crate::clip::signed_area(&[tri.pt1, tri.pt2, tri.pt3]).abs())
            .sum()
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_xorshift::XorShiftRng;

    use super::*;
    use crate::{Distance, PolyLine};

    #[test]
    fn world_anchored_uvs() {
        let poly = PolyLine::must_new(vec![Pt2D::new(100.0, 0.0), Pt2D::new(120.0, 0.0)])
            .make_polygons(Distance::meters(4.0))
            .unwrap();
        let mesh = poly.triangulate(4.0);
        assert_eq!(mesh.triangles().len(), 2);
        assert!((mesh.area() - poly.area()).abs() < 1e-6);
        for (pt, uv) in mesh.points().iter().zip(mesh.uvs()) {
            assert_eq!(uv[0], pt.x() / 4.0);
            assert_eq!(uv[1], pt.y() / 4.0);
        }
        for tri in mesh.triangles() {
            assert!(crate::clip::signed_area(&[tri.pt1, tri.pt2, tri.pt3]) > 0.0);
        }
        assert!(mesh.normals().iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn random_hulls_are_fully_covered() {
        let mut rng = XorShiftRng::seed_from_u64(7);
        for _ in 0..100 {
            let pts: Vec<Pt2D> = (0..rng.gen_range(3..12))
                .map(|_| Pt2D::new(rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0)))
                .collect();
            let hull = match Polygon::convex_hull(&pts) {
                Ok(hull) => hull,
                Err(_) => continue,
            };
            let mesh = hull.triangulate(4.0);
            assert_eq!(mesh.triangles().len(), hull.points().len() - 3);
            assert!((mesh.area() - hull.area()).abs() < 1e-6 * hull.area().max(1.0));
        }
    }
}
