use std::fmt;

use anyhow::Result;
use geo::{Area, BooleanOps, Contains, ConvexHull};
use serde::{Deserialize, Serialize};

use crate::{Bounds, PolyLine, Pt2D, Ring, Tessellation};

/// A simple polygon without holes. The points form a closed ring (the first point is repeated
/// at the end), oriented counter-clockwise.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub struct Polygon {
    points: Vec<Pt2D>,
}

impl Polygon {
    pub fn from_ring(ring: Ring) -> Polygon {
        Polygon {
            points: ring.into_ccw().into_points(),
        }
    }

    // TODO Last result when we've got something that isn't a valid Ring, but want to keep it
    // anyway. Only the convex hull fallbacks should need this.
    pub fn buggy_new(mut points: Vec<Pt2D>) -> Polygon {
        assert!(points.len() >= 3);
        if points[0] != *points.last().unwrap() {
            points.push(points[0]);
        }
        if crate::clip::signed_area(&points[0..points.len() - 1]) < 0.0 {
            points.reverse();
        }
        Polygon { points }
    }

    /// Builds the polygon between two sides running the same direction, like the left and
    /// right boundaries of a thickened polyline.
    pub fn from_sides(left: &PolyLine, right: &PolyLine) -> Result<Polygon> {
        let mut pts = left.points().clone();
        pts.extend(right.reversed().into_points());
        Ok(Ring::deduping_new(pts)?.into_polygon())
    }

    /// The points of the closed ring. The first point is repeated at the end.
    pub fn points(&self) -> &Vec<Pt2D> {
        &self.points
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.points
    }

    pub fn get_outer_ring(&self) -> Result<Ring> {
        Ring::new(self.points.clone())
    }

    /// True if the boundary never touches itself.
    pub fn is_simple(&self) -> bool {
        self.get_outer_ring()
            .map(|ring| ring.is_simple())
            .unwrap_or(false)
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.points)
    }

    /// The area-weighted centroid.
    pub fn center(&self) -> Pt2D {
        crate::clip::polygon_centroid(&self.points[0..self.points.len() - 1])
            .unwrap_or(self.points[0])
    }

    /// Does this polygon contain the point in its interior?
    pub fn contains_pt(&self, pt: Pt2D) -> bool {
        self.to_geo().contains(&geo::Point::from(pt))
    }

    /// Usually m^2
    pub fn area(&self) -> f64 {
        // Don't use signed_area, since buggy_new polygons may have any orientation
        self.to_geo().unsigned_area()
    }

    /// The parts of this polygon outside the other one. A part with a hole can't be represented,
    /// so it's left out.
    pub fn difference(&self, other: &Polygon) -> Vec<Polygon> {
        self.to_geo()
            .difference(&other.to_geo())
            .into_iter()
            .filter(|p| p.interiors().is_empty() && p.exterior().0.len() >= 4)
            .map(Polygon::from)
            .collect()
    }

    /// The area shared by two polygons.
    pub fn intersection_area(&self, other: &Polygon) -> f64 {
        self.to_geo()
            .intersection(&other.to_geo())
            .unsigned_area()
    }

    /// The smallest convex polygon containing every point.
    pub fn convex_hull(pts: &[Pt2D]) -> Result<Polygon> {
        let mp: geo::MultiPoint = pts.iter().map(|pt| geo::Point::from(*pt)).collect();
        let hull = Polygon::from(mp.convex_hull());
        if hull.points.len() < 4 || hull.area() == 0.0 {
            bail!("Convex hull of {} points is degenerate", pts.len());
        }
        Ok(hull)
    }

    pub fn triangulate(&self, texture_scale: f64) -> Tessellation {
        Tessellation::from_polygon(self, texture_scale)
    }

    /// Produces a GeoJSON polygon in world-space.
    pub fn to_geojson(&self) -> geojson::Geometry {
        let pts: Vec<Vec<f64>> = self
            .points
            .iter()
            .map(|pt| vec![pt.x(), pt.y()])
            .collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![pts]))
    }

    // A less verbose way of invoking the From/Into impl. Note this hides a clone.
    pub fn to_geo(&self) -> geo::Polygon {
        self.clone().into()
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Polygon with {} points", self.points.len())?;
        for (idx, pt) in self.points.iter().enumerate() {
            writeln!(f, "  {}: {}", idx, pt)?;
        }
        Ok(())
    }
}

// Holes are ignored.
impl From<geo::Polygon> for Polygon {
    fn from(poly: geo::Polygon) -> Self {
        let (exterior, _) = poly.into_inner();
        let pts: Vec<Pt2D> = exterior.into_iter().map(Pt2D::from).collect();
        match Ring::new(pts.clone()) {
            Ok(ring) => Polygon::from_ring(ring),
            Err(_) => Polygon { points: pts },
        }
    }
}

impl From<Polygon> for geo::Polygon {
    fn from(poly: Polygon) -> Self {
        let exterior_coords = poly
            .points
            .into_iter()
            .map(geo::Coordinate::from)
            .collect::<Vec<_>>();
        Self::new(geo::LineString(exterior_coords), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Distance;

    #[test]
    fn thickened_line() {
        let pl = PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)]);
        let poly = pl.make_polygons(Distance::meters(4.0)).unwrap();
        assert!(poly.is_simple());
        assert!((poly.area() - 40.0).abs() < 1e-6);
        assert!(poly.contains_pt(Pt2D::new(5.0, 1.0)));
        assert!(!poly.contains_pt(Pt2D::new(5.0, 3.0)));
        assert_eq!(poly.center(), Pt2D::new(5.0, 0.0));
        assert!(poly.get_outer_ring().unwrap().is_ccw());
    }

    #[test]
    fn overlap_area() {
        let a = PolyLine::must_new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(10.0, 0.0)])
            .make_polygons(Distance::meters(2.0))
            .unwrap();
        let b = PolyLine::must_new(vec![Pt2D::new(5.0, -5.0), Pt2D::new(5.0, 5.0)])
            .make_polygons(Distance::meters(2.0))
            .unwrap();
        assert!((a.intersection_area(&b) - 4.0).abs() < 1e-6);

        let hull = Polygon::convex_hull(&[
            Pt2D::new(0.0, 0.0),
            Pt2D::new(4.0, 0.0),
            Pt2D::new(2.0, 1.0),
            Pt2D::new(4.0, 4.0),
            Pt2D::new(0.0, 4.0),
        ])
        .unwrap();
        assert!((hull.area() - 16.0).abs() < 1e-6);

        // Cutting the crossing road out of the first leaves a square on each side
        let mut parts = a.difference(&b);
        assert_eq!(parts.len(), 2);
        parts.sort_by(|x, y| x.center().x().total_cmp(&y.center().x()));
        assert!((parts[0].area() - 8.0).abs() < 1e-6);
        assert!((parts[1].area() - 8.0).abs() < 1e-6);
        assert!(parts[0].intersection_area(&b) < 1e-6);

        // Nothing's left when the other polygon covers everything
        assert!(hull.difference(&hull).is_empty());
    }
}
