use std::collections::HashSet;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::pt::same_vertex;
use crate::{Bounds, Line, Polygon, Pt2D};

/// Maybe a misnomer, but like a PolyLine, but closed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with < 4 points");
        }
        if pts[0] != *pts.last().unwrap() {
            bail!("Can't make a ring with mismatching first/last points");
        }

        if pts.windows(2).any(|pair| same_vertex(pair[0], pair[1])) {
            bail!("Ring has ~dupe adjacent pts");
        }

        let result = Ring { pts };

        let mut seen_pts = HashSet::new();
        for pt in result.pts.iter().skip(1) {
            seen_pts.insert(pt.to_hashable());
        }
        if seen_pts.len() != result.pts.len() - 1 {
            bail!("Ring has repeat non-adjacent points");
        }

        Ok(result)
    }

    /// Closes the list of points by repeating the first, after removing consecutive
    /// duplicates.
    pub fn deduping_new(mut pts: Vec<Pt2D>) -> Result<Ring> {
        pts.dedup_by(|a, b| same_vertex(*a, *b));
        if let (Some(first), Some(last)) = (pts.first().cloned(), pts.last().cloned()) {
            if same_vertex(first, last) {
                pts.pop();
            }
            pts.push(first);
        }
        Ring::new(pts)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn into_points(self) -> Vec<Pt2D> {
        self.pts
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts
            .windows(2)
            .map(|pair| Line::must_new(pair[0], pair[1]))
    }

    /// Positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        crate::clip::signed_area(&self.pts[0..self.pts.len() - 1])
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Returns the same ring, oriented counter-clockwise.
    pub fn into_ccw(self) -> Ring {
        if self.is_ccw() {
            self
        } else {
            let mut pts = self.pts;
            pts.reverse();
            Ring { pts }
        }
    }

    /// True if no two edges touch, except consecutive edges at their shared point. Adjacent
    /// edges doubling back over each other also count as touching.
    pub fn is_simple(&self) -> bool {
        let lines: Vec<Line> = self.lines().collect();
        let n = lines.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    let (first, second) = if j == i + 1 {
                        (&lines[i], &lines[j])
                    } else {
                        (&lines[j], &lines[i])
                    };
                    if doubles_back(first, second) {
                        return false;
                    }
                } else if lines[i].intersects(&lines[j]) {
                    return false;
                }
            }
        }
        true
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.pts)
    }

    pub fn into_polygon(self) -> Polygon {
        Polygon::from_ring(self)
    }
}

// The second line starts where the first ends. True if it heads back along the first.
fn doubles_back(first: &Line, second: &Line) -> bool {
    crate::line::orientation(first.pt1(), first.pt2(), second.pt2()) == 0
        && first.angle().approx_eq(second.angle().opposite(), 1.0)
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_and_orientation() {
        let square = Ring::deduping_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(0.0, 10.0),
        ])
        .unwrap();
        assert!(square.is_simple());
        assert!(square.is_ccw());
        assert_eq!(square.signed_area(), 100.0);

        let bowtie = Ring::deduping_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(0.0, 10.0),
        ])
        .unwrap();
        assert!(!bowtie.is_simple());

        let spike = Ring::deduping_new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(5.0, 0.0),
            Pt2D::new(5.0, 5.0),
        ])
        .unwrap();
        assert!(!spike.is_simple());
    }

    #[test]
    fn rejects_repeats() {
        assert!(Ring::new(vec![Pt2D::new(0.0, 0.0), Pt2D::new(1.0, 0.0), Pt2D::new(0.0, 0.0)])
            .is_err());
    }
}
