use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::pt::same_vertex;
use crate::{Angle, Bounds, Distance, Line, Polygon, Pt2D, EPSILON_DIST};

/// An ordered sequence of points, with no two consecutive points repeating.
#[derive(PartialEq, Serialize, Deserialize, Clone, Debug)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    // Cached, since computing it means summing every line
    length: Distance,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        if pts.windows(2).any(|pair| same_vertex(pair[0], pair[1])) {
            bail!("PolyLine has ~dupe adjacent pts");
        }
        let length = pts.windows(2).fold(Distance::ZERO, |so_far, pair| {
            so_far + pair[0].dist_to(pair[1])
        });
        Ok(PolyLine { pts, length })
    }

    /// Equivalent to `PolyLine::new(pts).unwrap()`. Use this to effectively document an
    /// assertion at the call-site.
    pub fn must_new(pts: Vec<Pt2D>) -> PolyLine {
        PolyLine::new(pts).unwrap()
    }

    /// Removes consecutive repeated points first.
    pub fn deduping_new(mut pts: Vec<Pt2D>) -> Result<PolyLine> {
        pts.dedup_by(|a, b| same_vertex(*a, *b));
        PolyLine::new(pts)
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

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    pub fn first_line(&self) -> Line {
        Line::must_new(self.pts[0], self.pts[1])
    }

    pub fn last_line(&self) -> Line {
        Line::must_new(self.pts[self.pts.len() - 2], self.pts[self.pts.len() - 1])
    }

    pub fn reversed(&self) -> PolyLine {
        let mut pts = self.pts.clone();
        pts.reverse();
        PolyLine {
            pts,
            length: self.length,
        }
    }

    /// Returns the point and direction some distance along the polyline.
    pub fn dist_along(&self, dist_along: Distance) -> Result<(Pt2D, Angle)> {
        if dist_along < Distance::ZERO {
            bail!("dist_along {} is negative", dist_along);
        }
        if dist_along > self.length + EPSILON_DIST {
            bail!(
                "dist_along {} is longer than the polyline ({})",
                dist_along,
                self.length
            );
        }

        let mut dist_left = dist_along;
        let num_lines = self.pts.len() - 1;
        for (idx, l) in self.lines().enumerate() {
            let length = l.length();
            if dist_left <= length || idx == num_lines - 1 {
                let pt = l.unbounded_dist_along(dist_left.min(length));
                return Ok((pt, l.angle()));
            }
            dist_left -= length;
        }
        unreachable!()
    }

    /// Slices the polyline between two distances. The endpoints of the result are exactly
    /// interpolated; interior points are kept untouched.
    pub fn maybe_exact_slice(&self, start: Distance, end: Distance) -> Result<PolyLine> {
        if start < Distance::ZERO || end > self.length + EPSILON_DIST || start >= end {
            bail!(
                "Can't get a polyline slice [{}, {}] from a polyline of length {}",
                start,
                end,
                self.length
            );
        }
        let end = end.min(self.length);

        let mut result: Vec<Pt2D> = Vec::new();
        let mut dist_so_far = Distance::ZERO;
        for line in self.lines() {
            let length = line.length();

            // Does this line contain the first point of the slice?
            if result.is_empty() && dist_so_far + length >= start {
                result.push(line.unbounded_dist_along(start - dist_so_far));
            }

            // Does this line contain the last point of the slice?
            if dist_so_far + length >= end {
                let last = line.unbounded_dist_along(end - dist_so_far);
                result.push(last);
                break;
            }

            // If we're in the middle, just collect the endpoint.
            if !result.is_empty() {
                result.push(line.pt2());
            }
            dist_so_far += length;
        }

        PolyLine::deduping_new(result)
    }

    pub fn exact_slice(&self, start: Distance, end: Distance) -> PolyLine {
        self.maybe_exact_slice(start, end).unwrap()
    }

    /// Shifts every line to the left by some width, joining consecutive shifted lines where
    /// they intersect. Each shifted line stays exactly `width` away from the original one.
    pub fn shift_left(&self, width: Distance) -> Result<PolyLine> {
        self.shift_either_direction(width)
    }

    pub fn shift_right(&self, width: Distance) -> Result<PolyLine> {
        self.shift_either_direction(-width)
    }

    // A short line next to a sharp enough turn flips direction when it's shifted, folding the
    // offset over itself. The interior vertex at the far end of that line is dropped and the
    // shift is retried, so the endpoints always stay where they are.
    fn shift_either_direction(&self, width: Distance) -> Result<PolyLine> {
        let mut pts = self.pts.clone();
        loop {
            let shifted = shift_pts(&pts, width);
            let folded = pts
                .windows(2)
                .zip(shifted.windows(2))
                .position(|(orig, pair)| folds(orig, pair));
            let idx = match folded {
                Some(idx) => idx,
                None => return PolyLine::deduping_new(shifted),
            };
            if pts.len() == 2 {
                bail!("Shifting {} by {} folds over itself", self, width);
            }
            let remove = if idx + 2 < pts.len() { idx + 1 } else { idx };
            pts.remove(remove);
            pts.dedup_by(|a, b| same_vertex(*a, *b));
            if pts.len() < 2 {
                bail!("Shifting {} by {} leaves nothing", self, width);
            }
        }
    }

    /// Thickens the polyline into a polygon, centered on the line.
    pub fn make_polygons(&self, width: Distance) -> Result<Polygon> {
        let left = self.shift_left(width / 2.0)?;
        let right = self.shift_right(width / 2.0)?;
        Polygon::from_sides(&left, &right)
    }

    /// The shortest distance from a point to any part of the polyline.
    pub fn dist_to_pt(&self, pt: Pt2D) -> Distance {
        self.lines()
            .map(|l| l.dist_to_pt(pt))
            .min()
            .unwrap_or(Distance::ZERO)
    }

    pub fn get_bounds(&self) -> Bounds {
        Bounds::from(&self.pts)
    }
}

// Shifts every line, joining consecutive shifted lines where they intersect.
fn shift_pts(pts: &[Pt2D], width: Distance) -> Vec<Pt2D> {
    let shifted: Vec<Line> = pts
        .windows(2)
        .map(|pair| Line::must_new(pair[0], pair[1]).shift_either_direction(width))
        .collect();
    let mut result = vec![shifted[0].pt1()];
    for pair in shifted.windows(2) {
        // When the lines are perfectly parallel, the original geometry is redundant.
        result.push(
            pair[0]
                .infinite()
                .intersection(&pair[1].infinite())
                .unwrap_or_else(|| pair[0].pt2()),
        );
    }
    result.push(shifted[shifted.len() - 1].pt2());
    result
}

// A shifted line that collapsed or points the other way
fn folds(orig: &[Pt2D], shifted: &[Pt2D]) -> bool {
    let orig = Line::must_new(orig[0], orig[1]);
    match Line::new(shifted[0], shifted[1]) {
        Ok(l) => !orig.angle().approx_eq(l.angle(), 90.0),
        Err(_) => true,
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for (idx, pt) in self.pts.iter().enumerate() {
            write!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
            if idx > 0 {
                write!(
                    f,
                    "    // {}, {}",
                    pt.x() - self.pts[idx - 1].x(),
                    pt.y() - self.pts[idx - 1].y(),
                )?;
            }
            writeln!(f)?;
        }
        write!(f, "])")
    }
}
