use serde::{Deserialize, Serialize};

// Ranges this close are treated as touching.
const TOUCHING: f64 = 1e-9;

/// A closed range of the normalized parameter along a segment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    /// The endpoints can be passed in either order.
    pub fn new(a: f64, b: f64) -> Interval {
        Interval {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn middle(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Touching counts.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end + TOUCHING && other.start <= self.end + TOUCHING
    }

    pub fn contains(&self, t: f64) -> bool {
        self.start - TOUCHING <= t && t <= self.end + TOUCHING
    }

    pub fn union(&self, other: &Interval) -> Interval {
        Interval::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// The smallest interval centered on `center` that still covers this one, clamped to
    /// `[0, 1]`.
    pub fn centered_on(&self, center: f64) -> Interval {
        let half = (center - self.start).max(self.end - center).max(0.0);
        Interval::new(
            (center - half).clamp(0.0, 1.0),
            (center + half).clamp(0.0, 1.0),
        )
    }
}

/// Disjoint intervals, sorted by start. Adding an interval merges everything it touches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> IntervalSet {
        IntervalSet::default()
    }

    pub fn add(&mut self, mut interval: Interval) {
        let mut keep = Vec::new();
        for existing in self.intervals.drain(..) {
            if existing.overlaps(&interval) {
                interval = interval.union(&existing);
            } else {
                keep.push(existing);
            }
        }
        keep.push(interval);
        keep.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.intervals = keep;
    }

    pub fn intervals(&self) -> &Vec<Interval> {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// The index of the interval containing `t`.
    pub fn find(&self, t: f64) -> Option<usize> {
        self.intervals.iter().position(|i| i.contains(t))
    }

    /// What's left of `[0, 1]` after removing every interval. Empty leftovers are skipped.
    pub fn complement(&self) -> Vec<Interval> {
        let mut result = Vec::new();
        let mut cursor = 0.0;
        for i in &self.intervals {
            if i.start > cursor + TOUCHING {
                result.push(Interval::new(cursor, i.start));
            }
            cursor = f64::max(cursor, i.end);
        }
        if cursor < 1.0 - TOUCHING {
            result.push(Interval::new(cursor, 1.0));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_and_complement() {
        let mut set = IntervalSet::new();
        set.add(Interval::new(0.6, 0.7));
        set.add(Interval::new(0.2, 0.1));
        set.add(Interval::new(0.65, 0.8));
        assert_eq!(
            set.intervals(),
            &vec![Interval::new(0.1, 0.2), Interval::new(0.6, 0.8)]
        );
        assert_eq!(
            set.complement(),
            vec![
                Interval::new(0.0, 0.1),
                Interval::new(0.2, 0.6),
                Interval::new(0.8, 1.0)
            ]
        );
        assert_eq!(set.find(0.7), Some(1));
        assert_eq!(set.find(0.5), None);

        // Bridging both
        set.add(Interval::new(0.2, 0.6));
        assert_eq!(set.intervals(), &vec![Interval::new(0.1, 0.8)]);
    }

    #[test]
    fn touching_the_ends() {
        let mut set = IntervalSet::new();
        set.add(Interval::new(0.0, 0.3));
        set.add(Interval::new(0.9, 1.0));
        assert_eq!(set.complement(), vec![Interval::new(0.3, 0.9)]);
        assert!(IntervalSet::new().complement() == vec![Interval::new(0.0, 1.0)]);
    }

    #[test]
    fn centered() {
        let i = Interval::new(0.4, 0.5).centered_on(0.42);
        assert!((i.start - 0.34).abs() < 1e-9);
        assert!((i.end - 0.5).abs() < 1e-9);

        let i = Interval::new(0.0, 0.1).centered_on(0.08);
        assert_eq!(i.start, 0.0);
        assert!((i.end - 0.16).abs() < 1e-9);
    }
}
