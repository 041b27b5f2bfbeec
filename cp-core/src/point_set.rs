use std::path::Path;

use rand::Rng;

use crate::{
    config::MalformedLinePolicy,
    error::{Error, Result},
    types::Point,
};

/// The points of one upload, in the order they were given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn from_positions(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Samples `count` points uniformly inside an axis-aligned rectangle.
    ///
    /// ### Parameters
    /// - `center` - Center of the rectangle.
    /// - `half_extents` - Half width and half height; zero collapses an axis.
    /// - `count` - Number of points to generate.
    /// - `rng` - Source of randomness.
    pub fn random_in_rect(
        center: Point,
        half_extents: Point,
        count: usize,
        rng: &mut impl Rng,
    ) -> Self {
        let points = (0..count)
            .map(|_| {
                let x = rng.random_range(-half_extents.x..=half_extents.x);
                let y = rng.random_range(-half_extents.y..=half_extents.y);
                center + Point::new(x, y)
            })
            .collect();

        Self::from_positions(points)
    }

    /// Parses one `"<number>,<number>"` point per line.
    ///
    /// Blank lines are ignored and whitespace around each number is trimmed.
    /// A line that does not hold exactly two finite numbers is handled
    /// according to `policy`.
    ///
    /// ### Errors
    /// [`Error::MalformedPointLine`] (1-based line number) under
    /// [`MalformedLinePolicy::Reject`].
    pub fn parse(text: &str, policy: MalformedLinePolicy) -> Result<Self> {
        let mut points = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_line(trimmed) {
                Some(p) => points.push(p),
                None => match policy {
                    MalformedLinePolicy::Reject => {
                        return Err(Error::MalformedPointLine {
                            line: n + 1,
                            text: trimmed.to_string(),
                        });
                    }
                    MalformedLinePolicy::Skip => {
                        tracing::warn!(line = n + 1, text = trimmed, "skipping malformed point line");
                    }
                },
            }
        }
        Ok(Self { points })
    }

    /// Reads and parses a point file.
    pub fn from_path(path: impl AsRef<Path>, policy: MalformedLinePolicy) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, policy)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest and largest y coordinate, or `None` when empty.
    pub fn y_extent(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.y, p.y)),
            Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
        })
    }
}

fn parse_line(line: &str) -> Option<Point> {
    let (x, y) = line.split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    if x.is_finite() && y.is_finite() {
        Some(Point::new(x, y))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn parse_reads_one_point_per_line() {
        let set = PointSet::parse("0,0\n3.5, -4\n\n 10 ,20 \r\n", MalformedLinePolicy::Reject)
            .expect("valid input");
        assert_eq!(
            set.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(3.5, -4.0),
                Point::new(10.0, 20.0)
            ]
        );
    }

    #[test]
    fn parse_rejects_malformed_line_by_default() {
        let err = PointSet::parse("1,2\nfoo,3\n4,5", MalformedLinePolicy::default())
            .expect_err("second line is malformed");
        match err {
            Error::MalformedPointLine { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "foo,3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_skips_malformed_lines_when_asked() {
        let set = PointSet::parse("1,2\n7\n1,2,3\nNaN,1\n4,inf\n4,5", MalformedLinePolicy::Skip)
            .expect("skip never fails");
        assert_eq!(set.points(), &[Point::new(1.0, 2.0), Point::new(4.0, 5.0)]);
    }

    #[test]
    fn parse_rejects_extra_columns_and_non_finite_values() {
        for bad in ["1,2,3", "NaN,1", "1,-inf", "1", ","] {
            assert!(
                PointSet::parse(bad, MalformedLinePolicy::Reject).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn random_in_rect_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let center = Point::new(100.0, 50.0);
        let half = Point::new(20.0, 10.0);
        let set = PointSet::random_in_rect(center, half, 200, &mut rng);

        assert_eq!(set.len(), 200);
        for p in set.points() {
            assert!((p.x - center.x).abs() <= half.x);
            assert!((p.y - center.y).abs() <= half.y);
        }
    }

    #[test]
    fn y_extent_covers_all_points() {
        assert_eq!(PointSet::default().y_extent(), None);
        let set = PointSet::from_positions(vec![
            Point::new(0.0, 3.0),
            Point::new(1.0, -2.0),
            Point::new(2.0, 8.0),
        ]);
        assert_eq!(set.y_extent(), Some((-2.0, 8.0)));
    }
}
