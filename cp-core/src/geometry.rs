//! Distance and ordering primitives over points.

use crate::types::Point;

/// Euclidean distance between two points.
///
/// No special casing: a NaN coordinate yields NaN.
#[inline]
pub fn distance(p1: Point, p2: Point) -> f64 {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    (dx * dx + dy * dy).sqrt()
}

/// Finds the closest pair among `points` by comparing every pair.
///
/// Pairs are visited as `(i, j)` with `i < j` in slice order and a pair only
/// replaces the current best on a strict improvement, so the first pair found
/// at the minimum distance wins ties.
///
/// ### Returns
/// `Some((i, j, distance))` with `i < j`, or `None` for fewer than 2 points.
pub fn brute_force(points: &[Point]) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let d = distance(points[i], points[j]);
            match best {
                Some((_, _, best_d)) if !(d < best_d) => {}
                _ => best = Some((i, j, d)),
            }
        }
    }
    best
}

/// Indices of `points` ordered by ascending x, ties kept in input order.
pub fn sorted_by_x(points: &[Point]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len()).collect();
    idx.sort_by(|&a, &b| points[a].x.total_cmp(&points[b].x));
    idx
}

/// Indices of `points` ordered by ascending y, ties kept in input order.
pub fn sorted_by_y(points: &[Point]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..points.len()).collect();
    idx.sort_by(|&a, &b| points[a].y.total_cmp(&points[b].y));
    idx
}
