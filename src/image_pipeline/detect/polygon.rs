//! Polygon helpers for contour simplification.

use imageproc::point::Point;

use crate::image_pipeline::detect::types::MarkerRegion;

/// Perimeter of a closed polyline.
pub fn arc_length(points: &[Point<i32>]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n).map(|i| distance(points[i], points[(i + 1) % n])).sum()
}

/// Douglas-Peucker simplification of a closed contour.
///
/// The contour is split at two mutually distant points so that both halves
/// are open chains, each half is simplified, and the results are joined.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let first = farthest_from(points, 0);
    let second = farthest_from(points, first);
    let (a, b) = (first.min(second), first.max(second));
    if a == b {
        return vec![points[a]];
    }

    let forward: Vec<Point<i32>> = points[a..=b].to_vec();
    let backward: Vec<Point<i32>> = points[b..].iter().chain(&points[..=a]).copied().collect();

    let mut polygon = simplify_open(&forward, epsilon);
    let tail = simplify_open(&backward, epsilon);
    // both halves share the split points
    polygon.extend_from_slice(&tail[1..tail.len() - 1]);
    polygon
}

/// A polygon is a marker candidate when it has exactly four vertices.
pub fn is_quadrilateral(polygon: &[Point<i32>]) -> bool {
    polygon.len() == 4
}

/// Smallest upright rectangle holding every point, pixel-inclusive.
pub fn bounding_region(points: &[Point<i32>]) -> Option<MarkerRegion> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(MarkerRegion::new(
        min_x,
        min_y,
        (max_x - min_x + 1) as u32,
        (max_y - min_y + 1) as u32,
    ))
}

/// Simplifies an open chain, always keeping both end points.
fn simplify_open(chain: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (mut index, mut dmax) = (start, 0.0);
        for i in start + 1..end {
            let d = segment_distance(chain[i], chain[start], chain[end]);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }
        if dmax > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn farthest_from(points: &[Point<i32>], origin: usize) -> usize {
    let o = points[origin];
    let mut best = origin;
    let mut best_d = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = distance(o, p);
        if d > best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

fn distance(a: Point<i32>, b: Point<i32>) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from `p` to the line through `a` and `b`, or to `a` if they coincide.
fn segment_distance(p: Point<i32>, a: Point<i32>, b: Point<i32>) -> f64 {
    let len = distance(a, b);
    if len == 0.0 {
        return distance(a, p);
    }
    let cross = (b.x - a.x) as f64 * (p.y - a.y) as f64 - (b.y - a.y) as f64 * (p.x - a.x) as f64;
    cross.abs() / len
}
