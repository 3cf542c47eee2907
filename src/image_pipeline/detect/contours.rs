use image::{GrayImage, Luma};
use imageproc::contours::find_contours;
use imageproc::point::Point;

use crate::image_pipeline::frame::ColorImage;

/// BT.601 luma weights scaled by 2^14.
const LUMA_R: u32 = 4_899;
const LUMA_G: u32 = 9_617;
const LUMA_B: u32 = 1_868;
const LUMA_SHIFT: u32 = 14;

/// Grayscale with fixed weights `0.299 R + 0.587 G + 0.114 B`, rounded.
pub fn to_grayscale(image: &ColorImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = (r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B + (1 << (LUMA_SHIFT - 1)))
            >> LUMA_SHIFT;
        Luma([luma.min(255) as u8])
    })
}

/// Traces every border of a binary edge map, outer and hole borders alike,
/// and returns each one with straight runs compressed to their end points.
pub fn trace_contours(edges: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(edges)
        .into_iter()
        .map(|contour| compress_chain(&contour.points))
        .filter(|points| !points.is_empty())
        .collect()
}

/// Keeps only the points of a closed chain where the step direction changes.
///
/// Repeated points are dropped first. A chain with no direction change at all
/// (a single point or a back-and-forth segment) is returned deduplicated.
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut chain: Vec<Point<i32>> = Vec::with_capacity(points.len());
    for &p in points {
        if chain.last() != Some(&p) {
            chain.push(p);
        }
    }
    while chain.len() > 1 && chain.first() == chain.last() {
        chain.pop();
    }

    let n = chain.len();
    if n < 3 {
        return chain;
    }

    let step = |from: Point<i32>, to: Point<i32>| ((to.x - from.x).signum(), (to.y - from.y).signum());
    let compressed: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = chain[(i + n - 1) % n];
            let next = chain[(i + 1) % n];
            step(prev, chain[i]) != step(chain[i], next)
        })
        .map(|i| chain[i])
        .collect();

    if compressed.is_empty() { chain } else { compressed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn p(x: i32, y: i32) -> Point<i32> {
        Point::new(x, y)
    }

    #[test]
    fn test_grayscale_weights() {
        let mut image = ColorImage::new(3, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([0, 255, 0]));
        image.put_pixel(2, 0, Rgb([255, 255, 255]));

        let gray = to_grayscale(&image);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_compress_rectangle_border() {
        let mut border = Vec::new();
        for x in 0..5 {
            border.push(p(x, 0));
        }
        for y in 1..4 {
            border.push(p(4, y));
        }
        for x in (0..5).rev() {
            border.push(p(x, 3));
        }
        for y in (1..3).rev() {
            border.push(p(0, y));
        }

        let compressed = compress_chain(&border);
        assert_eq!(compressed, vec![p(0, 0), p(4, 0), p(4, 3), p(0, 3)]);
    }

    #[test]
    fn test_compress_keeps_diagonal_runs_short() {
        let diamond = vec![p(2, 0), p(3, 1), p(4, 2), p(3, 3), p(2, 4), p(1, 3), p(0, 2), p(1, 1)];
        let compressed = compress_chain(&diamond);
        assert_eq!(compressed, vec![p(2, 0), p(4, 2), p(2, 4), p(0, 2)]);
    }

    #[test]
    fn test_compress_single_point() {
        assert_eq!(compress_chain(&[p(7, 7), p(7, 7)]), vec![p(7, 7)]);
    }

    #[test]
    fn test_trace_blank_edge_map_is_empty() {
        let edges = GrayImage::new(32, 32);
        assert!(trace_contours(&edges).is_empty());
    }

    #[test]
    fn test_trace_ring_yields_outer_and_hole_border() {
        let mut edges = GrayImage::new(20, 20);
        for i in 5..=14 {
            edges.put_pixel(i, 5, Luma([255]));
            edges.put_pixel(i, 14, Luma([255]));
            edges.put_pixel(5, i, Luma([255]));
            edges.put_pixel(14, i, Luma([255]));
        }

        let mut lengths: Vec<usize> = trace_contours(&edges).iter().map(Vec::len).collect();
        lengths.sort_unstable();
        assert_eq!(lengths.len(), 2);
        // outer border keeps the four corners; the hole border cuts them diagonally
        assert!(lengths.contains(&4), "lengths {:?}", lengths);
        assert!(lengths[1] <= 8, "lengths {:?}", lengths);
    }
}
