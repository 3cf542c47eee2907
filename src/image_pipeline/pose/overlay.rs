use image::Rgb;
use imageproc::drawing::BresenhamLineIter;
use nalgebra::Point2;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::detect::MarkerRegion;
use crate::image_pipeline::frame::ColorImage;
use crate::image_pipeline::pose::projection::project_points;
use crate::image_pipeline::pose::solver::solve_planar_pnp;
use crate::image_pipeline::pose::types::{
    CUBE_MODEL, CameraIntrinsics, MARKER_OBJECT_POINTS, Pose, ProjectedPoints,
};

/// Colors and stroke width of the cube wireframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Base square, lying on the marker
    pub base: Rgb<u8>,
    /// Top square, one marker side above it
    pub top: Rgb<u8>,
    /// Edges joining base and top corners
    pub vertical: Rgb<u8>,
    /// Stroke width in pixels
    pub thickness: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            base: Rgb([0, 255, 0]),
            top: Rgb([255, 0, 0]),
            vertical: Rgb([0, 0, 255]),
            thickness: 2,
        }
    }
}

/// Solves the pose of the unit-square marker outlined by `region`.
pub fn estimate_pose(region: &MarkerRegion, intrinsics: &CameraIntrinsics) -> Result<Pose> {
    solve_planar_pnp(&MARKER_OBJECT_POINTS, &region.corners(), intrinsics)
}

/// Solves the marker pose and draws the projected unit cube onto `image`.
///
/// Nothing is drawn when the pose is degenerate or part of the cube falls
/// behind the camera; the error tells the caller to skip this marker.
pub fn estimate_and_overlay(
    image: &mut ColorImage,
    region: &MarkerRegion,
    intrinsics: &CameraIntrinsics,
    style: &OverlayStyle,
) -> Result<Pose> {
    let pose = estimate_pose(region, intrinsics)?;
    let projected = project_points(&CUBE_MODEL, &pose, intrinsics).ok_or_else(|| {
        PipelineError::DegeneratePoseSolve(format!(
            "cube does not project in front of the camera for {:?}",
            region
        ))
    })?;

    debug!(?region, tvec = ?pose.tvec, "Drawing cube overlay");
    draw_cube(image, &projected, style);
    Ok(pose)
}

/// Draws the base square, the top square and the four vertical edges.
pub fn draw_cube(image: &mut ColorImage, points: &ProjectedPoints, style: &OverlayStyle) {
    for i in 0..4 {
        let j = (i + 1) % 4;
        draw_line(image, points[i], points[j], style.base, style.thickness);
        draw_line(image, points[i + 4], points[j + 4], style.top, style.thickness);
    }
    for i in 0..4 {
        draw_line(image, points[i], points[i + 4], style.vertical, style.thickness);
    }
}

/// Draws a segment with a square brush of `thickness` pixels, clipped to the image.
pub fn draw_line(
    image: &mut ColorImage,
    start: Point2<f64>,
    end: Point2<f64>,
    color: Rgb<u8>,
    thickness: u32,
) {
    let thickness = thickness.max(1) as i32;
    let margin = thickness as f64;
    let bounds = (
        -margin,
        -margin,
        image.width() as f64 + margin,
        image.height() as f64 + margin,
    );
    let Some((a, b)) = clip_segment(start, end, bounds) else {
        return;
    };

    let (w, h) = (image.width() as i32, image.height() as i32);
    let offset = thickness / 2;
    let from = (a.x.round() as f32, a.y.round() as f32);
    let to = (b.x.round() as f32, b.y.round() as f32);
    for (x, y) in BresenhamLineIter::new(from, to) {
        for dy in 0..thickness {
            for dx in 0..thickness {
                let (px, py) = (x + dx - offset, y + dy - offset);
                if px >= 0 && py >= 0 && px < w && py < h {
                    image.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

/// Liang-Barsky clipping against `(min_x, min_y, max_x, max_y)`.
fn clip_segment(
    start: Point2<f64>,
    end: Point2<f64>,
    (min_x, min_y, max_x, max_y): (f64, f64, f64, f64),
) -> Option<(Point2<f64>, Point2<f64>)> {
    if !(start.x.is_finite() && start.y.is_finite() && end.x.is_finite() && end.y.is_finite()) {
        return None;
    }
    let d = end - start;
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-d.x, start.x - min_x),
        (d.x, max_x - start.x),
        (-d.y, start.y - min_y),
        (d.y, max_y - start.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((start + d * t0, start + d * t1))
}
