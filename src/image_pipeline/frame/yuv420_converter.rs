//! YUV 4:2:0 to RGB conversion.
//!
//! Frames are first packed into a single NV21 buffer (luma rows followed by
//! interleaved V/U bytes), whatever the strides of the incoming planes. The
//! packed buffer is then converted with the BT.601 video-range formula and
//! rotated upright.

use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::converter::FrameConverter;
use crate::image_pipeline::frame::rotate::rotate_clockwise;
use crate::image_pipeline::frame::types::{ColorImage, Plane, RawFrame, frame_len};

/// Fixed-point precision of the conversion coefficients.
const SHIFT: u32 = 20;
const ROUND: i32 = 1 << (SHIFT - 1);

// BT.601 coefficients scaled by 2^20
const C_Y: i32 = 1_220_542; // 1.164
const C_RV: i32 = 1_673_527; // 1.596
const C_GV: i32 = -852_492; // -0.813
const C_GU: i32 = -409_993; // -0.391
const C_BU: i32 = 2_116_026; // 2.018

pub struct Yuv420Converter;

impl FrameConverter for Yuv420Converter {
    fn convert(&self, frame: &RawFrame) -> Result<ColorImage> {
        let width = frame.width;
        let height = frame.height;
        debug!("Converting YUV420 frame {}x{}, rotation {}", width, height, frame.rotation.degrees());

        let nv21 = interleave_nv21(frame)?;
        let (luma, chroma) = nv21.split_at(width * height);

        let mut rgb = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let chroma_row = &chroma[(y / 2) * width..(y / 2 + 1) * width];
            for x in 0..width {
                let v = chroma_row[(x / 2) * 2];
                let u = chroma_row[(x / 2) * 2 + 1];
                rgb.extend_from_slice(&yuv_to_rgb(luma[y * width + x], u, v));
            }
        }

        let image = ColorImage::from_raw(width as u32, height as u32, rgb).ok_or_else(|| {
            PipelineError::InvalidFrameFormat(format!("cannot build {}x{} RGB image", width, height))
        })?;

        Ok(rotate_clockwise(image, frame.rotation.clockwise_quarter_turns()))
    }
}

/// Converts one YUV sample to RGB.
#[inline]
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = (y as i32 - 16).max(0) * C_Y;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = (c + C_RV * e + ROUND) >> SHIFT;
    let g = (c + C_GV * e + C_GU * d + ROUND) >> SHIFT;
    let b = (c + C_BU * d + ROUND) >> SHIFT;

    [clamp_u8(r), clamp_u8(g), clamp_u8(b)]
}

#[inline]
fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Packs a frame's planes into an NV21 buffer of exactly `width * height * 3 / 2` bytes.
pub fn interleave_nv21(frame: &RawFrame) -> Result<Vec<u8>> {
    let width = frame.width;
    let height = frame.height;
    let expected = frame_len(width, height)?;
    let (chroma_w, chroma_h) = (width / 2, height / 2);

    check_plane("Y", frame.y_plane(), width, height)?;
    check_plane("U", frame.u_plane(), chroma_w, chroma_h)?;
    check_plane("V", frame.v_plane(), chroma_w, chroma_h)?;

    let mut packed = Vec::with_capacity(expected);
    let y_plane = frame.y_plane();
    for row in 0..height {
        if y_plane.pixel_stride == 1 {
            let start = row * y_plane.row_stride;
            packed.extend_from_slice(&y_plane.data[start..start + width]);
        } else {
            packed.extend((0..width).map(|col| y_plane.sample(col, row)));
        }
    }

    let (u_plane, v_plane) = (frame.u_plane(), frame.v_plane());
    for row in 0..chroma_h {
        for col in 0..chroma_w {
            packed.push(v_plane.sample(col, row));
            packed.push(u_plane.sample(col, row));
        }
    }

    Ok(packed)
}

/// A plane may carry row padding, but nothing past its last full row.
fn check_plane(name: &str, plane: &Plane, cols: usize, rows: usize) -> Result<()> {
    if plane.pixel_stride == 0 || plane.row_stride < plane.pixel_stride * (cols - 1) + 1 {
        return Err(PipelineError::InvalidFrameFormat(format!(
            "{} plane strides (row {}, pixel {}) cannot hold {} samples per row",
            name, plane.row_stride, plane.pixel_stride, cols
        )));
    }
    let required = plane.required_len(cols, rows);
    if plane.data.len() < required {
        return Err(PipelineError::InvalidFrameFormat(format!(
            "{} plane has {} bytes, needs {} for {}x{}",
            name,
            plane.data.len(),
            required,
            cols,
            rows
        )));
    }
    let limit = plane.row_stride * rows;
    if plane.data.len() > limit {
        return Err(PipelineError::InvalidFrameFormat(format!(
            "{} plane has {} bytes, at most {} fit {} rows of stride {}",
            name,
            plane.data.len(),
            limit,
            rows,
            plane.row_stride
        )));
    }
    Ok(())
}
