//! Camera frame conversion module
//!
//! This module turns planar YUV 4:2:0 camera frames into RGB images,
//! applying the rotation hint delivered with each frame.

mod converter;
mod rotate;
mod yuv420_converter;
pub mod types;

pub use converter::FrameConverter;
pub use rotate::rotate_clockwise;
pub use types::{ColorImage, Plane, RawFrame, Rotation};
pub use yuv420_converter::{Yuv420Converter, interleave_nv21, yuv_to_rgb};

use crate::image_pipeline::common::error::Result;

/// Converts a frame with the default [`Yuv420Converter`].
pub fn convert_frame(frame: &RawFrame) -> Result<ColorImage> {
    Yuv420Converter.convert(frame)
}
