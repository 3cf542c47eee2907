use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::types::{ColorImage, RawFrame};

pub trait FrameConverter {
    fn convert(&self, frame: &RawFrame) -> Result<ColorImage>;
}
