use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::frame::ColorImage;
use crate::image_pipeline::present::types::OutputConfig;

pub trait FrameWriter {
    fn write_frame(&self, image: &ColorImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
}
