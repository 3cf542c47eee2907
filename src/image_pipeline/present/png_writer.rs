use std::io::{Cursor, Write};
use image::ImageFormat;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::ColorImage;
use crate::image_pipeline::present::types::OutputConfig;
use crate::image_pipeline::present::writer::FrameWriter;

/// PNG output; the TIFF compression settings do not apply.
pub struct PngFrameWriter;

impl FrameWriter for PngFrameWriter {
    fn write_frame(&self, image: &ColorImage, output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
        debug!("Encoding PNG frame: {}x{}", image.width(), image.height());

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        output.write_all(buffer.get_ref())?;
        Ok(())
    }
}
