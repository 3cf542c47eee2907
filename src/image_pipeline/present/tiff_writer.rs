use std::io::Write;
use tracing::debug;
use tiff::encoder::{Compression, TiffEncoder, colortype, compression::DeflateLevel};
use tiff::tags::Predictor;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::frame::ColorImage;
use crate::image_pipeline::present::types::{OutputConfig, TiffCompression};
use crate::image_pipeline::present::writer::FrameWriter;

pub struct TiffFrameWriter;

impl FrameWriter for TiffFrameWriter {
    fn write_frame(&self, image: &ColorImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!("Encoding TIFF frame: {}x{}", image.width(), image.height());

        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder.write_image::<colortype::RGB8>(
            image.width(),
            image.height(),
            image.as_raw(),
        ).map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
