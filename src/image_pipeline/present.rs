//! Frame presentation module
//!
//! Turns annotated frames into displayable bitmaps or encoded image files.

mod bitmap;
mod png_writer;
mod tiff_writer;
mod writer;
pub mod types;

pub use bitmap::{Bitmap, to_displayable};
pub use png_writer::PngFrameWriter;
pub use tiff_writer::TiffFrameWriter;
pub use types::{OutputConfig, OutputFormat, TiffCompression};
pub use writer::FrameWriter;
