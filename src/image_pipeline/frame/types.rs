//! Camera frame types

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Dense RGB image, row-major, one byte per channel.
pub type ColorImage = image::RgbImage;

/// One plane of a YUV_420_888 style frame.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Plane bytes, starting at the first sample
    pub data: Vec<u8>,
    /// Distance in bytes between the starts of two consecutive rows
    pub row_stride: usize,
    /// Distance in bytes between two consecutive samples of a row
    pub pixel_stride: usize,
}

impl Plane {
    pub fn packed(data: Vec<u8>, row_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride: 1,
        }
    }

    /// Bytes needed to hold `cols` x `rows` samples with this plane's strides.
    pub fn required_len(&self, cols: usize, rows: usize) -> usize {
        if cols == 0 || rows == 0 {
            return 0;
        }
        self.row_stride * (rows - 1) + self.pixel_stride * (cols - 1) + 1
    }

    #[inline]
    pub(crate) fn sample(&self, col: usize, row: usize) -> u8 {
        self.data[row * self.row_stride + col * self.pixel_stride]
    }
}

/// Rotation hint attached to a frame, applied clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        self.clockwise_quarter_turns() as u32 * 90
    }

    pub fn clockwise_quarter_turns(self) -> u8 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = PipelineError;

    fn try_from(degrees: u32) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(PipelineError::UnsupportedRotation(other)),
        }
    }
}

/// A 4:2:0 camera frame as delivered by the capture stack.
///
/// Planes are ordered Y, U, V. Chroma planes hold `width/2` x `height/2`
/// samples; their strides describe whether they are planar (pixel stride 1)
/// or views over an interleaved buffer (pixel stride 2).
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Width of the luma plane in pixels
    pub width: usize,
    /// Height of the luma plane in pixels
    pub height: usize,
    /// Y, U and V planes
    pub planes: [Plane; 3],
    /// Clockwise rotation needed to display the frame upright
    pub rotation: Rotation,
}

impl RawFrame {
    /// Builds a frame from a tightly packed I420 buffer (Y, then U, then V).
    pub fn from_i420(bytes: &[u8], width: usize, height: usize) -> Result<Self> {
        let expected = frame_len(width, height)?;
        if bytes.len() != expected {
            return Err(PipelineError::InvalidFrameFormat(format!(
                "I420 buffer is {} bytes, expected {} for {}x{}",
                bytes.len(),
                expected,
                width,
                height
            )));
        }
        let luma = width * height;
        let chroma = luma / 4;
        let (y, rest) = bytes.split_at(luma);
        let (u, v) = rest.split_at(chroma);

        Ok(Self {
            width,
            height,
            planes: [
                Plane::packed(y.to_vec(), width),
                Plane::packed(u.to_vec(), width / 2),
                Plane::packed(v.to_vec(), width / 2),
            ],
            rotation: Rotation::Deg0,
        })
    }

    /// Builds a frame from an NV21 buffer (Y, then interleaved V/U).
    ///
    /// The chroma planes become pixel-stride-2 views over the interleaved
    /// bytes, the same shape Android reports for YUV_420_888 output.
    pub fn from_nv21(bytes: &[u8], width: usize, height: usize) -> Result<Self> {
        let expected = frame_len(width, height)?;
        if bytes.len() != expected {
            return Err(PipelineError::InvalidFrameFormat(format!(
                "NV21 buffer is {} bytes, expected {} for {}x{}",
                bytes.len(),
                expected,
                width,
                height
            )));
        }
        let (y, vu) = bytes.split_at(width * height);

        Ok(Self {
            width,
            height,
            planes: [
                Plane::packed(y.to_vec(), width),
                Plane {
                    data: vu[1..].to_vec(),
                    row_stride: width,
                    pixel_stride: 2,
                },
                Plane {
                    data: vu.to_vec(),
                    row_stride: width,
                    pixel_stride: 2,
                },
            ],
            rotation: Rotation::Deg0,
        })
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn y_plane(&self) -> &Plane {
        &self.planes[0]
    }

    pub fn u_plane(&self) -> &Plane {
        &self.planes[1]
    }

    pub fn v_plane(&self) -> &Plane {
        &self.planes[2]
    }
}

/// Size in bytes of a packed 4:2:0 frame: `width * height * (1 + 2 * 0.25)`.
pub fn frame_len(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 || width % 2 != 0 || height % 2 != 0 {
        return Err(PipelineError::InvalidFrameFormat(format!(
            "4:2:0 frames need non-zero even dimensions, got {}x{}",
            width, height
        )));
    }
    Ok(width * height * 3 / 2)
}
