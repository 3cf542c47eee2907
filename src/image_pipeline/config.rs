//! Pipeline configuration types

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::detect::DetectorConfig;
use crate::image_pipeline::pose::{CameraIntrinsics, OverlayStyle};
use crate::image_pipeline::present::OutputConfig;

/// Configuration for the marker overlay pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Camera used for pose solving and projection
    pub intrinsics: CameraIntrinsics,
    /// Edge and contour detector settings
    pub detector: DetectorConfig,
    /// Cube wireframe colors and stroke
    pub overlay: OverlayStyle,
    /// Encoding settings for presented frames
    pub output: OutputConfig,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    intrinsics: Option<CameraIntrinsics>,
    detector: Option<DetectorConfig>,
    overlay: Option<OverlayStyle>,
    output: Option<OutputConfig>,
}

impl PipelineConfigBuilder {
    pub fn intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = Some(intrinsics);
        self
    }

    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn overlay(mut self, overlay: OverlayStyle) -> Self {
        self.overlay = Some(overlay);
        self
    }

    pub fn output(mut self, output: OutputConfig) -> Self {
        self.output = Some(output);
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        let intrinsics = self.intrinsics.unwrap_or_default();
        if !intrinsics.is_valid() {
            return Err(PipelineError::InvalidIntrinsics(format!("{:?}", intrinsics)));
        }
        Ok(PipelineConfig {
            intrinsics,
            detector: self.detector.unwrap_or_default(),
            overlay: self.overlay.unwrap_or_default(),
            output: self.output.unwrap_or_default(),
        })
    }
}
