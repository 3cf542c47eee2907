//! Per-frame pipeline results

use crate::image_pipeline::detect::MarkerRegion;
use crate::image_pipeline::frame::ColorImage;
use crate::image_pipeline::pipeline::timing::PipelineTimings;
use crate::image_pipeline::pose::Pose;
use crate::image_pipeline::present::{Bitmap, to_displayable};

/// What happened to one detected marker
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerOutcome {
    /// Pose solved and cube drawn
    Overlaid(Pose),
    /// Pose could not be solved; nothing drawn for this marker
    Skipped(String),
}

impl MarkerOutcome {
    pub fn is_overlaid(&self) -> bool {
        matches!(self, MarkerOutcome::Overlaid(_))
    }
}

/// Annotated frame plus everything found while producing it
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Converted frame with cube overlays drawn in place
    pub image: ColorImage,
    /// Detected marker regions, in detection order
    pub regions: Vec<MarkerRegion>,
    /// One outcome per region, same order
    pub outcomes: Vec<MarkerOutcome>,
    /// Stage durations for this frame
    pub timings: PipelineTimings,
}

impl FrameOutput {
    pub fn marker_count(&self) -> usize {
        self.regions.len()
    }

    pub fn overlaid_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_overlaid()).count()
    }

    /// Short user-facing message, only when at least one marker was found.
    pub fn notification(&self) -> Option<String> {
        match self.marker_count() {
            0 => None,
            n => Some(format!("Detected {} markers!", n)),
        }
    }

    pub fn bitmap(&self) -> Bitmap {
        to_displayable(&self.image)
    }

    /// Marker counts followed by the stage timing table.
    pub fn summary(&self, frame_index: usize) -> String {
        format!(
            "Frame {}: {} markers, {} overlaid\n{}",
            frame_index,
            self.marker_count(),
            self.overlaid_count(),
            self.timings.table()
        )
    }

    pub fn print_summary(&self, frame_index: usize) {
        println!("\n{}", self.summary(frame_index));
    }
}
