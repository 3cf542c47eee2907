//! Pipeline orchestration module
//!
//! Runs conversion, detection, overlay and presentation for one frame.

mod marker_overlay;
mod result;
mod timing;


pub use marker_overlay::MarkerOverlayPipeline;
pub use result::{FrameOutput, MarkerOutcome};
pub use timing::{PipelineTimings, Stage, StageTimer, StepTiming};
