//! Marker overlay pipeline module
//!
//! Camera frame in, annotated image out: YUV conversion, quadrilateral
//! detection, planar pose solving with a cube overlay, and presentation.

pub mod common;
pub mod config;
pub mod detect;
pub mod frame;
pub mod pipeline;
pub mod pose;
pub mod present;

pub use common::{
    PipelineError,
    Result,
};

pub use config::{
    PipelineConfig,
    PipelineConfigBuilder,
};

pub use frame::{
    ColorImage,
    FrameConverter,
    Plane,
    RawFrame,
    Rotation,
    Yuv420Converter,
    convert_frame,
};

pub use detect::{
    ContourMarkerDetector,
    DetectorConfig,
    MarkerDetector,
    MarkerRegion,
    detect_markers,
};

pub use pose::{
    CameraIntrinsics,
    OverlayStyle,
    Pose,
    estimate_and_overlay,
};

pub use present::{
    Bitmap,
    FrameWriter,
    OutputConfig,
    OutputFormat,
    PngFrameWriter,
    TiffCompression,
    TiffFrameWriter,
    to_displayable,
};

pub use pipeline::{
    FrameOutput,
    MarkerOutcome,
    MarkerOverlayPipeline,
    PipelineTimings,
    Stage,
};
