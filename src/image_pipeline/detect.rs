//! Marker detection module
//!
//! Finds quadrilateral shapes outlined by strong edges and reports their
//! axis-aligned bounding boxes.

mod contours;
mod dedup;
mod detector;
mod polygon;
pub mod types;

pub use contours::{compress_chain, to_grayscale, trace_contours};
pub use dedup::dedup_nested_regions;
pub use detector::{ContourMarkerDetector, MarkerDetector};
pub use polygon::{approximate_closed_polygon, arc_length, bounding_region, is_quadrilateral};
pub use types::{DetectorConfig, MarkerRegion};

use crate::image_pipeline::frame::ColorImage;

/// Detects markers with the default [`DetectorConfig`].
pub fn detect_markers(image: &ColorImage) -> Vec<MarkerRegion> {
    ContourMarkerDetector::default().detect(image)
}
