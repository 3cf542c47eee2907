use imageproc::edges::canny;
use tracing::debug;

use crate::image_pipeline::detect::contours::{to_grayscale, trace_contours};
use crate::image_pipeline::detect::dedup::dedup_nested_regions;
use crate::image_pipeline::detect::polygon::{
    approximate_closed_polygon, arc_length, bounding_region, is_quadrilateral,
};
use crate::image_pipeline::detect::types::{DetectorConfig, MarkerRegion};
use crate::image_pipeline::frame::ColorImage;

pub trait MarkerDetector {
    fn detect(&self, image: &ColorImage) -> Vec<MarkerRegion>;
}

/// Edge and contour based quadrilateral detector.
///
/// Every traced border whose simplified polygon has four vertices becomes a
/// region, so the inner and outer border of one drawn outline are reported
/// separately unless [`DetectorConfig::dedup_nested`] is set.
#[derive(Debug, Clone, Default)]
pub struct ContourMarkerDetector {
    config: DetectorConfig,
}

impl ContourMarkerDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}

impl MarkerDetector for ContourMarkerDetector {
    fn detect(&self, image: &ColorImage) -> Vec<MarkerRegion> {
        let gray = to_grayscale(image);
        let edges = canny(&gray, self.config.canny_low, self.config.canny_high);
        let contours = trace_contours(&edges);

        let epsilon_ratio = self.config.epsilon_ratio;
        let regions: Vec<MarkerRegion> = contours
            .iter()
            .map(|contour| approximate_closed_polygon(contour, epsilon_ratio * arc_length(contour)))
            .filter(|polygon| is_quadrilateral(polygon))
            .filter_map(|polygon| bounding_region(&polygon))
            .collect();

        debug!(
            contours = contours.len(),
            quads = regions.len(),
            "Contour scan complete"
        );

        if self.config.dedup_nested {
            dedup_nested_regions(
                &regions,
                self.config.dedup_max_inset_ratio,
                self.config.dedup_min_inset_px,
            )
        } else {
            regions
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const GRAY: Rgb<u8> = Rgb([130, 130, 130]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn fill_rect(image: &mut ColorImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
        for yy in y..y + h {
            for xx in x..x + w {
                image.put_pixel(xx, yy, color);
            }
        }
    }

    fn assert_near(region: &MarkerRegion, expected: MarkerRegion, tolerance: i64) {
        let diffs = [
            region.x as i64 - expected.x as i64,
            region.y as i64 - expected.y as i64,
            region.width as i64 - expected.width as i64,
            region.height as i64 - expected.height as i64,
        ];
        assert!(
            diffs.iter().all(|d| d.abs() <= tolerance),
            "{:?} is not within {} px of {:?}",
            region,
            tolerance,
            expected
        );
    }

    #[test]
    fn test_uniform_image_has_no_markers() {
        let image = ColorImage::from_pixel(160, 120, GRAY);
        assert!(ContourMarkerDetector::default().detect(&image).is_empty());
    }

    #[test]
    fn test_filled_square_bounding_box() {
        let mut image = ColorImage::from_pixel(200, 160, GRAY);
        fill_rect(&mut image, 60, 40, 60, 60, BLACK);

        let regions = ContourMarkerDetector::default().detect(&image);
        assert!(!regions.is_empty());
        for region in &regions {
            assert_near(region, MarkerRegion::new(60, 40, 60, 60), 3);
        }
    }

    #[test]
    fn test_outline_reports_nested_borders_without_dedup() {
        let mut image = ColorImage::from_pixel(200, 160, GRAY);
        fill_rect(&mut image, 50, 30, 80, 80, BLACK);
        fill_rect(&mut image, 54, 34, 72, 72, GRAY);

        let regions = ContourMarkerDetector::default().detect(&image);
        // reference behavior: outer and inner edges of the stroke both match
        assert!(regions.len() >= 2, "regions {:?}", regions);
    }

    #[test]
    fn test_outline_collapses_with_dedup() {
        let mut image = ColorImage::from_pixel(200, 160, GRAY);
        fill_rect(&mut image, 50, 30, 80, 80, BLACK);
        fill_rect(&mut image, 54, 34, 72, 72, GRAY);

        let detector = ContourMarkerDetector::new(DetectorConfig {
            dedup_nested: true,
            ..DetectorConfig::default()
        });
        let regions = detector.detect(&image);
        assert_eq!(regions.len(), 1, "regions {:?}", regions);
        assert_near(&regions[0], MarkerRegion::new(50, 30, 80, 80), 3);
    }

    #[test]
    fn test_two_separate_squares() {
        let mut image = ColorImage::from_pixel(240, 120, GRAY);
        fill_rect(&mut image, 20, 30, 50, 50, BLACK);
        fill_rect(&mut image, 150, 30, 50, 50, BLACK);

        let detector = ContourMarkerDetector::new(DetectorConfig {
            dedup_nested: true,
            ..DetectorConfig::default()
        });
        let mut regions = detector.detect(&image);
        regions.sort_by_key(|r| r.x);
        assert_eq!(regions.len(), 2, "regions {:?}", regions);
        assert_near(&regions[0], MarkerRegion::new(20, 30, 50, 50), 3);
        assert_near(&regions[1], MarkerRegion::new(150, 30, 50, 50), 3);
    }
}
