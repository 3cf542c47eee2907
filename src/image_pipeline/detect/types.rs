//! Marker detection types

/// Axis-aligned rectangle around a detected quadrilateral, in pixels.
///
/// `width` and `height` count pixels inclusively, so a contour spanning
/// columns 10..=19 has `x = 10` and `width = 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MarkerRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Corners in top-left, top-right, bottom-right, bottom-left order.
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let left = self.x as f64;
        let top = self.y as f64;
        let right = left + self.width as f64;
        let bottom = top + self.height as f64;
        [[left, top], [right, top], [right, bottom], [left, bottom]]
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Whether `other` lies entirely inside this region (edges inclusive).
    pub fn contains(&self, other: &MarkerRegion) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Configuration for the contour based detector
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Lower hysteresis threshold of the edge detector
    pub canny_low: f32,
    /// Upper hysteresis threshold of the edge detector
    pub canny_high: f32,
    /// Polygon approximation tolerance as a fraction of the contour perimeter
    pub epsilon_ratio: f64,
    /// Drop regions that trace the same outline as a larger region
    pub dedup_nested: bool,
    /// Largest per-side inset, as a fraction of the outer extent, for a nested duplicate
    pub dedup_max_inset_ratio: f64,
    /// Inset always tolerated regardless of size, in pixels
    pub dedup_min_inset_px: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            epsilon_ratio: 0.02,
            dedup_nested: false,
            dedup_max_inset_ratio: 0.15,
            dedup_min_inset_px: 6,
        }
    }
}
