//! Pose estimation types

use nalgebra::{Matrix3, Point2, Point3, Rotation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics, zero distortion.
///
/// The default is a fixed placeholder for a 1280x720 sensor, not a
/// calibration result; real hardware should load its own values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in x (pixels).
    pub fx: f64,
    /// Focal length in y (pixels).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            fx: 800.0,
            fy: 800.0,
            cx: 640.0,
            cy: 360.0,
        }
    }
}

impl CameraIntrinsics {
    /// Returns `true` when all values are finite and focal lengths are non-zero.
    pub fn is_valid(&self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// The 3x3 camera matrix `K`.
    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx,
            0.0, self.fy, self.cy,
            0.0, 0.0, 1.0,
        )
    }

    /// Convert pixel coordinates to normalized pinhole coordinates.
    pub fn pixel_to_normalized(&self, pixel: [f64; 2]) -> [f64; 2] {
        [(pixel[0] - self.cx) / self.fx, (pixel[1] - self.cy) / self.fy]
    }

    /// Convert normalized pinhole coordinates to pixel coordinates.
    pub fn normalized_to_pixel(&self, normalized: [f64; 2]) -> [f64; 2] {
        [
            self.fx * normalized[0] + self.cx,
            self.fy * normalized[1] + self.cy,
        ]
    }
}

/// Rigid transform from the marker frame into the camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Rodrigues rotation vector (axis * angle, radians).
    pub rvec: Vector3<f64>,
    /// Translation in marker units.
    pub tvec: Vector3<f64>,
}

impl Pose {
    pub fn new(rvec: Vector3<f64>, tvec: Vector3<f64>) -> Self {
        Self { rvec, tvec }
    }

    /// Goes through a quaternion: its angle uses `atan2`, which stays finite
    /// when rounding pushes the matrix trace past 3.
    pub fn from_rotation(rotation: &Rotation3<f64>, tvec: Vector3<f64>) -> Self {
        Self {
            rvec: UnitQuaternion::from_rotation_matrix(rotation).scaled_axis(),
            tvec,
        }
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_scaled_axis(self.rvec)
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation().into_inner()
    }

    /// Maps a marker-frame point into the camera frame.
    pub fn transform(&self, point: &Point3<f64>) -> Point3<f64> {
        self.rotation() * point + self.tvec
    }

    pub fn is_finite(&self) -> bool {
        self.rvec.iter().chain(self.tvec.iter()).all(|v| v.is_finite())
    }
}

/// Marker corners in the marker frame, matching `MarkerRegion::corners` order.
pub const MARKER_OBJECT_POINTS: [Point3<f64>; 4] = [
    Point3::new(0.0, 0.0, 0.0),
    Point3::new(1.0, 0.0, 0.0),
    Point3::new(1.0, 1.0, 0.0),
    Point3::new(0.0, 1.0, 0.0),
];

/// Unit cube on the marker: base corners 0..4 at z = 0, top corners 4..8 at z = -1.
pub const CUBE_MODEL: [Point3<f64>; 8] = [
    Point3::new(0.0, 0.0, 0.0),
    Point3::new(1.0, 0.0, 0.0),
    Point3::new(1.0, 1.0, 0.0),
    Point3::new(0.0, 1.0, 0.0),
    Point3::new(0.0, 0.0, -1.0),
    Point3::new(1.0, 0.0, -1.0),
    Point3::new(1.0, 1.0, -1.0),
    Point3::new(0.0, 1.0, -1.0),
];

pub type ProjectedPoints = [Point2<f64>; 8];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_vector_finite_for_rounded_identity() {
        // Orthonormal up to rounding, with a trace just above 3.
        let m = Matrix3::new(
            1.0 + 4e-16, 0.0, 0.0,
            0.0, 1.0 + 4e-16, 0.0,
            0.0, 0.0, 1.0,
        );
        let pose = Pose::from_rotation(&Rotation3::from_matrix_unchecked(m), Vector3::z());

        assert!(pose.is_finite(), "rvec {:?}", pose.rvec);
        assert!(pose.rvec.norm() < 1e-12);
    }

    #[test]
    fn test_rotation_vector_round_trip() {
        let rvec = Vector3::new(0.3, -0.2, 0.1);
        let pose = Pose::from_rotation(&Rotation3::from_scaled_axis(rvec), Vector3::z());

        assert!((pose.rvec - rvec).norm() < 1e-12, "rvec {:?}", pose.rvec);
    }

    #[test]
    fn test_default_intrinsics_are_valid() {
        let k = CameraIntrinsics::default();
        assert!(k.is_valid());
        assert_eq!(k.pixel_to_normalized([640.0, 360.0]), [0.0, 0.0]);
    }
}
