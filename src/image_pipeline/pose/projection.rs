use nalgebra::{Point2, Point3};

use crate::image_pipeline::pose::types::{CameraIntrinsics, Pose, ProjectedPoints};

/// Smallest camera-frame depth accepted for projection.
const MIN_DEPTH: f64 = 1e-9;

/// Pinhole projection of one marker-frame point: rotate and translate,
/// divide by depth, then apply the intrinsics.
///
/// Returns `None` for points at or behind the camera centre.
pub fn project_point(
    point: &Point3<f64>,
    pose: &Pose,
    intrinsics: &CameraIntrinsics,
) -> Option<Point2<f64>> {
    let cam = pose.transform(point);
    if !(cam.z > MIN_DEPTH) {
        return None;
    }
    let [u, v] = intrinsics.normalized_to_pixel([cam.x / cam.z, cam.y / cam.z]);
    (u.is_finite() && v.is_finite()).then(|| Point2::new(u, v))
}

/// Projects all eight cube corners, or nothing if any of them fails.
pub fn project_points(
    model: &[Point3<f64>; 8],
    pose: &Pose,
    intrinsics: &CameraIntrinsics,
) -> Option<ProjectedPoints> {
    let mut projected = [Point2::origin(); 8];
    for (slot, point) in projected.iter_mut().zip(model) {
        *slot = project_point(point, pose, intrinsics)?;
    }
    Some(projected)
}

/// Root-mean-square pixel distance between projected object points and
/// their observed image points. Infinite if any point fails to project.
pub fn reprojection_error(
    object: &[Point3<f64>],
    image: &[[f64; 2]],
    pose: &Pose,
    intrinsics: &CameraIntrinsics,
) -> f64 {
    let mut sum = 0.0;
    for (o, i) in object.iter().zip(image) {
        match project_point(o, pose, intrinsics) {
            Some(p) => sum += (p.x - i[0]).powi(2) + (p.y - i[1]).powi(2),
            None => return f64::INFINITY,
        }
    }
    (sum / object.len().max(1) as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::pose::types::CUBE_MODEL;
    use nalgebra::Vector3;

    #[test]
    fn test_identity_pose_projects_through_intrinsics() {
        let pose = Pose::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 4.0));
        let k = CameraIntrinsics::default();
        let p = project_point(&Point3::new(1.0, 0.5, 0.0), &pose, &k).unwrap();
        assert!((p.x - (640.0 + 800.0 * 0.25)).abs() < 1e-9);
        assert!((p.y - (360.0 + 800.0 * 0.125)).abs() < 1e-9);
    }

    #[test]
    fn test_cube_top_is_closer_and_larger() {
        let pose = Pose::new(Vector3::zeros(), Vector3::new(-0.5, -0.5, 5.0));
        let pts = project_points(&CUBE_MODEL, &pose, &CameraIntrinsics::default()).unwrap();
        let base_width = pts[1].x - pts[0].x;
        let top_width = pts[5].x - pts[4].x;
        assert!(top_width > base_width);
    }

    #[test]
    fn test_points_behind_camera_are_rejected() {
        let pose = Pose::new(Vector3::zeros(), Vector3::new(0.0, 0.0, 0.5));
        // top corners land at z = -0.5
        assert!(project_points(&CUBE_MODEL, &pose, &CameraIntrinsics::default()).is_none());
    }
}
