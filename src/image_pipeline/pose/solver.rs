//! Pose of a planar marker from four point correspondences.
//!
//! The closed-form start comes from decomposing the plane-to-image
//! homography; a short Gauss-Newton pass then minimizes pixel reprojection
//! error over the rotation vector and translation.

use nalgebra::{Matrix3, Matrix6, Point3, Rotation3, SMatrix, SVector, Vector3, Vector6};
use tracing::trace;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::pose::homography::estimate_homography_dlt;
use crate::image_pipeline::pose::projection::{project_point, reprojection_error};
use crate::image_pipeline::pose::types::{CameraIntrinsics, Pose};

const MIN_QUAD_AREA: f64 = 1.0;
const COLLINEAR_SINE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 20;
const STEP_TOLERANCE: f64 = 1e-10;
const JACOBIAN_STEP: f64 = 1e-7;
const DAMPING: f64 = 1e-9;

/// Solves the pose of four coplanar (z = 0) object points seen at `image`.
///
/// Fails with `DegeneratePoseSolve` when the image quad is collinear or has
/// no area, or when no finite pose with positive depth exists.
pub fn solve_planar_pnp(
    object: &[Point3<f64>; 4],
    image: &[[f64; 2]; 4],
    intrinsics: &CameraIntrinsics,
) -> Result<Pose> {
    if !intrinsics.is_valid() {
        return Err(PipelineError::InvalidIntrinsics(format!("{:?}", intrinsics)));
    }
    check_quad(image)?;
    if object.iter().any(|p| p.z.abs() > 1e-12) {
        return Err(PipelineError::DegeneratePoseSolve(
            "object points must lie on z = 0".into(),
        ));
    }

    let initial = initial_pose(object, image, intrinsics)?;
    let refined = refine(initial, object, image, intrinsics);

    if !refined.is_finite() || refined.tvec.z <= 0.0 {
        return Err(PipelineError::DegeneratePoseSolve(format!(
            "pose has no positive finite depth: t = {:?}",
            refined.tvec
        )));
    }
    Ok(refined)
}

fn check_quad(image: &[[f64; 2]; 4]) -> Result<()> {
    if image.iter().flatten().any(|v| !v.is_finite()) {
        return Err(PipelineError::DegeneratePoseSolve("non-finite image point".into()));
    }

    let area = 0.5
        * (0..4)
            .map(|i| {
                let (a, b) = (image[i], image[(i + 1) % 4]);
                a[0] * b[1] - b[0] * a[1]
            })
            .sum::<f64>()
            .abs();
    if area < MIN_QUAD_AREA {
        return Err(PipelineError::DegeneratePoseSolve(format!(
            "image quad area {:.3} px² is too small",
            area
        )));
    }

    for skip in 0..4 {
        let tri: Vec<[f64; 2]> = (0..4).filter(|&i| i != skip).map(|i| image[i]).collect();
        let ab = [tri[1][0] - tri[0][0], tri[1][1] - tri[0][1]];
        let ac = [tri[2][0] - tri[0][0], tri[2][1] - tri[0][1]];
        let cross = ab[0] * ac[1] - ab[1] * ac[0];
        let norm = (ab[0].hypot(ab[1])) * (ac[0].hypot(ac[1]));
        if norm < 1e-12 || (cross / norm).abs() < COLLINEAR_SINE {
            return Err(PipelineError::DegeneratePoseSolve(
                "three image points are collinear".into(),
            ));
        }
    }
    Ok(())
}

/// Homography decomposition: `[r1 r2 t] = λ K⁻¹ H`.
fn initial_pose(
    object: &[Point3<f64>; 4],
    image: &[[f64; 2]; 4],
    intrinsics: &CameraIntrinsics,
) -> Result<Pose> {
    let src: Vec<[f64; 2]> = object.iter().map(|p| [p.x, p.y]).collect();
    let dst: Vec<[f64; 2]> = image.iter().map(|&p| intrinsics.pixel_to_normalized(p)).collect();
    let h = estimate_homography_dlt(&src, &dst)?;

    let h1 = h.column(0).into_owned();
    let h2 = h.column(1).into_owned();
    let h3 = h.column(2).into_owned();
    let norm_sum = h1.norm() + h2.norm();
    if norm_sum < 1e-12 {
        return Err(PipelineError::DegeneratePoseSolve("homography has no scale".into()));
    }

    let mut lambda = 2.0 / norm_sum;
    if h3.z * lambda < 0.0 {
        lambda = -lambda;
    }
    let r1 = h1 * lambda;
    let r2 = h2 * lambda;
    let r3 = r1.cross(&r2);
    let tvec = h3 * lambda;

    let rotation = nearest_rotation(&Matrix3::from_columns(&[r1, r2, r3]))?;
    trace!(?tvec, "Initial pose from homography");
    Ok(Pose::from_rotation(&rotation, tvec))
}

/// Projects a 3x3 matrix onto SO(3) through its SVD.
fn nearest_rotation(m: &Matrix3<f64>) -> Result<Rotation3<f64>> {
    let svd = m.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(PipelineError::DegeneratePoseSolve("SVD did not converge".into())),
    };
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let mut u = u;
        u.column_mut(2).neg_mut();
        r = u * v_t;
    }
    Ok(Rotation3::from_matrix_unchecked(r))
}

fn residuals(
    params: &Vector6<f64>,
    object: &[Point3<f64>; 4],
    image: &[[f64; 2]; 4],
    intrinsics: &CameraIntrinsics,
) -> Option<SVector<f64, 8>> {
    let pose = pose_from_params(params);
    let mut r = SVector::<f64, 8>::zeros();
    for (i, (o, obs)) in object.iter().zip(image).enumerate() {
        let p = project_point(o, &pose, intrinsics)?;
        r[2 * i] = p.x - obs[0];
        r[2 * i + 1] = p.y - obs[1];
    }
    Some(r)
}

fn pose_from_params(params: &Vector6<f64>) -> Pose {
    Pose::new(
        Vector3::new(params[0], params[1], params[2]),
        Vector3::new(params[3], params[4], params[5]),
    )
}

/// Gauss-Newton with a forward-difference Jacobian. Steps that do not lower
/// the error end the iteration; the input pose is returned unchanged if no
/// step helps.
fn refine(
    pose: Pose,
    object: &[Point3<f64>; 4],
    image: &[[f64; 2]; 4],
    intrinsics: &CameraIntrinsics,
) -> Pose {
    let mut params = Vector6::new(
        pose.rvec.x, pose.rvec.y, pose.rvec.z, pose.tvec.x, pose.tvec.y, pose.tvec.z,
    );
    let Some(mut r) = residuals(&params, object, image, intrinsics) else {
        return pose;
    };
    let mut cost = r.norm_squared();

    for iteration in 0..MAX_ITERATIONS {
        let mut jac = SMatrix::<f64, 8, 6>::zeros();
        for k in 0..6 {
            let mut shifted = params;
            shifted[k] += JACOBIAN_STEP;
            let Some(r_k) = residuals(&shifted, object, image, intrinsics) else {
                return pose_from_params(&params);
            };
            jac.set_column(k, &((r_k - r) / JACOBIAN_STEP));
        }

        let jtj: Matrix6<f64> = jac.transpose() * jac + Matrix6::identity() * DAMPING;
        let Some(step) = jtj.cholesky().map(|c| c.solve(&(-(jac.transpose() * r)))) else {
            break;
        };

        let candidate = params + step;
        let Some(r_new) = residuals(&candidate, object, image, intrinsics) else {
            break;
        };
        let new_cost = r_new.norm_squared();
        if !(new_cost < cost) {
            break;
        }

        params = candidate;
        r = r_new;
        cost = new_cost;
        trace!(iteration, cost, "Pose refinement step");
        if step.norm() < STEP_TOLERANCE {
            break;
        }
    }

    let refined = pose_from_params(&params);
    if reprojection_error(object, image, &refined, intrinsics)
        <= reprojection_error(object, image, &pose, intrinsics)
    {
        refined
    } else {
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::pose::types::MARKER_OBJECT_POINTS;

    fn square(x: f64, y: f64, side: f64) -> [[f64; 2]; 4] {
        rect(x, y, side, side)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> [[f64; 2]; 4] {
        [[x, y], [x + w, y], [x + w, y + h], [x, y + h]]
    }

    #[test]
    fn test_fronto_parallel_square() {
        let k = CameraIntrinsics::default();
        let pose = solve_planar_pnp(&MARKER_OBJECT_POINTS, &square(270.0, 130.0, 100.0), &k).unwrap();

        assert!(pose.rvec.norm() < 1e-6, "rvec {:?}", pose.rvec);
        assert!((pose.tvec.z - 8.0).abs() < 1e-6, "tvec {:?}", pose.tvec);
        assert!((pose.tvec.x - (270.0 - 640.0) / 800.0 * 8.0).abs() < 1e-6);
        assert!((pose.tvec.y - (130.0 - 360.0) / 800.0 * 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_depth_decreases_as_marker_grows() {
        let k = CameraIntrinsics::default();
        let depths: Vec<f64> = [40.0, 80.0, 160.0, 320.0]
            .iter()
            .map(|&side| {
                solve_planar_pnp(&MARKER_OBJECT_POINTS, &square(500.0, 200.0, side), &k)
                    .unwrap()
                    .tvec
                    .z
            })
            .collect();
        assert!(depths.windows(2).all(|w| w[0] > w[1]), "depths {:?}", depths);
        assert!(depths.iter().all(|&z| z > 0.0));
    }

    #[test]
    fn test_recovers_tilted_pose() {
        let k = CameraIntrinsics::default();
        let truth = Pose::new(Vector3::new(0.3, -0.2, 0.1), Vector3::new(-0.4, -0.3, 6.0));
        let image: [[f64; 2]; 4] = std::array::from_fn(|i| {
            let p = project_point(&MARKER_OBJECT_POINTS[i], &truth, &k).unwrap();
            [p.x, p.y]
        });

        let pose = solve_planar_pnp(&MARKER_OBJECT_POINTS, &image, &k).unwrap();
        assert!(reprojection_error(&MARKER_OBJECT_POINTS, &image, &pose, &k) < 1e-6);
        assert!((pose.tvec - truth.tvec).norm() < 1e-4, "tvec {:?}", pose.tvec);
    }

    #[test]
    fn test_collinear_points_are_degenerate() {
        let k = CameraIntrinsics::default();
        let image = [[100.0, 100.0], [150.0, 100.0], [200.0, 100.0], [250.0, 100.0]];
        assert!(matches!(
            solve_planar_pnp(&MARKER_OBJECT_POINTS, &image, &k),
            Err(PipelineError::DegeneratePoseSolve(_))
        ));
    }

    #[test]
    fn test_invalid_intrinsics() {
        let k = CameraIntrinsics { fx: 0.0, ..CameraIntrinsics::default() };
        assert!(matches!(
            solve_planar_pnp(&MARKER_OBJECT_POINTS, &square(0.0, 0.0, 10.0), &k),
            Err(PipelineError::InvalidIntrinsics(_))
        ));
    }

    #[test]
    fn test_nearly_square_box_solves() {
        // Typical edge-detector box around a drawn 100 px square.
        let k = CameraIntrinsics::default();
        let pose = solve_planar_pnp(&MARKER_OBJECT_POINTS, &rect(270.0, 129.0, 100.0, 102.0), &k)
            .unwrap();

        assert!(pose.is_finite(), "pose {:?}", pose);
        assert!(pose.tvec.z > 7.0 && pose.tvec.z < 9.0, "tvec {:?}", pose.tvec);
        assert!(pose.rvec.norm() < 0.5, "rvec {:?}", pose.rvec);
    }

    #[test]
    fn test_every_axis_aligned_box_solves() {
        let k = CameraIntrinsics::default();
        let mut failed = Vec::new();
        for w in (20..200).step_by(7) {
            for h in (20..200).step_by(7) {
                for (x, y) in [(270.0, 129.0), (50.0, 30.0), (900.0, 500.0)] {
                    let image = rect(x, y, w as f64, h as f64);
                    match solve_planar_pnp(&MARKER_OBJECT_POINTS, &image, &k) {
                        Ok(pose) if pose.is_finite() && pose.tvec.z > 0.0 => {}
                        other => failed.push((x, y, w, h, format!("{:?}", other))),
                    }
                }
            }
        }
        assert!(failed.is_empty(), "{} boxes failed, first {:?}", failed.len(), failed.first());
    }
}
