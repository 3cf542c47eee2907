//! Marker pose estimation and cube overlay module
//!
//! Solves the pose of a unit-square marker from its image corners, projects
//! a unit cube standing on it, and draws the cube as a wireframe.

mod homography;
mod overlay;
mod projection;
mod solver;
pub mod types;

pub use homography::estimate_homography_dlt;
pub use overlay::{OverlayStyle, draw_cube, draw_line, estimate_and_overlay, estimate_pose};
pub use projection::{project_point, project_points, reprojection_error};
pub use solver::solve_planar_pnp;
pub use types::{CUBE_MODEL, CameraIntrinsics, MARKER_OBJECT_POINTS, Pose, ProjectedPoints};
