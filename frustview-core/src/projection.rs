/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::Result;
use crate::frustum::Frustum;
use crate::transform::mvp_matrix;

/// Right-handed OpenGL-style perspective matrix (clip z in [-1, 1]).
///
/// Never panics: a degenerate camera (zero fov, near == far) yields
/// non-finite entries.
pub fn perspective(aspect: f32, fovy: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (fovy / 2.0).tan();
    let depth = near - far;

    let mut m = Matrix4::zeros();
    m[(0, 0)] = f / aspect;
    m[(1, 1)] = f;
    m[(2, 2)] = (far + near) / depth;
    m[(2, 3)] = 2.0 * far * near / depth;
    m[(3, 2)] = -1.0;
    m
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 100.0,
        }
    }

    /// Camera at `position` looking at `target` with a y-up vector
    pub fn looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// This camera's view volume in world space
    pub fn frustum(&self) -> Result<Frustum> {
        Frustum::from_matrices(&self.projection_matrix(), &self.view_matrix())
    }

    /// Project a 3D point to screen space.
    ///
    /// Returns `(x, y, depth)` with depth in NDC, or `None` when the point
    /// is behind the camera or outside the near/far range. Points beyond the
    /// screen edges are still returned so that callers can clip primitives.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix());
        project_with(&mvp, point, width, height)
    }
}

/// Project with a precomputed model-view-projection matrix
pub fn project_with(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<(f32, f32, f32)> {
    let clip = mvp * point.to_homogeneous();

    // Prevent division by near-zero or negative w (behind the eye)
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    if !(-1.0..=1.0).contains(&depth) {
        return None;
    }

    // Convert to screen space
    let screen_x = (ndc_x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * height as f32;

    Some((screen_x, screen_y, depth))
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}
