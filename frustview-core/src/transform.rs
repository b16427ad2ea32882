/// Model placement: translation, uniform scale and an orbit-style rotation
use nalgebra::{Matrix3, Matrix4, Vector3};

/// Placement of the static mesh in the world.
///
/// The mesh buffer itself is never rewritten; only this matrix changes
/// from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vector3<f32>,
    pub scale: f32,
    /// Rotation about the x axis, radians
    pub pitch: f32,
    /// Rotation about the y axis, radians
    pub yaw: f32,
}

impl ModelTransform {
    pub fn new(translation: Vector3<f32>, scale: f32) -> Self {
        Self {
            translation,
            scale,
            pitch: 0.0,
            yaw: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, d_pitch: f32, d_yaw: f32) {
        self.pitch += d_pitch;
        self.yaw += d_yaw;
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.pitch, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.yaw, 0.0));
        ry * rx
    }

    /// Translation * rotation * scale
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.translation)
            * self.rotation_matrix()
            * Matrix4::new_scaling(self.scale)
    }

    /// Inverse-transpose of the linear part, for transforming normals.
    ///
    /// Falls back to identity for a zero scale.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let linear: Matrix3<f32> = self.matrix().fixed_view::<3, 3>(0, 0).into_owned();
        linear
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix3::identity)
    }
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self::new(Vector3::zeros(), 1.0)
    }
}

/// Create a model-view-projection matrix
pub fn mvp_matrix(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> Matrix4<f32> {
    projection * view * model
}
