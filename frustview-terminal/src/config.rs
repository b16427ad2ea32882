/// Viewer configuration.
///
/// Scene layout for the terminal viewer: where the viewing camera sits,
/// which camera's frustum is drawn, and where the model is placed. Every
/// field has a default, so a config file only needs the values it changes.
use std::path::Path;

use frustview_core::{Camera, ModelTransform};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::AppError;

/// The camera the scene is viewed through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewCameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Height of a terminal cell divided by its width.
    pub cell_aspect: f32,
}

impl Default for ViewCameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 3.4 * 1.3, 10.0 * 1.3],
            target: [-10.0 / 3.0, 0.0, 0.0],
            fov_degrees: 30.0,
            near: 1.0,
            far: 500.0,
            cell_aspect: 2.0,
        }
    }
}

impl ViewCameraConfig {
    /// Build the camera for a terminal of `width` x `height` cells.
    pub fn camera(&self, width: u16, height: u16) -> Camera {
        Camera {
            fov: self.fov_degrees.to_radians(),
            aspect: f32::from(width) / (f32::from(height.max(1)) * self.cell_aspect),
            near: self.near,
            far: self.far,
            ..Camera::looking_at(Point3::from(self.position), Point3::from(self.target))
        }
    }
}

/// The camera whose view volume is drawn as a wireframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropCameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PropCameraConfig {
    fn default() -> Self {
        Self {
            position: [-10.0, 0.0, 0.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            aspect: 1.0,
            near: 1.0,
            far: 8.0,
        }
    }
}

impl PropCameraConfig {
    pub fn camera(&self) -> Camera {
        Camera {
            fov: self.fov_degrees.to_radians(),
            aspect: self.aspect,
            near: self.near,
            far: self.far,
            ..Camera::looking_at(Point3::from(self.position), Point3::from(self.target))
        }
    }
}

/// Placement of the loaded mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub offset: [f32; 3],
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            offset: [-10.0 / 3.0, 0.0, 0.0],
            scale: 1.0,
        }
    }
}

impl ModelConfig {
    pub fn transform(&self) -> ModelTransform {
        ModelTransform::new(Vector3::from(self.offset), self.scale)
    }
}

/// Full viewer configuration, usually read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: ViewCameraConfig,
    pub prop_camera: PropCameraConfig,
    pub model: ModelConfig,
    pub render: RenderConfig,
}

/// Frame pacing and animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub target_fps: u32,
    /// Yaw added to the model every frame, radians.
    pub spin_speed: f32,
    pub wireframe: bool,
    pub show_frustum: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            spin_speed: 0.0,
            wireframe: false,
            show_frustum: true,
        }
    }
}

impl ViewerConfig {
    /// Read a config file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(content)?)
    }
}
