use glam::{
  Mat4,
  Vec3,
};

use crate::config::HalaLightConfig;

/// A light casting shadows through an orthographic depth map.
#[derive(Clone, Debug)]
pub struct HalaShadowLight {
  pub position: Vec3,
  pub target: Vec3,
  pub width: f32,
  pub height: f32,
  pub znear: f32,
  pub zfar: f32,
  pub map_size: u32,
}

impl HalaShadowLight {

  /// Create a new shadow light aimed at the origin.
  /// param config: The light configuration.
  /// return: The light.
  pub fn new(config: &HalaLightConfig) -> Self {
    Self {
      position: config.shadow_position,
      target: Vec3::ZERO,
      width: config.shadow_width,
      height: config.shadow_height,
      znear: config.shadow_znear,
      zfar: config.shadow_zfar,
      map_size: config.shadow_map_size,
    }
  }

  pub fn get_view_matrix(&self) -> Mat4 {
    Mat4::look_at_rh(self.position, self.target, Vec3::Y)
  }

  pub fn get_proj_matrix(&self) -> Mat4 {
    let (half_width, half_height) = (self.width * 0.5, self.height * 0.5);
    Mat4::orthographic_rh_gl(-half_width, half_width, -half_height, half_height, self.znear, self.zfar)
  }

  /// Get the matrix taking world positions into the light's clip space.
  pub fn light_space_matrix(&self) -> Mat4 {
    self.get_proj_matrix() * self.get_view_matrix()
  }

}
