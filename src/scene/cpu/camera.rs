use glam::{
  Mat4,
  Vec3,
};

use crate::config::HalaCameraConfig;
use crate::scene::HalaBounds;

/// A camera orbiting a target at a fixed height.
#[derive(Clone, Debug)]
pub struct HalaOrbitCamera {
  pub target: Vec3,
  /// Horizontal angle in degrees.
  pub yaw: f32,
  pub radius: f32,
  pub fixed_y: f32,
  pub min_radius: f32,
  pub max_radius: f32,

  pub aspect: f32,
  /// Vertical field of view in degrees.
  pub fov: f32,
  pub znear: f32,
  pub zfar: f32,
}

/// The implementation of the orbit camera.
impl HalaOrbitCamera {

  /// Create a new orbit camera.
  /// param config: The camera configuration.
  /// param aspect: The viewport aspect ratio.
  /// return: The camera.
  pub fn new(config: &HalaCameraConfig, aspect: f32) -> Self {
    Self {
      target: config.target,
      yaw: config.yaw,
      radius: config.radius.clamp(config.min_radius, config.max_radius),
      fixed_y: config.height,
      min_radius: config.min_radius,
      max_radius: config.max_radius,
      aspect,
      fov: config.fov,
      znear: config.znear,
      zfar: config.zfar,
    }
  }

  /// Get the eye position on the orbit.
  pub fn position(&self) -> Vec3 {
    let yaw = self.yaw.to_radians();
    Vec3::new(
      self.target.x + self.radius * yaw.cos(),
      self.fixed_y,
      self.target.z + self.radius * yaw.sin(),
    )
  }

  pub fn up(&self) -> Vec3 {
    Vec3::Y
  }

  pub fn get_view_matrix(&self) -> Mat4 {
    Mat4::look_at_rh(self.position(), self.target, self.up())
  }

  pub fn get_proj_matrix(&self) -> Mat4 {
    Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.znear, self.zfar)
  }

  pub fn rotate_left(&mut self, delta_yaw: f32) {
    self.yaw -= delta_yaw;
  }

  pub fn rotate_right(&mut self, delta_yaw: f32) {
    self.yaw += delta_yaw;
  }

  pub fn zoom_in(&mut self, delta_radius: f32) {
    self.radius = (self.radius - delta_radius).clamp(self.min_radius, self.max_radius);
  }

  pub fn zoom_out(&mut self, delta_radius: f32) {
    self.radius = (self.radius + delta_radius).clamp(self.min_radius, self.max_radius);
  }

  /// Update the aspect ratio after a resize.
  /// param width: The viewport width.
  /// param height: The viewport height.
  pub fn resize(&mut self, width: u32, height: u32) {
    if height > 0 {
      self.aspect = width as f32 / height as f32;
    }
  }

  /// Aim at the center of the bounds from a distance matching their size.
  /// param bounds: The world space bounds to frame.
  pub fn frame_bounds(&mut self, bounds: &HalaBounds) {
    self.target = bounds.center;
    self.radius = (bounds.get_diagonal() * 0.9)
      .max(0.5)
      .clamp(self.min_radius, self.max_radius);
  }

}

#[cfg(test)]
mod tests {
  use super::*;

  fn camera() -> HalaOrbitCamera {
    HalaOrbitCamera::new(&HalaCameraConfig::default(), 16.0 / 9.0)
  }

  #[test]
  fn default_camera_looks_from_negative_z() {
    let camera = camera();
    let position = camera.position();
    assert!(position.abs_diff_eq(Vec3::new(0.0, 2.0, -10.0), 1e-4), "position {position}");
    let eye_in_view = camera.get_view_matrix().transform_point3(camera.target);
    assert!(eye_in_view.z < 0.0);
  }

  #[test]
  fn zoom_is_clamped() {
    let mut camera = camera();
    camera.zoom_in(100.0);
    assert_eq!(camera.radius, camera.min_radius);
    camera.zoom_out(100.0);
    assert_eq!(camera.radius, camera.max_radius);
  }

  #[test]
  fn rotation_changes_yaw_in_opposite_directions() {
    let mut camera = camera();
    camera.rotate_left(30.0);
    assert_eq!(camera.yaw, -120.0);
    camera.rotate_right(45.0);
    assert_eq!(camera.yaw, -75.0);
  }

  #[test]
  fn framing_targets_bounds_center() {
    let mut camera = camera();
    let bounds = HalaBounds::from_min_max(Vec3::new(-3.0, 0.0, -1.0), Vec3::new(3.0, 2.0, 1.0));
    camera.frame_bounds(&bounds);
    assert!(camera.target.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    let expected = (bounds.get_diagonal() * 0.9).clamp(camera.min_radius, camera.max_radius);
    assert!((camera.radius - expected).abs() < 1e-5);
  }
}
