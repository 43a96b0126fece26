use std::f32::consts::PI;

use glam::{
  Mat4,
  Vec3,
};

use crate::config::HalaPendulumConfig;
use crate::scene::cpu::scene::HalaScene;
use crate::scene::hierarchy::{
  HalaTransformMap,
  resolve_world_transforms,
};
use crate::scene::pivot::HalaPivotCache;

/// The outer arm currently swinging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalaSwingSide {
  Left,
  Right,
}

impl HalaSwingSide {

  pub fn toggled(self) -> Self {
    match self {
      HalaSwingSide::Left => HalaSwingSide::Right,
      HalaSwingSide::Right => HalaSwingSide::Left,
    }
  }

}

/// Whether the animation clock advances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalaAnimationState {
  Stopped,
  Running,
}

/// Build the matrix rotating about an axis through a world space pivot.
/// param pivot: The point the rotation keeps fixed.
/// param axis: The normalized rotation axis.
/// param angle: The angle in radians.
/// return: The matrix.
pub fn pivot_rotation(pivot: Vec3, axis: Vec3, angle: f32) -> Mat4 {
  Mat4::from_translation(pivot) * Mat4::from_axis_angle(axis, angle) * Mat4::from_translation(-pivot)
}

/// The scripted swing of a Newton's cradle rig.
/// Only one outer arm swings at a time; after every swing the momentum passes to the
/// opposite end. Interior arms receive a small jostle while an impact is transmitted.
pub struct HalaPendulumEngine {
  config: HalaPendulumConfig,
  state: HalaAnimationState,
  active_side: HalaSwingSide,
  phase: f32,

  original_transforms: HalaTransformMap,
  current_transforms: HalaTransformMap,
  original_world_transforms: HalaTransformMap,
  pivots: HalaPivotCache,
}

/// The Drop implementation of the pendulum engine.
impl Drop for HalaPendulumEngine {
  fn drop(&mut self) {
    log::debug!("A HalaPendulumEngine dropped.");
  }
}

/// The implementation of the pendulum engine.
impl HalaPendulumEngine {

  /// Create a new pendulum engine for a loaded scene.
  /// The rest pose and the hook pivots are captured once here.
  /// param scene: The scene holding the rig.
  /// param config: The rig and swing parameters.
  /// return: The engine.
  pub fn new(scene: &HalaScene, mut config: HalaPendulumConfig) -> Self {
    if config.swing_duration <= 0.0 {
      log::warn!("Swing duration {} is not positive, using 1.", config.swing_duration);
      config.swing_duration = 1.0;
    }
    config.swing_axis = config.swing_axis.try_normalize().unwrap_or_else(|| {
      log::warn!("Swing axis {} is degenerate, using +Z.", config.swing_axis);
      Vec3::Z
    });
    for group in config.groups.iter() {
      for name in group.node_names() {
        if scene.find_node(name).is_none() {
          log::warn!("Pendulum node \"{}\" is not in the scene, it will not be animated.", name);
        }
      }
    }

    let original_transforms = scene.original_local_transforms();
    let original_world_transforms = resolve_world_transforms(scene, &original_transforms);
    let pivots = HalaPivotCache::build(
      scene,
      config.groups.iter().map(|group| group.hook.as_str()),
      &original_world_transforms,
    );

    log::debug!("A HalaPendulumEngine created with {} groups.", config.groups.len());
    Self {
      config,
      state: HalaAnimationState::Stopped,
      active_side: HalaSwingSide::Left,
      phase: 0.0,
      current_transforms: original_transforms.clone(),
      original_transforms,
      original_world_transforms,
      pivots,
    }
  }

  pub fn state(&self) -> HalaAnimationState {
    self.state
  }

  pub fn is_running(&self) -> bool {
    self.state == HalaAnimationState::Running
  }

  pub fn active_side(&self) -> HalaSwingSide {
    self.active_side
  }

  /// Get the elapsed time within the current swing.
  pub fn phase(&self) -> f32 {
    self.phase
  }

  pub fn swing_duration(&self) -> f32 {
    self.config.swing_duration
  }

  pub fn config(&self) -> &HalaPendulumConfig {
    &self.config
  }

  /// Get the cached pivot of a hook node.
  pub fn pivot(&self, hook: &str) -> Option<Vec3> {
    self.pivots.get(hook)
  }

  /// The local transforms to draw with, refreshed by every running update.
  pub fn current_transforms(&self) -> &HalaTransformMap {
    &self.current_transforms
  }

  /// The rest pose captured when the engine was created.
  pub fn original_transforms(&self) -> &HalaTransformMap {
    &self.original_transforms
  }

  /// Flip between stopped and running.
  pub fn toggle(&mut self) {
    let running = !self.is_running();
    self.set_running(running);
  }

  pub fn set_running(&mut self, running: bool) {
    self.state = if running { HalaAnimationState::Running } else { HalaAnimationState::Stopped };
    log::info!("Cradle animation {}.", if running { "started" } else { "stopped" });
  }

  /// Put the rig back at rest on the left side.
  pub fn reset(&mut self) {
    self.phase = 0.0;
    self.active_side = HalaSwingSide::Left;
    self.current_transforms.clone_from(&self.original_transforms);
  }

  /// Advance the swing and recompute the pose. Does nothing while stopped.
  /// param scene: The scene the engine was created for.
  /// param delta_time: The elapsed time in seconds.
  pub fn update(&mut self, scene: &HalaScene, delta_time: f32) {
    if !self.is_running() {
      return;
    }

    self.advance(delta_time);
    self.apply_pose(scene);
  }

  /// Get the angular envelope of the active arm, zero at both ends of a swing.
  pub fn swing_factor(&self) -> f32 {
    let t = self.phase / self.config.swing_duration;
    -(t * PI).sin()
  }

  /// Get the rotation angle of every group, left to right.
  pub fn group_angles(&self) -> Vec<f32> {
    let count = self.config.groups.len();
    let mut angles = vec![0.0; count];
    if count == 0 {
      return angles;
    }

    let swing_factor = self.swing_factor();
    let base_angle = self.config.base_angle;
    match self.active_side {
      HalaSwingSide::Left => angles[0] = base_angle * swing_factor,
      HalaSwingSide::Right if count > 1 => angles[count - 1] = -base_angle * swing_factor,
      HalaSwingSide::Right => {},
    }

    // The interior arms jostle with the transmitted impact whichever side swings.
    let impact = -swing_factor;
    for (index, angle) in angles.iter_mut().enumerate().take(count.saturating_sub(1)).skip(1) {
      let amplitude = self.config.jostle_amplitudes.get(index - 1).copied().unwrap_or(0.0);
      *angle = impact * amplitude;
    }
    angles
  }

  fn advance(&mut self, delta_time: f32) {
    self.phase += delta_time.max(0.0);

    let duration = self.config.swing_duration;
    if self.phase > duration {
      let remainder = self.phase - duration;
      self.phase = if remainder < duration { remainder } else { 0.0 };
      self.active_side = self.active_side.toggled();
      log::debug!("Swing passed to the {:?} side.", self.active_side);
    }
  }

  /// Rebuild the current transforms from the rest pose plus this phase's rotations.
  fn apply_pose(&mut self, scene: &HalaScene) {
    let angles = self.group_angles();
    self.current_transforms.clone_from(&self.original_transforms);

    let axis = self.config.swing_axis;
    for (group, angle) in self.config.groups.iter().zip(angles) {
      if angle.abs() < self.config.rest_epsilon {
        continue;
      }

      let pivot = self.pivots.get_or_compute(scene, &group.hook, &self.original_world_transforms);
      let rotation = pivot_rotation(pivot, axis, angle);
      for name in group.node_names() {
        if let Some(original) = self.original_transforms.get(name) {
          self.current_transforms.insert(name.to_owned(), rotation * *original);
        }
      }
    }
  }

}
