use std::path::Path;

use glam::Mat4;

use crate::error::HalaCradleError;
use crate::config::HalaCradleConfig;
use crate::animation::{
  HalaAnimationState,
  HalaClipSampler,
  HalaPendulumEngine,
};
use crate::renderer::{
  HalaDrawCall,
  HalaDrawSource,
  collect_draw_calls,
};
use crate::scene::HalaBounds;
use crate::scene::cpu::image_data::{
  HalaImageData,
  HalaTextureSet,
};
use crate::scene::cpu::scene::HalaScene;
use crate::scene::hierarchy::HalaTransformMap;

/// What moves the cradle.
enum HalaCradleDriver {
  /// The scripted swing of the rig.
  Pendulum(HalaPendulumEngine),
  /// The first clip baked into the model.
  Clip {
    sampler: HalaClipSampler,
    state: HalaAnimationState,
    time: f64,
    transforms: HalaTransformMap,
  },
}

/// The cradle model and its animation.
pub struct HalaCradle {
  scene: HalaScene,
  driver: HalaCradleDriver,
}

/// Give every cradle mesh the wood or the metal texture by its name.
/// param scene: The cradle scene.
/// param config: The configuration holding the wood keywords.
/// param wood_texture: The wood texture handle.
/// param metal_texture: The metal texture handle.
pub fn assign_cradle_textures(scene: &mut HalaScene, config: &HalaCradleConfig, wood_texture: u32, metal_texture: u32) {
  for mesh in scene.meshes.iter_mut() {
    mesh.texture = Some(if config.is_wood_mesh(&mesh.name) { wood_texture } else { metal_texture });
  }
}

/// The implementation of the cradle.
impl HalaCradle {

  /// Load the cradle model and its textures.
  /// param path: The model path.
  /// param config: The application configuration.
  /// param textures: The texture set receiving the cradle textures.
  /// return: The cradle.
  pub fn load<P: AsRef<Path>>(path: P, config: &HalaCradleConfig, textures: &mut HalaTextureSet) -> Result<Self, HalaCradleError> {
    let mut scene = HalaScene::new(path)?;

    textures.adopt_scene_images(&mut scene);
    let wood_texture = textures.add(HalaImageData::new_with_file_or_fallback(config.asset_path(&config.wood_texture)));
    let metal_texture = textures.add(HalaImageData::new_with_file_or_fallback(config.asset_path(&config.metal_texture)));
    assign_cradle_textures(&mut scene, config, wood_texture, metal_texture);

    Ok(Self::from_scene(scene, config))
  }

  /// Wrap an already loaded scene.
  /// A scene with baked animation plays its first clip, otherwise the rig swings.
  /// param scene: The cradle scene.
  /// param config: The application configuration.
  /// return: The cradle.
  pub fn from_scene(scene: HalaScene, config: &HalaCradleConfig) -> Self {
    let driver = if scene.has_animations() {
      log::info!("The cradle plays its baked clip \"{}\".", scene.animations[0].name);
      HalaCradleDriver::Clip {
        sampler: HalaClipSampler::new(),
        state: HalaAnimationState::Stopped,
        time: 0.0,
        transforms: scene.original_local_transforms(),
      }
    } else {
      HalaCradleDriver::Pendulum(HalaPendulumEngine::new(&scene, config.pendulum.clone()))
    };

    Self {
      scene,
      driver,
    }
  }

  pub fn scene(&self) -> &HalaScene {
    &self.scene
  }

  /// Get the pendulum engine, None when a baked clip drives the cradle.
  pub fn engine(&self) -> Option<&HalaPendulumEngine> {
    match &self.driver {
      HalaCradleDriver::Pendulum(engine) => Some(engine),
      HalaCradleDriver::Clip { .. } => None,
    }
  }

  pub fn is_running(&self) -> bool {
    match &self.driver {
      HalaCradleDriver::Pendulum(engine) => engine.is_running(),
      HalaCradleDriver::Clip { state, .. } => *state == HalaAnimationState::Running,
    }
  }

  /// Pause or resume the animation.
  pub fn toggle(&mut self) {
    match &mut self.driver {
      HalaCradleDriver::Pendulum(engine) => engine.toggle(),
      HalaCradleDriver::Clip { state, .. } => {
        *state = match state {
          HalaAnimationState::Running => HalaAnimationState::Stopped,
          HalaAnimationState::Stopped => HalaAnimationState::Running,
        };
        log::info!("Cradle clip {:?}.", state);
      },
    }
  }

  /// Advance the animation.
  /// param delta_time: The elapsed time in seconds.
  pub fn update(&mut self, delta_time: f32) {
    match &mut self.driver {
      HalaCradleDriver::Pendulum(engine) => engine.update(&self.scene, delta_time),
      HalaCradleDriver::Clip { sampler, state, time, transforms } => {
        if *state != HalaAnimationState::Running {
          return;
        }
        *time += delta_time.max(0.0) as f64;
        if let Some(animation) = self.scene.animations.first() {
          sampler.sample(animation, *time, transforms);
        }
      },
    }
  }

  /// The local transforms to draw the cradle with.
  pub fn local_transforms(&self) -> &HalaTransformMap {
    match &self.driver {
      HalaCradleDriver::Pendulum(engine) => engine.current_transforms(),
      HalaCradleDriver::Clip { transforms, .. } => transforms,
    }
  }

  /// Get the world bounds of the cradle in its current pose.
  pub fn bounds(&self) -> Option<HalaBounds> {
    self.scene.world_bounds(self.local_transforms())
  }

  pub fn draw_calls(&self) -> Vec<HalaDrawCall> {
    collect_draw_calls(HalaDrawSource::Cradle, &self.scene, self.local_transforms(), Mat4::IDENTITY, None)
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{
    Quat,
    Vec3,
  };
  use crate::scene::cpu::{
    animation::{
      HalaAnimation,
      HalaKey,
      HalaNodeChannel,
    },
    mesh::HalaMesh,
    node::HalaNode,
  };

  fn column_scene(animations: Vec<HalaAnimation>) -> HalaScene {
    let triangle = |name: &str| HalaMesh::new(name, vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
    let nodes = vec![
      HalaNode::new("root", None, Mat4::IDENTITY),
      HalaNode::new("frame", Some(0), Mat4::IDENTITY).with_meshes(&[0]),
      HalaNode::new("ball", Some(0), Mat4::IDENTITY).with_meshes(&[1]),
    ];
    HalaScene::from_parts(nodes, vec![triangle("Column_0"), triangle("Ball_0")], animations, vec![]).unwrap()
  }

  #[test]
  fn wood_and_metal_textures_follow_mesh_names() {
    let mut scene = column_scene(vec![]);
    assign_cradle_textures(&mut scene, &HalaCradleConfig::default(), 4, 5);
    assert_eq!(scene.meshes[0].texture, Some(4));
    assert_eq!(scene.meshes[1].texture, Some(5));
  }

  #[test]
  fn baked_clip_drives_the_cradle() {
    let mut channel = HalaNodeChannel::new("ball");
    channel.position_keys = vec![
      HalaKey { time: 0.0, value: Vec3::ZERO },
      HalaKey { time: 2.0, value: Vec3::new(0.0, 2.0, 0.0) },
    ];
    channel.rotation_keys = vec![HalaKey { time: 0.0, value: Quat::IDENTITY }];
    let animation = HalaAnimation::new("bounce", 1.0, vec![channel]);
    let mut cradle = HalaCradle::from_scene(column_scene(vec![animation]), &HalaCradleConfig::default());
    assert!(cradle.engine().is_none());

    cradle.update(1.0);
    assert_eq!(cradle.local_transforms()["ball"], Mat4::IDENTITY);
    cradle.toggle();
    cradle.update(1.0);
    let translation = cradle.local_transforms()["ball"].w_axis.truncate();
    assert!(translation.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-5));
  }

  #[test]
  fn rig_without_clip_uses_the_pendulum() {
    let mut cradle = HalaCradle::from_scene(column_scene(vec![]), &HalaCradleConfig::default());
    assert!(cradle.engine().is_some());
    assert!(!cradle.is_running());
    cradle.toggle();
    cradle.update(0.25);
    assert!(cradle.is_running());
    assert_eq!(cradle.draw_calls().len(), 2);
    assert!(cradle.bounds().is_some());
  }
}
