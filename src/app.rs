use glam::Mat4;
use winit::event::WindowEvent;
use winit::keyboard::{
  KeyCode,
  PhysicalKey,
};

use crate::config::HalaCradleConfig;
use crate::cradle::HalaCradle;
use crate::input::HalaCradleInput;
use crate::renderer::{
  HalaDrawCall,
  HalaDrawSource,
  HalaFrame,
  HalaGlobalUniform,
  collect_draw_calls,
};
use crate::scene::cpu::camera::HalaOrbitCamera;
use crate::scene::cpu::image_data::{
  HalaImageData,
  HalaTextureSet,
};
use crate::scene::cpu::light::HalaShadowLight;
use crate::scene::cpu::scene::HalaScene;
use crate::scene::cpu::table::HalaTable;
use crate::scene::hierarchy::HalaTransformMap;

/// The cradle viewer: a table, a lamp and the cradle under one shadow casting light.
pub struct HalaCradleApp {
  pub config: HalaCradleConfig,
  pub camera: HalaOrbitCamera,
  pub light: HalaShadowLight,
  pub table: HalaTable,
  pub textures: HalaTextureSet,
  pub input: HalaCradleInput,

  table_texture: u32,
  lamp_texture: u32,
  lamp: Option<HalaScene>,
  cradle: Option<HalaCradle>,
}

/// The Drop implementation of the application.
impl Drop for HalaCradleApp {
  fn drop(&mut self) {
    log::debug!("A HalaCradleApp dropped.");
  }
}

/// The implementation of the application.
impl HalaCradleApp {

  /// Create the application and load its assets.
  /// Missing models are reported and skipped, missing textures use the fallback texel.
  /// param config: The configuration.
  /// param width: The viewport width.
  /// param height: The viewport height.
  /// return: The application.
  pub fn new(config: HalaCradleConfig, width: u32, height: u32) -> Self {
    let mut textures = HalaTextureSet::default();
    let table_texture = textures.add(HalaImageData::new_with_file_or_fallback(config.asset_path(&config.table_texture)));
    let lamp_texture = textures.add(HalaImageData::new_with_file_or_fallback(config.asset_path(&config.lamp_texture)));

    let lamp = match HalaScene::new(config.asset_path(&config.lamp_model)) {
      Ok(mut lamp) => {
        textures.adopt_scene_images(&mut lamp);
        Some(lamp)
      },
      Err(err) => {
        log::warn!("{} The lamp will not be drawn.", err);
        None
      }
    };

    let cradle = match HalaCradle::load(config.asset_path(&config.cradle_model), &config, &mut textures) {
      Ok(cradle) => Some(cradle),
      Err(err) => {
        log::warn!("{} The cradle will not be drawn.", err);
        None
      }
    };

    Self::with_parts(config, width, height, textures, table_texture, lamp_texture, lamp, cradle)
  }

  /// Create the application from loaded parts.
  /// param config: The configuration.
  /// param width: The viewport width.
  /// param height: The viewport height.
  /// param cradle: The cradle, if any.
  /// return: The application.
  pub fn from_cradle(config: HalaCradleConfig, width: u32, height: u32, cradle: Option<HalaCradle>) -> Self {
    let mut textures = HalaTextureSet::default();
    let table_texture = textures.add(HalaImageData::fallback());
    let lamp_texture = textures.add(HalaImageData::fallback());
    Self::with_parts(config, width, height, textures, table_texture, lamp_texture, None, cradle)
  }

  #[allow(clippy::too_many_arguments)]
  fn with_parts(
    config: HalaCradleConfig,
    width: u32,
    height: u32,
    textures: HalaTextureSet,
    table_texture: u32,
    lamp_texture: u32,
    lamp: Option<HalaScene>,
    cradle: Option<HalaCradle>,
  ) -> Self {
    let mut camera = HalaOrbitCamera::new(&config.camera, 1.0);
    camera.resize(width, height);
    if let Some(bounds) = cradle.as_ref().and_then(HalaCradle::bounds) {
      camera.frame_bounds(&bounds);
    }
    let light = HalaShadowLight::new(&config.light);

    log::debug!("A HalaCradleApp created with {} textures.", textures.len());
    Self {
      config,
      camera,
      light,
      table: HalaTable::new(),
      textures,
      input: HalaCradleInput::new(),
      table_texture,
      lamp_texture,
      lamp,
      cradle,
    }
  }

  pub fn cradle(&self) -> Option<&HalaCradle> {
    self.cradle.as_ref()
  }

  pub fn lamp(&self) -> Option<&HalaScene> {
    self.lamp.as_ref()
  }

  pub fn should_exit(&self) -> bool {
    self.input.exit_requested
  }

  pub fn on_key(&mut self, key_code: KeyCode, state: winit::event::ElementState) {
    self.input.on_key(key_code, state);
  }

  /// Feed a window event.
  /// param event: The winit window event.
  pub fn on_window_event(&mut self, event: &WindowEvent) {
    match event {
      WindowEvent::KeyboardInput { event, .. } => {
        if let PhysicalKey::Code(key_code) = event.physical_key {
          self.on_key(key_code, event.state);
        }
      },
      WindowEvent::Resized(size) => self.camera.resize(size.width, size.height),
      WindowEvent::CloseRequested => self.input.exit_requested = true,
      _ => {},
    }
  }

  /// Apply the input and advance the animation.
  /// param delta_time: The elapsed time in seconds.
  pub fn update(&mut self, delta_time: f32) {
    let rotate = self.config.camera.rotate_speed * delta_time;
    let zoom = self.config.camera.zoom_speed * delta_time;
    if self.input.rotate_left {
      self.camera.rotate_left(rotate);
    }
    if self.input.rotate_right {
      self.camera.rotate_right(rotate);
    }
    if self.input.zoom_in {
      self.camera.zoom_in(zoom);
    }
    if self.input.zoom_out {
      self.camera.zoom_out(zoom);
    }

    let toggle = self.input.take_toggle();
    if let Some(cradle) = self.cradle.as_mut() {
      if toggle {
        cradle.toggle();
      }
      cradle.update(delta_time);
    }
  }

  /// Build the frame for a renderer.
  /// return: The frame.
  pub fn frame(&self) -> HalaFrame {
    let mut draw_calls: Vec<HalaDrawCall> = self.table.part_transforms()
      .enumerate()
      .map(|(part_index, world_transform)| HalaDrawCall {
        source: HalaDrawSource::Table,
        node_index: part_index as u32,
        mesh_index: 0,
        world_transform,
        texture: Some(self.table_texture),
      })
      .collect();

    if let Some(lamp) = self.lamp.as_ref() {
      draw_calls.extend(collect_draw_calls(
        HalaDrawSource::Lamp,
        lamp,
        &HalaTransformMap::new(),
        Mat4::from_translation(self.config.lamp_position),
        Some(self.lamp_texture),
      ));
    }
    if let Some(cradle) = self.cradle.as_ref() {
      draw_calls.extend(cradle.draw_calls());
    }

    HalaFrame {
      camera: HalaGlobalUniform::new(self.camera.get_view_matrix(), self.camera.get_proj_matrix()),
      camera_position: self.camera.position(),
      light: HalaGlobalUniform::new(self.light.get_view_matrix(), self.light.get_proj_matrix()),
      light_position: self.config.light.shading_position,
      draw_calls,
    }
  }

}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::Vec3;
  use winit::event::ElementState;

  use crate::scene::cpu::{
    mesh::HalaMesh,
    node::HalaNode,
  };

  fn missing_assets_config() -> HalaCradleConfig {
    HalaCradleConfig {
      assets_dir: "no/such/assets".into(),
      ..Default::default()
    }
  }

  #[test]
  fn missing_assets_leave_an_idle_app() {
    let mut app = HalaCradleApp::new(missing_assets_config(), 800, 600);
    assert!(app.cradle().is_none());
    assert!(app.lamp().is_none());
    app.update(0.1);
    let frame = app.frame();
    assert_eq!(frame.draw_calls.len(), 5);
    assert!(frame.draw_calls.iter().all(|draw_call| draw_call.source == HalaDrawSource::Table));
  }

  #[test]
  fn camera_keys_move_the_camera() {
    let mut app = HalaCradleApp::from_cradle(HalaCradleConfig::default(), 800, 600, None);
    let yaw = app.camera.yaw;
    app.on_key(KeyCode::KeyE, ElementState::Pressed);
    app.update(0.5);
    assert!(app.camera.yaw != yaw);
    app.on_key(KeyCode::KeyE, ElementState::Released);
    app.on_key(KeyCode::Minus, ElementState::Pressed);
    for _ in 0..100 {
      app.update(0.5);
    }
    assert_eq!(app.camera.radius, app.camera.max_radius);
  }

  #[test]
  fn space_starts_the_cradle() {
    let triangle = HalaMesh::new("Ball_0", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
    let nodes = vec![
      HalaNode::new("root", None, Mat4::IDENTITY),
      HalaNode::new("ball", Some(0), Mat4::IDENTITY).with_meshes(&[0]),
    ];
    let scene = HalaScene::from_parts(nodes, vec![triangle], vec![], vec![]).unwrap();
    let config = HalaCradleConfig::default();
    let cradle = HalaCradle::from_scene(scene, &config);
    let mut app = HalaCradleApp::from_cradle(config, 800, 600, Some(cradle));

    app.on_key(KeyCode::Space, ElementState::Pressed);
    app.update(0.1);
    app.update(0.1);
    let cradle = app.cradle().unwrap();
    assert!(cradle.is_running());
    assert!((cradle.engine().unwrap().phase() - 0.2).abs() < 1e-6);
    assert_eq!(app.frame().draw_calls.len(), 6);
  }
}
