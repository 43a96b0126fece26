use std::path::{
  Path,
  PathBuf,
};

use glam::Vec3;
use serde::{
  Deserialize,
  Serialize,
};

use crate::error::HalaCradleError;

fn default_as_one() -> f32 {
  1.0
}

fn default_base_angle() -> f32 {
  0.3
}

fn default_jostle_amplitudes() -> Vec<f32> {
  vec![0.05, 0.03, -0.05]
}

fn default_swing_axis() -> Vec3 {
  Vec3::Z
}

fn default_rest_epsilon() -> f32 {
  1e-5
}

/// The three nodes swinging together as one pendulum arm.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct HalaPendulumGroup {
  pub hook: String,
  pub ball: String,
  pub wire: String,
}

impl HalaPendulumGroup {

  pub fn new(hook: &str, ball: &str, wire: &str) -> Self {
    Self {
      hook: hook.to_owned(),
      ball: ball.to_owned(),
      wire: wire.to_owned(),
    }
  }

  /// Get the node names of the group, hook first.
  pub fn node_names(&self) -> [&str; 3] {
    [self.hook.as_str(), self.ball.as_str(), self.wire.as_str()]
  }

}

/// The rig and the swing timing of the cradle.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HalaPendulumConfig {
  /// Groups ordered left to right, the first and the last are the swinging outer arms.
  pub groups: Vec<HalaPendulumGroup>,
  #[serde(default = "default_as_one")]
  pub swing_duration: f32,
  #[serde(default = "default_base_angle")]
  pub base_angle: f32,
  /// Signed amplitudes of the interior groups, left to right.
  #[serde(default = "default_jostle_amplitudes")]
  pub jostle_amplitudes: Vec<f32>,
  #[serde(default = "default_swing_axis")]
  pub swing_axis: Vec3,
  #[serde(default = "default_rest_epsilon")]
  pub rest_epsilon: f32,
}

impl Default for HalaPendulumConfig {
  fn default() -> Self {
    Self {
      groups: vec![
        HalaPendulumGroup::new("polySurface19_Hook_0", "polySurface5_Ball_0", "polySurface10_Wire_0"),
        HalaPendulumGroup::new("polySurface18_Hook_0", "polySurface4_Ball_0", "polySurface9_Wire_0"),
        HalaPendulumGroup::new("polySurface17_Hook_0", "polySurface3_Ball_0", "polySurface7_Wire_0"),
        HalaPendulumGroup::new("polySurface16_Hook_0", "polySurface2_Ball_0", "polySurface8_Wire_0"),
        HalaPendulumGroup::new("polySurface20_Hook_0", "polySurface1_Ball_0", "polySurface6_Wire_0"),
      ],
      swing_duration: default_as_one(),
      base_angle: default_base_angle(),
      jostle_amplitudes: default_jostle_amplitudes(),
      swing_axis: default_swing_axis(),
      rest_epsilon: default_rest_epsilon(),
    }
  }
}

/// The initial state and limits of the orbit camera.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HalaCameraConfig {
  pub target: Vec3,
  pub height: f32,
  pub radius: f32,
  /// Degrees.
  pub yaw: f32,
  pub min_radius: f32,
  pub max_radius: f32,
  /// Vertical field of view in degrees.
  pub fov: f32,
  pub znear: f32,
  pub zfar: f32,
  /// Degrees per second.
  pub rotate_speed: f32,
  /// Units per second.
  pub zoom_speed: f32,
}

impl Default for HalaCameraConfig {
  fn default() -> Self {
    Self {
      target: Vec3::ZERO,
      height: 2.0,
      radius: 10.0,
      yaw: -90.0,
      min_radius: 4.0,
      max_radius: 12.0,
      fov: 45.0,
      znear: 0.1,
      zfar: 100.0,
      rotate_speed: 90.0,
      zoom_speed: 5.0,
    }
  }
}

/// The shadow casting light and the shading light.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HalaLightConfig {
  pub shadow_position: Vec3,
  pub shading_position: Vec3,
  pub shadow_width: f32,
  pub shadow_height: f32,
  pub shadow_znear: f32,
  pub shadow_zfar: f32,
  pub shadow_map_size: u32,
}

impl Default for HalaLightConfig {
  fn default() -> Self {
    Self {
      shadow_position: Vec3::new(-2.0, 4.0, 1.5),
      shading_position: Vec3::new(-1.3, -0.7, 0.0),
      shadow_width: 10.0,
      shadow_height: 10.0,
      shadow_znear: 1.0,
      shadow_zfar: 20.0,
      shadow_map_size: 2048,
    }
  }
}

/// The configuration of the cradle application.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct HalaCradleConfig {
  pub assets_dir: PathBuf,
  pub cradle_model: String,
  pub lamp_model: String,
  pub wood_texture: String,
  pub metal_texture: String,
  pub table_texture: String,
  pub lamp_texture: String,
  /// Cradle meshes whose name contains one of these (ignoring case) are wooden.
  pub wood_mesh_keywords: Vec<String>,
  pub lamp_position: Vec3,
  pub pendulum: HalaPendulumConfig,
  pub camera: HalaCameraConfig,
  pub light: HalaLightConfig,
}

impl Default for HalaCradleConfig {
  fn default() -> Self {
    Self {
      assets_dir: PathBuf::from("Assets"),
      cradle_model: "newtons_cradle.glb".to_owned(),
      lamp_model: "lamp.glb".to_owned(),
      wood_texture: "wood.jpg".to_owned(),
      metal_texture: "metal.jpg".to_owned(),
      table_texture: "woodTable.jpg".to_owned(),
      lamp_texture: "lamp.jpg".to_owned(),
      wood_mesh_keywords: vec!["Column".to_owned(), "Flor".to_owned()],
      lamp_position: Vec3::new(-1.3, -0.7, 0.0),
      pendulum: HalaPendulumConfig::default(),
      camera: HalaCameraConfig::default(),
      light: HalaLightConfig::default(),
    }
  }
}

/// The implementation of the configuration.
impl HalaCradleConfig {

  /// Load the configuration from a JSON file.
  /// Fields missing from the file keep their defaults.
  /// param path: The path of the JSON file.
  /// return: The configuration.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HalaCradleError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|err| HalaCradleError::new(&format!("Read config file \"{:?}\" failed.", path), Some(Box::new(err))))?;
    Self::from_json(&content)
  }

  /// Parse the configuration from a JSON string.
  /// param content: The JSON text.
  /// return: The configuration.
  pub fn from_json(content: &str) -> Result<Self, HalaCradleError> {
    let config = serde_json::from_str::<Self>(content)
      .map_err(|err| HalaCradleError::new("Parse config failed.", Some(Box::new(err))))?;
    Ok(config)
  }

  /// Resolve an asset file name against the assets directory.
  /// param file_name: The file name.
  /// return: The path.
  pub fn asset_path(&self, file_name: &str) -> PathBuf {
    self.assets_dir.join(file_name)
  }

  /// Check if a cradle mesh should use the wood texture.
  /// param mesh_name: The mesh name.
  /// return: True for wood, false for metal.
  pub fn is_wood_mesh(&self, mesh_name: &str) -> bool {
    let mesh_name = mesh_name.to_lowercase();
    self.wood_mesh_keywords.iter()
      .any(|keyword| mesh_name.contains(&keyword.to_lowercase()))
  }

}
