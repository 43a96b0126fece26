use glam::{
  Quat,
  Vec3,
};

/// The interpolation between two neighbouring keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HalaInterpolation {
  #[default]
  Linear,
  Step,
}

/// A value at a point in time of a keyframe track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HalaKey<T> {
  pub time: f64,
  pub value: T,
}

/// A keyed vector value, used for position and scale tracks.
pub type HalaVectorKey = HalaKey<Vec3>;

/// A keyed rotation value.
pub type HalaQuatKey = HalaKey<Quat>;

/// The animated tracks of one node.
/// Key times are in ticks and sorted ascending.
#[derive(Clone, Debug, Default)]
pub struct HalaNodeChannel {
  pub node_name: String,
  pub position_keys: Vec<HalaVectorKey>,
  pub rotation_keys: Vec<HalaQuatKey>,
  pub scaling_keys: Vec<HalaVectorKey>,
  pub interpolation: HalaInterpolation,
}

/// An imported keyframe animation clip.
#[derive(Clone, Debug, Default)]
pub struct HalaAnimation {
  pub name: String,
  /// Zero when the source did not specify a tick rate.
  pub ticks_per_second: f64,
  pub duration_in_ticks: f64,
  pub channels: Vec<HalaNodeChannel>,
}

impl HalaNodeChannel {

  /// Create an empty channel for the named node.
  /// param node_name: The target node name.
  /// return: The channel.
  pub fn new(node_name: &str) -> Self {
    Self {
      node_name: node_name.to_owned(),
      ..Default::default()
    }
  }

  pub fn last_key_time(&self) -> f64 {
    let positions = self.position_keys.iter().map(|k| k.time);
    let rotations = self.rotation_keys.iter().map(|k| k.time);
    let scalings = self.scaling_keys.iter().map(|k| k.time);
    positions.chain(rotations).chain(scalings).fold(0.0_f64, f64::max)
  }

}

impl HalaAnimation {

  /// Create an animation whose duration covers the last key of every channel.
  /// param name: The clip name.
  /// param ticks_per_second: The tick rate, zero if unknown.
  /// param channels: The node channels.
  /// return: The animation.
  pub fn new(name: &str, ticks_per_second: f64, channels: Vec<HalaNodeChannel>) -> Self {
    let duration_in_ticks = channels.iter()
      .map(HalaNodeChannel::last_key_time)
      .fold(0.0_f64, f64::max);
    Self {
      name: name.to_owned(),
      ticks_per_second,
      duration_in_ticks,
      channels,
    }
  }

}
