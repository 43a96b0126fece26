use std::collections::HashMap;

use glam::{
  Mat4,
  Quat,
  Vec3,
};

use crate::scene::cpu::animation::{
  HalaAnimation,
  HalaInterpolation,
  HalaKey,
  HalaNodeChannel,
};
use crate::scene::hierarchy::HalaTransformMap;

/// The tick rate used when a clip does not specify one.
pub const DEFAULT_TICKS_PER_SECOND: f64 = 25.0;

/// Map an application time onto the looping timeline of a clip.
/// param animation: The clip.
/// param time_in_seconds: The application time.
/// return: The clip local time in ticks, within [0, duration).
pub fn clip_local_time(animation: &HalaAnimation, time_in_seconds: f64) -> f64 {
  let ticks_per_second = if animation.ticks_per_second > 0.0 {
    animation.ticks_per_second
  } else {
    DEFAULT_TICKS_PER_SECOND
  };
  let duration = if animation.duration_in_ticks > 0.0 {
    animation.duration_in_ticks
  } else {
    1.0
  };
  (time_in_seconds * ticks_per_second).rem_euclid(duration)
}

/// A value that can be blended between two keys.
pub trait HalaInterpolate: Copy {
  /// The value of an empty track.
  fn identity() -> Self;

  fn interpolate(start: Self, end: Self, factor: f32) -> Self;
}

impl HalaInterpolate for Vec3 {
  fn identity() -> Self {
    Vec3::ZERO
  }

  fn interpolate(start: Self, end: Self, factor: f32) -> Self {
    start.lerp(end, factor)
  }
}

impl HalaInterpolate for Quat {
  fn identity() -> Self {
    Quat::IDENTITY
  }

  fn interpolate(start: Self, end: Self, factor: f32) -> Self {
    start.slerp(end, factor).normalize()
  }
}

/// Remembers the last key segment of a track, so forward playback scans from there.
#[derive(Clone, Copy, Debug, Default)]
pub struct HalaKeyCursor {
  last_index: usize,
}

impl HalaKeyCursor {

  pub fn reset(&mut self) {
    self.last_index = 0;
  }

  /// Find the index of the key starting the segment containing the time.
  /// param keys: The keys, sorted by time.
  /// param time: The clip local time.
  /// return: The segment start, the last key index past the end.
  pub fn seek<T>(&mut self, keys: &[HalaKey<T>], time: f64) -> usize {
    if keys.len() < 2 {
      self.last_index = 0;
      return 0;
    }

    // Time went backwards after a loop, scan from the start again.
    if self.last_index >= keys.len() || keys[self.last_index].time > time {
      self.last_index = 0;
    }

    let mut index = self.last_index;
    while index + 1 < keys.len() && keys[index + 1].time <= time {
      index += 1;
    }
    self.last_index = index;
    index
  }

}

/// Sample a track at a clip local time.
/// An empty track yields the identity, a single key is constant and times past the last key
/// hold the last value.
/// param keys: The keys, sorted by time.
/// param time: The clip local time.
/// param interpolation: The interpolation between keys.
/// param cursor: The cursor of the track.
/// return: The sampled value.
pub fn sample_keys<T: HalaInterpolate>(
  keys: &[HalaKey<T>],
  time: f64,
  interpolation: HalaInterpolation,
  cursor: &mut HalaKeyCursor,
) -> T {
  match keys.len() {
    0 => return T::identity(),
    1 => return keys[0].value,
    _ => {},
  }

  let index = cursor.seek(keys, time);
  let next_index = index + 1;
  if next_index >= keys.len() {
    return keys[index].value;
  }
  if interpolation == HalaInterpolation::Step {
    return keys[index].value;
  }

  let start = &keys[index];
  let end = &keys[next_index];
  let span = end.time - start.time;
  let factor = if span > 0.0 {
    ((time - start.time) / span).clamp(0.0, 1.0)
  } else {
    0.0
  };
  T::interpolate(start.value, end.value, factor as f32)
}

/// The cursors of one node channel.
#[derive(Clone, Copy, Debug, Default)]
struct HalaChannelCursors {
  position: HalaKeyCursor,
  rotation: HalaKeyCursor,
  scaling: HalaKeyCursor,
}

/// Sample a node channel into a local transform.
fn sample_channel_with(channel: &HalaNodeChannel, time: f64, cursors: &mut HalaChannelCursors) -> Mat4 {
  let position = sample_keys(&channel.position_keys, time, channel.interpolation, &mut cursors.position);
  let rotation = sample_keys(&channel.rotation_keys, time, channel.interpolation, &mut cursors.rotation);
  let scaling = if channel.scaling_keys.is_empty() {
    Vec3::ONE
  } else {
    sample_keys(&channel.scaling_keys, time, channel.interpolation, &mut cursors.scaling)
  };
  Mat4::from_scale_rotation_translation(scaling, rotation, position)
}

/// Sample a node channel into a local transform without keeping cursors.
/// param channel: The node channel.
/// param time: The clip local time in ticks.
/// return: The local transform, translation * rotation * scale.
pub fn sample_channel(channel: &HalaNodeChannel, time: f64) -> Mat4 {
  sample_channel_with(channel, time, &mut HalaChannelCursors::default())
}

/// Plays an imported clip, keeping one cursor per track between calls.
#[derive(Clone, Debug, Default)]
pub struct HalaClipSampler {
  cursors: HashMap<String, HalaChannelCursors>,
}

impl HalaClipSampler {

  pub fn new() -> Self {
    Self::default()
  }

  pub fn reset(&mut self) {
    self.cursors.clear();
  }

  /// Write the local transform of every animated node at an application time.
  /// Nodes without a channel are left as they are in the map.
  /// param animation: The clip.
  /// param time_in_seconds: The application time, looped over the clip duration.
  /// param transforms: The local transform map to update.
  pub fn sample(&mut self, animation: &HalaAnimation, time_in_seconds: f64, transforms: &mut HalaTransformMap) {
    let local_time = clip_local_time(animation, time_in_seconds);
    for channel in animation.channels.iter() {
      let cursors = self.cursors.entry(channel.node_name.clone()).or_default();
      transforms.insert(channel.node_name.clone(), sample_channel_with(channel, local_time, cursors));
    }
  }

}

/// Sample every channel of a clip into a fresh map.
/// param animation: The clip.
/// param time_in_seconds: The application time.
/// return: The local transforms of the animated nodes.
pub fn sample_animation(animation: &HalaAnimation, time_in_seconds: f64) -> HalaTransformMap {
  let local_time = clip_local_time(animation, time_in_seconds);
  animation.channels.iter()
    .map(|channel| (channel.node_name.clone(), sample_channel(channel, local_time)))
    .collect()
}
