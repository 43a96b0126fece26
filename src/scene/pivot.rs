use std::collections::HashMap;

use glam::{
  Mat4,
  Vec3,
};

use super::cpu::scene::HalaScene;
use super::hierarchy::HalaTransformMap;

/// Compute the world space pivot of a node.
/// The pivot is the centroid of the node's mesh vertices in world space. A node without
/// vertices, or a name only present in the world map, yields the world translation. An unknown
/// name yields the origin.
/// param scene: The scene.
/// param node_name: The node name.
/// param world_transforms: The world transforms, usually resolved from the original locals.
/// return: The pivot point.
pub fn compute_pivot(scene: &HalaScene, node_name: &str, world_transforms: &HalaTransformMap) -> Vec3 {
  let node = match scene.find_node_by_name(node_name) {
    Some(node) => node,
    None => {
      return world_transforms.get(node_name)
        .map(|world| world.w_axis.truncate())
        .unwrap_or(Vec3::ZERO);
    }
  };

  let world = world_transforms.get(node_name).copied().unwrap_or(Mat4::IDENTITY);
  let (sum, total) = node.mesh_indices.iter()
    .filter_map(|&mesh_index| scene.meshes.get(mesh_index as usize))
    .flat_map(|mesh| mesh.positions.iter())
    .fold((Vec3::ZERO, 0_usize), |(sum, total), &position| {
      (sum + world.transform_point3(position), total + 1)
    });

  if total > 0 {
    sum / total as f32
  } else {
    world.w_axis.truncate()
  }
}

/// The pivots of a fixed set of nodes, computed once from the original transforms.
#[derive(Clone, Debug, Default)]
pub struct HalaPivotCache {
  pivots: HashMap<String, Vec3>,
}

impl HalaPivotCache {

  /// Compute the pivots of the named nodes.
  /// param scene: The scene.
  /// param node_names: The nodes to compute pivots for.
  /// param world_transforms: The world transforms of the rest pose.
  /// return: The cache.
  pub fn build<'a, I>(scene: &HalaScene, node_names: I, world_transforms: &HalaTransformMap) -> Self
    where I: IntoIterator<Item = &'a str>
  {
    let pivots = node_names.into_iter()
      .map(|name| (name.to_owned(), compute_pivot(scene, name, world_transforms)))
      .collect();
    Self { pivots }
  }

  pub fn get(&self, node_name: &str) -> Option<Vec3> {
    self.pivots.get(node_name).copied()
  }

  /// Get a cached pivot or compute and remember it.
  /// param scene: The scene.
  /// param node_name: The node name.
  /// param world_transforms: The world transforms of the rest pose.
  /// return: The pivot point.
  pub fn get_or_compute(&mut self, scene: &HalaScene, node_name: &str, world_transforms: &HalaTransformMap) -> Vec3 {
    if let Some(pivot) = self.get(node_name) {
      return pivot;
    }
    log::debug!("Pivot of \"{}\" not cached, computing it on demand.", node_name);
    let pivot = compute_pivot(scene, node_name, world_transforms);
    self.pivots.insert(node_name.to_owned(), pivot);
    pivot
  }

  pub fn len(&self) -> usize {
    self.pivots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pivots.is_empty()
  }

}
