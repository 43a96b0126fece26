use std::collections::HashMap;

use glam::Mat4;

use super::cpu::scene::HalaScene;

/// Node name to transform matrix.
pub type HalaTransformMap = HashMap<String, Mat4>;

/// Get the local transform of a node.
/// The override map wins for the node its name resolves to. Nodes shadowed by an earlier node
/// of the same name, and names missing from the map, use the stored transform.
/// param scene: The scene.
/// param node_index: The node index.
/// param local_transforms: The override map, may be partial.
/// return: The local transform.
pub fn local_transform_of(scene: &HalaScene, node_index: u32, local_transforms: &HalaTransformMap) -> Mat4 {
  match scene.node(node_index) {
    Some(node) if scene.find_node(&node.name) == Some(node_index) => {
      local_transforms.get(&node.name).copied().unwrap_or(node.local_transform)
    },
    Some(node) => node.local_transform,
    None => Mat4::IDENTITY,
  }
}

/// Compose the world transform of every node reachable from the root.
/// param scene: The scene.
/// param local_transforms: The local transform overrides.
/// return: The world transform map.
pub fn resolve_world_transforms(scene: &HalaScene, local_transforms: &HalaTransformMap) -> HalaTransformMap {
  resolve_world_transforms_with_root(scene, local_transforms, Mat4::IDENTITY)
}

/// Compose world transforms with the root placed by an extra parent matrix.
/// param scene: The scene.
/// param local_transforms: The local transform overrides.
/// param root_transform: The matrix the root is parented to.
/// return: The world transform map.
pub fn resolve_world_transforms_with_root(
  scene: &HalaScene,
  local_transforms: &HalaTransformMap,
  root_transform: Mat4,
) -> HalaTransformMap {
  let mut world_transforms = HalaTransformMap::with_capacity(scene.nodes.len());
  walk_depth_first(scene, local_transforms, root_transform, |index, world| {
    if let Some(node) = scene.node(index) {
      world_transforms.entry(node.name.clone()).or_insert(world);
    }
  });
  world_transforms
}

/// Walk the tree depth first, parent before children, and report each node's world transform.
/// Children are visited in their stored order.
/// param scene: The scene.
/// param local_transforms: The local transform overrides.
/// param root_transform: The matrix the root is parented to.
/// param visit: Called with the node index and its world transform.
pub fn walk_depth_first<F>(
  scene: &HalaScene,
  local_transforms: &HalaTransformMap,
  root_transform: Mat4,
  mut visit: F,
)
  where F: FnMut(u32, Mat4)
{
  if scene.nodes.is_empty() {
    return;
  }

  let mut stack = vec![(scene.root(), root_transform)];
  while let Some((index, parent_world)) = stack.pop() {
    let node = match scene.node(index) {
      Some(node) => node,
      None => continue,
    };
    let world = parent_world * local_transform_of(scene, index, local_transforms);
    visit(index, world);

    // Reverse so the first child is popped first.
    stack.extend(node.children.iter().rev().map(|&child| (child, world)));
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::{Quat, Vec3};
  use crate::scene::cpu::node::HalaNode;

  fn three_level_scene() -> HalaScene {
    let root = HalaNode::new("root", None, Mat4::from_scale(Vec3::splat(2.0)));
    let arm = HalaNode::new("arm", Some(0), Mat4::from_rotation_translation(Quat::from_rotation_z(0.5), Vec3::new(1.0, 0.0, 0.0)));
    let hand = HalaNode::new("hand", Some(1), Mat4::from_translation(Vec3::new(0.0, 3.0, -1.0)));
    HalaScene::from_parts(vec![root, arm, hand], vec![], vec![], vec![]).unwrap()
  }

  #[test]
  fn child_world_is_parent_world_times_local() {
    let scene = three_level_scene();
    let locals = scene.original_local_transforms();
    let world = resolve_world_transforms(&scene, &locals);

    assert_eq!(world.len(), 3);
    assert!(world["root"].abs_diff_eq(locals["root"], 1e-6));
    for node in scene.nodes.iter().skip(1) {
      let parent = &scene.nodes[node.parent.unwrap() as usize];
      let expected = world[&parent.name] * locals[&node.name];
      assert!(world[&node.name].abs_diff_eq(expected, 1e-5), "node {}", node.name);
    }
  }

  #[test]
  fn partial_override_map_falls_back_to_stored_transform() {
    let scene = three_level_scene();
    let mut overrides = HalaTransformMap::new();
    overrides.insert("arm".to_owned(), Mat4::IDENTITY);
    let world = resolve_world_transforms(&scene, &overrides);

    let root = scene.nodes[0].local_transform;
    let hand = scene.nodes[2].local_transform;
    assert!(world["arm"].abs_diff_eq(root, 1e-6));
    assert!(world["hand"].abs_diff_eq(root * hand, 1e-6));
  }

  #[test]
  fn parents_are_visited_before_children() {
    let scene = three_level_scene();
    let mut order = Vec::new();
    walk_depth_first(&scene, &HalaTransformMap::new(), Mat4::IDENTITY, |index, _| order.push(index));
    assert_eq!(order, vec![0, 1, 2]);
  }

  #[test]
  fn root_transform_places_the_whole_tree() {
    let scene = three_level_scene();
    let offset = Mat4::from_translation(Vec3::new(-1.3, -0.7, 0.0));
    let placed = resolve_world_transforms_with_root(&scene, &HalaTransformMap::new(), offset);
    let plain = resolve_world_transforms(&scene, &HalaTransformMap::new());
    assert!(placed["hand"].abs_diff_eq(offset * plain["hand"], 1e-5));
  }

  #[test]
  fn overrides_only_reach_the_first_node_of_a_name() {
    let nodes = vec![
      HalaNode::new("root", None, Mat4::IDENTITY),
      HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::X)),
      HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))),
    ];
    let scene = HalaScene::from_parts(nodes, vec![], vec![], vec![]).unwrap();

    let mut overrides = HalaTransformMap::new();
    overrides.insert("twin".to_owned(), Mat4::from_translation(Vec3::Y));
    assert_eq!(local_transform_of(&scene, 1, &overrides), Mat4::from_translation(Vec3::Y));
    assert_eq!(local_transform_of(&scene, 2, &overrides), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));

    let mut worlds = Vec::new();
    walk_depth_first(&scene, &scene.original_local_transforms(), Mat4::IDENTITY, |_, world| worlds.push(world.w_axis.truncate()));
    assert_eq!(worlds, vec![Vec3::ZERO, Vec3::X, Vec3::new(5.0, 0.0, 0.0)]);
  }
}
