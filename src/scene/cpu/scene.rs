use std::path::Path;
use std::collections::HashMap;

use glam::Vec3;

use crate::error::HalaCradleError;
use crate::scene::HalaBounds;
use crate::scene::hierarchy::{
  HalaTransformMap,
  resolve_world_transforms,
};
use super::node::HalaNode;
use super::mesh::HalaMesh;
use super::animation::HalaAnimation;
use super::image_data::HalaImageData;
use super::super::loader::HalaGltfLoader;

/// A scene is a tree of named nodes referencing a flat list of meshes.
/// The root is always the node at index 0.
pub struct HalaScene {
  pub nodes: Vec<HalaNode>,
  pub meshes: Vec<HalaMesh>,
  pub animations: Vec<HalaAnimation>,
  pub images: Vec<HalaImageData>,
  node_indices: HashMap<String, u32>,
}

/// The Drop implementation of the scene.
impl Drop for HalaScene {
  fn drop(&mut self) {
    log::debug!("A HalaScene dropped.");
  }
}

/// The implementation of the scene.
impl HalaScene {
  /// Create a new scene from glTF file.
  /// param path: The path to the glTF or GLB file.
  /// return: The scene.
  pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, HalaCradleError> {
    // Check the file extension.
    let path = path.as_ref();
    let extension = path.extension()
      .ok_or(HalaCradleError::new(&format!("Get file \"{:?}\" extension failed.", path), None))?;
    let scene = match extension.to_str().map(|ext| ext.to_ascii_lowercase()).as_deref() {
      // glTF file.
      Some("gltf") | Some("glb") => HalaGltfLoader::load(path),
      // Unsupported file.
      _ => Err(HalaCradleError::new(&format!("Unsupported file \"{:?}\".", path), None)),
    }?;

    log::debug!("A HalaScene created with {} nodes and {} meshes.", scene.nodes.len(), scene.meshes.len());
    Ok(scene)
  }

  /// Create a scene from an already built node arena.
  /// Only parent links are required, children lists are rebuilt.
  /// param nodes: The nodes, the root at index 0.
  /// param meshes: The meshes.
  /// param animations: The animation clips.
  /// param images: The embedded images.
  /// return: The scene.
  pub fn from_parts(
    nodes: Vec<HalaNode>,
    meshes: Vec<HalaMesh>,
    animations: Vec<HalaAnimation>,
    images: Vec<HalaImageData>,
  ) -> Result<Self, HalaCradleError> {
    let mut scene = Self {
      nodes,
      meshes,
      animations,
      images,
      node_indices: HashMap::new(),
    };
    scene.update_node_hierarchies()?;
    scene.update_node_indices();
    Ok(scene)
  }

  /// Get the root node index.
  pub fn root(&self) -> u32 {
    0
  }

  pub fn node(&self, index: u32) -> Option<&HalaNode> {
    self.nodes.get(index as usize)
  }

  /// Find a node by its exact name.
  /// param name: The node name.
  /// return: The node index.
  pub fn find_node(&self, name: &str) -> Option<u32> {
    self.node_indices.get(name).copied()
  }

  pub fn find_node_by_name(&self, name: &str) -> Option<&HalaNode> {
    self.find_node(name).and_then(|index| self.node(index))
  }

  pub fn has_animations(&self) -> bool {
    !self.animations.is_empty()
  }

  /// Capture the local transform of every addressable node keyed by name.
  /// A repeated name keeps the first node's transform, like the name index.
  /// return: The local transform map.
  pub fn original_local_transforms(&self) -> HalaTransformMap {
    let mut local_transforms = HalaTransformMap::with_capacity(self.node_indices.len());
    for node in self.nodes.iter() {
      local_transforms.entry(node.name.clone()).or_insert(node.local_transform);
    }
    local_transforms
  }

  /// Compute the world space bounds of all mesh vertices.
  /// param local_transforms: The local transforms to place the nodes with.
  /// return: The bounds, None if the scene has no vertices.
  pub fn world_bounds(&self, local_transforms: &HalaTransformMap) -> Option<HalaBounds> {
    let world_transforms = resolve_world_transforms(self, local_transforms);

    let mut bounds: Option<HalaBounds> = None;
    for node in self.nodes.iter() {
      let world = match world_transforms.get(&node.name) {
        Some(world) => *world,
        None => continue,
      };
      let points = node.mesh_indices.iter()
        .filter_map(|&mesh_index| self.meshes.get(mesh_index as usize))
        .flat_map(|mesh| mesh.positions.iter())
        .map(|&position| world.transform_point3(position));
      for point in points {
        match bounds.as_mut() {
          Some(bounds) => bounds.encapsulate_point(point),
          None => bounds = Some(HalaBounds::new(point, Vec3::ZERO)),
        }
      }
    }
    bounds
  }

  /// Update the node hierarchies.
  /// Validate the parent links and rebuild the children of each node.
  fn update_node_hierarchies(&mut self) -> Result<(), HalaCradleError> {
    if self.nodes.is_empty() {
      return Err(HalaCradleError::new("The scene has no nodes.", None));
    }
    if self.nodes[0].parent.is_some() {
      return Err(HalaCradleError::new(&format!("The root node \"{}\" has a parent.", self.nodes[0].name), None));
    }

    let mut temp_children = vec![vec![]; self.nodes.len()];
    for (idx, node) in self.nodes.iter().enumerate().skip(1) {
      match node.parent {
        Some(parent_idx) if (parent_idx as usize) < self.nodes.len() && parent_idx as usize != idx => {
          temp_children[parent_idx as usize].push(idx as u32);
        },
        Some(parent_idx) => {
          return Err(HalaCradleError::new(&format!("Node \"{}\" has invalid parent {}.", node.name, parent_idx), None));
        },
        None => {
          return Err(HalaCradleError::new(&format!("Node \"{}\" is a second root.", node.name), None));
        },
      }
    }

    // Every node reachable from the root, with a single parent each, means a tree.
    let mut visited = vec![false; self.nodes.len()];
    let mut stack = vec![0_usize];
    let mut reached = 0;
    while let Some(idx) = stack.pop() {
      if visited[idx] {
        continue;
      }
      visited[idx] = true;
      reached += 1;
      stack.extend(temp_children[idx].iter().map(|&child| child as usize));
    }
    if reached != self.nodes.len() {
      return Err(HalaCradleError::new("The node hierarchy contains a cycle.", None));
    }

    for (node, children) in self.nodes.iter_mut().zip(temp_children) {
      node.children = children;
    }
    Ok(())
  }

  /// Build the name to index lookup, first occurrence wins.
  fn update_node_indices(&mut self) {
    self.node_indices.clear();
    for (idx, node) in self.nodes.iter().enumerate() {
      if self.node_indices.contains_key(&node.name) {
        log::warn!("Duplicate node name \"{}\", only the first one is addressable.", node.name);
        continue;
      }
      self.node_indices.insert(node.name.clone(), idx as u32);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::Mat4;

  fn node(name: &str, parent: Option<u32>) -> HalaNode {
    HalaNode::new(name, parent, Mat4::IDENTITY)
  }

  #[test]
  fn children_are_rebuilt_from_parent_links() {
    let scene = HalaScene::from_parts(
      vec![node("root", None), node("a", Some(0)), node("b", Some(1)), node("c", Some(0))],
      vec![],
      vec![],
      vec![],
    ).unwrap();
    assert_eq!(scene.nodes[0].children, vec![1, 3]);
    assert_eq!(scene.nodes[1].children, vec![2]);
    assert_eq!(scene.find_node("b"), Some(2));
    assert_eq!(scene.find_node("missing"), None);
  }

  #[test]
  fn malformed_hierarchies_are_rejected() {
    assert!(HalaScene::from_parts(vec![], vec![], vec![], vec![]).is_err());
    let two_roots = vec![node("root", None), node("other", None)];
    assert!(HalaScene::from_parts(two_roots, vec![], vec![], vec![]).is_err());
    let dangling = vec![node("root", None), node("a", Some(7))];
    assert!(HalaScene::from_parts(dangling, vec![], vec![], vec![]).is_err());
    let cycle = vec![node("root", None), node("a", Some(2)), node("b", Some(1))];
    assert!(HalaScene::from_parts(cycle, vec![], vec![], vec![]).is_err());
  }

  #[test]
  fn duplicate_names_resolve_to_first_node() {
    let scene = HalaScene::from_parts(
      vec![node("root", None), node("twin", Some(0)), node("twin", Some(0))],
      vec![],
      vec![],
      vec![],
    ).unwrap();
    assert_eq!(scene.find_node("twin"), Some(1));
  }

  #[test]
  fn duplicate_names_keep_the_first_rest_transform() {
    let first = HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::X));
    let second = HalaNode::new("twin", Some(0), Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
    let scene = HalaScene::from_parts(vec![node("root", None), first, second], vec![], vec![], vec![]).unwrap();
    let locals = scene.original_local_transforms();
    assert_eq!(locals.len(), 2);
    assert_eq!(locals["twin"], Mat4::from_translation(Vec3::X));
  }

  #[test]
  fn world_bounds_cover_transformed_vertices() {
    let mesh = HalaMesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]);
    let mut moved = node("moved", Some(0)).with_meshes(&[0]);
    moved.local_transform = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
    let scene = HalaScene::from_parts(vec![node("root", None), moved], vec![mesh], vec![], vec![]).unwrap();

    let bounds = scene.world_bounds(&scene.original_local_transforms()).unwrap();
    assert!(bounds.get_min().abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));
    assert!(bounds.get_max().abs_diff_eq(Vec3::new(3.0, 1.0, 0.0), 1e-6));

    let empty = HalaScene::from_parts(vec![node("root", None)], vec![], vec![], vec![]).unwrap();
    assert!(empty.world_bounds(&empty.original_local_transforms()).is_none());
  }
}
