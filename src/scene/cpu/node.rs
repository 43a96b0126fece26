/// A node of the scene hierarchy.
/// Nodes live in a flat arena owned by the scene and link each other by index.
#[derive(Clone, Debug)]
pub struct HalaNode {
  pub name: String,
  pub parent: Option<u32>,
  pub children: Vec<u32>,
  pub local_transform: glam::Mat4,

  pub mesh_indices: Vec<u32>,
}

/// The default implementation of the node.
impl Default for HalaNode {
  fn default() -> Self {
    Self {
      name: String::new(),
      parent: None,
      children: Vec::new(),
      local_transform: glam::Mat4::IDENTITY,
      mesh_indices: Vec::new(),
    }
  }
}

/// The implementation of the node.
impl HalaNode {

  /// Create a new node.
  /// param name: The unique name of the node.
  /// param parent: The parent index, None for the root.
  /// param local_transform: The transform relative to the parent.
  /// return: The node.
  pub fn new(name: &str, parent: Option<u32>, local_transform: glam::Mat4) -> Self {
    Self {
      name: name.to_owned(),
      parent,
      local_transform,
      ..Default::default()
    }
  }

  /// Attach mesh references to the node.
  /// param mesh_indices: The indices into the scene mesh list.
  /// return: The node.
  pub fn with_meshes(mut self, mesh_indices: &[u32]) -> Self {
    self.mesh_indices.extend_from_slice(mesh_indices);
    self
  }

  pub fn has_meshes(&self) -> bool {
    !self.mesh_indices.is_empty()
  }

}
