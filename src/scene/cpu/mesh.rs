use glam::{
  Vec2,
  Vec3,
};

/// A triangulated mesh.
/// Positions are kept on the CPU for pivot and bounds computation.
#[derive(Clone, Debug, Default)]
pub struct HalaMesh {
  pub name: String,
  pub positions: Vec<Vec3>,
  pub normals: Vec<Vec3>,
  pub tex_coords: Vec<Vec2>,
  pub indices: Vec<u32>,
  /// Handle of the texture bound when drawing, None means the fallback texture.
  pub texture: Option<u32>,
}

/// The implementation of the mesh.
impl HalaMesh {

  /// Create a new mesh with positions and indices only.
  /// Normals are computed from the faces and texture coordinates are zero.
  /// param name: The name of the mesh.
  /// param positions: The vertex positions.
  /// param indices: The triangle indices.
  /// return: The mesh.
  pub fn new(name: &str, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
    let normals = Self::calculate_face_normals(&positions, &indices);
    let tex_coords = vec![Vec2::ZERO; positions.len()];
    Self {
      name: name.to_owned(),
      positions,
      normals,
      tex_coords,
      indices,
      texture: None,
    }
  }

  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  /// Calculate smooth vertex normals by averaging the face normals around each vertex.
  /// param positions: The vertex positions.
  /// param indices: The triangle indices.
  /// return: The normals, one per position.
  pub fn calculate_face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri_indices in indices.chunks_exact(3) {
      let (i0, i1, i2) = (tri_indices[0] as usize, tri_indices[1] as usize, tri_indices[2] as usize);
      if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
        continue;
      }
      let face_normal = (positions[i1] - positions[i0]).cross(positions[i2] - positions[i0]);
      normals[i0] += face_normal;
      normals[i1] += face_normal;
      normals[i2] += face_normal;
    }

    normals.into_iter()
      .map(|normal| normal.try_normalize().unwrap_or(Vec3::Y))
      .collect()
  }

}
