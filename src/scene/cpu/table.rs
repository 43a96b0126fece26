use glam::{
  Mat4,
  Vec2,
  Vec3,
};

use super::mesh::HalaMesh;

/// The procedural table the cradle stands on: one unit cube drawn as a top and four legs.
pub struct HalaTable {
  pub mesh: HalaMesh,
  pub top_transform: Mat4,
  pub leg_transforms: [Mat4; 4],
}

impl Default for HalaTable {
  fn default() -> Self {
    Self::new()
  }
}

impl HalaTable {
  const LEG_WIDTH: f32 = 0.4;
  const LEG_HEIGHT: f32 = 6.5;
  const LEG_POSITIONS: [Vec3; 4] = [
    Vec3::new(-5.5, -5.0, -5.0),
    Vec3::new(4.5, -5.0, -5.0),
    Vec3::new(-5.5, -5.0, 2.0),
    Vec3::new(4.5, -5.0, 2.0),
  ];

  pub fn new() -> Self {
    let top_transform = Mat4::from_translation(Vec3::new(-0.5, -1.75, -1.5))
      * Mat4::from_scale(Vec3::new(12.0, 0.65, 9.0));
    let leg_scale = Mat4::from_scale(Vec3::new(Self::LEG_WIDTH, Self::LEG_HEIGHT, Self::LEG_WIDTH));
    let leg_transforms = Self::LEG_POSITIONS.map(|position| Mat4::from_translation(position) * leg_scale);

    Self {
      mesh: Self::unit_cube(),
      top_transform,
      leg_transforms,
    }
  }

  /// Iterate the model matrices of all table parts, top first.
  pub fn part_transforms(&self) -> impl Iterator<Item = Mat4> + '_ {
    std::iter::once(self.top_transform).chain(self.leg_transforms.iter().copied())
  }

  /// Build a cube of edge 1 centered at the origin with flat faces.
  pub fn unit_cube() -> HalaMesh {
    // (normal, tangent u, tangent v) of each face.
    let faces = [
      (Vec3::NEG_Z, Vec3::X, Vec3::Y),
      (Vec3::Z, Vec3::X, Vec3::Y),
      (Vec3::NEG_X, Vec3::Z, Vec3::Y),
      (Vec3::X, Vec3::Z, Vec3::Y),
      (Vec3::NEG_Y, Vec3::X, Vec3::Z),
      (Vec3::Y, Vec3::X, Vec3::Z),
    ];
    let corners = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];

    let mut mesh = HalaMesh {
      name: "table_cube".to_owned(),
      ..Default::default()
    };
    for (face_index, (normal, u, v)) in faces.iter().enumerate() {
      for corner in corners.iter() {
        let position = *normal * 0.5 + *u * (corner.x - 0.5) + *v * (corner.y - 0.5);
        mesh.positions.push(position);
        mesh.normals.push(*normal);
        mesh.tex_coords.push(*corner);
      }

      // Keep counter-clockwise winding when seen from outside.
      let base = (face_index * 4) as u32;
      if u.cross(*v).dot(*normal) > 0.0 {
        mesh.indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
      } else {
        mesh.indices.extend_from_slice(&[base, base + 2, base + 1, base + 2, base, base + 3]);
      }
    }
    mesh
  }
}
