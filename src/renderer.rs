use glam::{
  Mat4,
  Vec3,
};

use crate::error::HalaCradleError;
use crate::scene::cpu::scene::HalaScene;
use crate::scene::hierarchy::{
  HalaTransformMap,
  walk_depth_first,
};

#[repr(C, align(4))]
#[derive(Debug, Clone, Copy)]
pub struct HalaGlobalUniform {
  // The view matrix.
  pub v_mtx: Mat4,
  // The projection matrix.
  pub p_mtx: Mat4,
  // The view-projection matrix.
  pub vp_mtx: Mat4,
}

impl HalaGlobalUniform {

  pub fn new(v_mtx: Mat4, p_mtx: Mat4) -> Self {
    Self {
      v_mtx,
      p_mtx,
      vp_mtx: p_mtx * v_mtx,
    }
  }

}

#[repr(C, align(4))]
#[derive(Debug, Clone, Copy)]
pub struct HalaObjectUniform {
  // The model matrix.
  pub m_mtx: Mat4,
  // The inverse transposed model matrix, for normals.
  pub it_m_mtx: Mat4,
  // The model-view-projection matrix.
  pub mvp_mtx: Mat4,
  // The model to shadow map matrix.
  pub light_mvp_mtx: Mat4,
}

impl HalaObjectUniform {

  /// Build the per draw matrices.
  /// param m_mtx: The model matrix.
  /// param global: The matrices of the current pass.
  /// param light_space_mtx: The light view-projection matrix.
  /// return: The uniform.
  pub fn new(m_mtx: Mat4, global: &HalaGlobalUniform, light_space_mtx: Mat4) -> Self {
    Self {
      m_mtx,
      it_m_mtx: m_mtx.inverse().transpose(),
      mvp_mtx: global.vp_mtx * m_mtx,
      light_mvp_mtx: light_space_mtx * m_mtx,
    }
  }

}

/// Which mesh list a draw call indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalaDrawSource {
  Table,
  Lamp,
  Cradle,
}

/// One mesh placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalaDrawCall {
  pub source: HalaDrawSource,
  pub node_index: u32,
  pub mesh_index: u32,
  pub world_transform: Mat4,
  pub texture: Option<u32>,
}

/// The render passes of a frame, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalaRenderPass {
  Shadow,
  Main,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone)]
pub struct HalaFrame {
  pub camera: HalaGlobalUniform,
  pub camera_position: Vec3,
  pub light: HalaGlobalUniform,
  pub light_position: Vec3,
  pub draw_calls: Vec<HalaDrawCall>,
}

/// Collect the draw calls of a scene, parents visited before children.
/// param source: The mesh list the calls refer to.
/// param scene: The scene.
/// param local_transforms: The local transform overrides.
/// param root_transform: The matrix placing the scene root.
/// param fallback_texture: The texture of meshes without one.
/// return: One draw call per node mesh.
pub fn collect_draw_calls(
  source: HalaDrawSource,
  scene: &HalaScene,
  local_transforms: &HalaTransformMap,
  root_transform: Mat4,
  fallback_texture: Option<u32>,
) -> Vec<HalaDrawCall> {
  let mut draw_calls = Vec::new();
  walk_depth_first(scene, local_transforms, root_transform, |node_index, world_transform| {
    let node = match scene.node(node_index) {
      Some(node) => node,
      None => return,
    };
    for &mesh_index in node.mesh_indices.iter() {
      let mesh = match scene.meshes.get(mesh_index as usize) {
        Some(mesh) => mesh,
        None => {
          log::warn!("Node \"{}\" references missing mesh {}.", node.name, mesh_index);
          continue;
        }
      };
      draw_calls.push(HalaDrawCall {
        source,
        node_index,
        mesh_index,
        world_transform,
        texture: mesh.texture.or(fallback_texture),
      });
    }
  });
  draw_calls
}

/// The renderer trait, implemented by a GPU backend.
pub trait HalaRendererTrait {

  fn begin_pass(&mut self, pass: HalaRenderPass, global: &HalaGlobalUniform) -> Result<(), HalaCradleError>;

  fn draw(&mut self, draw_call: &HalaDrawCall, object: &HalaObjectUniform) -> Result<(), HalaCradleError>;

  fn end_pass(&mut self, pass: HalaRenderPass) -> Result<(), HalaCradleError>;

  /// Render the shadow map, then the lit scene.
  /// param frame: The frame.
  /// return: The result.
  fn draw_frame(&mut self, frame: &HalaFrame) -> Result<(), HalaCradleError> {
    let light_space_mtx = frame.light.vp_mtx;
    for (pass, global) in [(HalaRenderPass::Shadow, &frame.light), (HalaRenderPass::Main, &frame.camera)] {
      self.begin_pass(pass, global)?;
      for draw_call in frame.draw_calls.iter() {
        let object = HalaObjectUniform::new(draw_call.world_transform, global, light_space_mtx);
        self.draw(draw_call, &object)?;
      }
      self.end_pass(pass)?;
    }
    Ok(())
  }

}
