use std::path::Path;
use std::collections::{
  HashMap,
  VecDeque,
};

use glam::{
  Mat4,
  Quat,
  Vec2,
  Vec3,
};

use crate::error::HalaCradleError;
use super::super::{
  cpu::scene::HalaScene,
  cpu::node::HalaNode,
  cpu::mesh::HalaMesh,
  cpu::image_data::HalaImageData,
  cpu::animation::{
    HalaAnimation,
    HalaInterpolation,
    HalaNodeChannel,
    HalaQuatKey,
    HalaVectorKey,
  },
};

/// The glTF loader.
pub struct HalaGltfLoader;

/// The name of the root created when a scene has several top level nodes.
pub const SYNTHETIC_ROOT_NAME: &str = "<Root>";

/// The implementation of the glTF loader.
impl HalaGltfLoader {
  /// Load the glTF or GLB file from the given path.
  /// param path The path of the file.
  /// return The loaded scene.
  pub fn load<P: AsRef<Path>>(path: P) -> Result<HalaScene, HalaCradleError> {
    let path = path.as_ref();
    let (gltf, buffers, image_data) = gltf::import(path)
      .map_err(|err| HalaCradleError::new(&format!("Load glTF file \"{:?}\" failed.", path), Some(Box::new(err))))?;

    let scene = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
      Some(scene) => scene,
      None => return Err(HalaCradleError::new(&format!("No scene in glTF file \"{:?}\".", path), None)),
    };
    if gltf.scenes().len() > 1 {
      log::warn!("More than one scene in glTF file \"{:?}\". Only \"{}\" will be loaded.", path, scene.name().unwrap_or("<Unnamed>"));
    }
    log::debug!("Loading scene \"{}\".", scene.name().unwrap_or("<Unnamed>"));

    // Load all meshes, one HalaMesh per triangle primitive.
    let mut loaded_meshes = Vec::new();
    let mut gltf_mesh_to_meshes = Vec::new();
    for mesh in gltf.meshes() {
      let mut indices = Vec::new();
      for loaded in Self::load_mesh(&mesh, &buffers)? {
        indices.push(loaded_meshes.len() as u32);
        loaded_meshes.push(loaded);
      }
      gltf_mesh_to_meshes.push(indices);
    }

    // Load all nodes, parents before children.
    let gltf_node_names = gltf.nodes().map(|node| Self::node_name(&node)).collect::<Vec<_>>();
    let mut loaded_nodes = Vec::new();
    let mut node_queue = VecDeque::new();
    let mut top_level = scene.nodes().collect::<Vec<_>>();
    if top_level.len() == 1 {
      node_queue.push_back((None, top_level.remove(0)));
    } else {
      loaded_nodes.push(HalaNode::new(SYNTHETIC_ROOT_NAME, None, Mat4::IDENTITY));
      node_queue.extend(top_level.into_iter().map(|node| (Some(0_u32), node)));
    }

    while let Some((parent_idx, node)) = node_queue.pop_front() {
      let current_index = loaded_nodes.len() as u32;
      let mut loaded_node = HalaNode::new(
        &gltf_node_names[node.index()],
        parent_idx,
        Mat4::from_cols_array_2d(&node.transform().matrix()),
      );

      // If the node has a mesh, reference all its primitives.
      if let Some(mesh) = node.mesh() {
        if let Some(indices) = gltf_mesh_to_meshes.get(mesh.index()) {
          loaded_node.mesh_indices.extend_from_slice(indices);
        }
      }

      loaded_nodes.push(loaded_node);
      node_queue.extend(node.children().map(|child| (Some(current_index), child)));
    }

    // Decode all embedded images, mesh texture handles index this list.
    let mut loaded_images = Vec::new();
    for data in image_data.iter() {
      loaded_images.push(Self::load_image_data(data));
    }

    // Load all animations.
    let mut loaded_animations = Vec::new();
    for animation in gltf.animations() {
      loaded_animations.push(Self::load_animation(&animation, &buffers, &gltf, &gltf_node_names)?);
    }

    HalaScene::from_parts(loaded_nodes, loaded_meshes, loaded_animations, loaded_images)
  }

  /// Get a unique name of the node.
  /// param node The gltf node.
  /// return The name.
  fn node_name(node: &gltf::Node) -> String {
    match node.name() {
      Some(name) if !name.is_empty() => name.to_owned(),
      _ => format!("node_{}", node.index()),
    }
  }

  /// Load the image data, a broken image becomes the fallback texel.
  /// param image_data The gltf image data.
  /// return The image data.
  fn load_image_data(image_data: &gltf::image::Data) -> HalaImageData {
    match HalaImageData::from_gltf(image_data) {
      Ok(image) => image,
      Err(err) => {
        log::warn!("{} Using the fallback texture.", err);
        HalaImageData::fallback()
      }
    }
  }

  /// Load the triangle primitives of a mesh.
  /// param mesh The gltf mesh.
  /// param buffers The gltf buffers.
  /// return The loaded meshes.
  fn load_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> Result<Vec<HalaMesh>, HalaCradleError> {
    let mesh_name = mesh.name().map(str::to_owned).unwrap_or_else(|| format!("mesh_{}", mesh.index()));
    log::debug!("Loading mesh \"{}\".", mesh_name);

    let mut loaded_meshes = Vec::new();
    for primitive in mesh.primitives() {
      if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!("Skip primitive {} of mesh \"{}\": mode {:?} is not triangles.", primitive.index(), mesh_name, primitive.mode());
        continue;
      }
      let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

      let positions = reader.read_positions()
        .ok_or(HalaCradleError::new(&format!("Read positions from mesh \"{}\" failed.", mesh_name), None))?
        .map(Vec3::from).collect::<Vec<_>>();
      let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect::<Vec<_>>(),
        None => (0..positions.len() as u32).collect::<Vec<_>>(),
      };
      let normals = match reader.read_normals() {
        Some(normals) => normals.map(Vec3::from).collect::<Vec<_>>(),
        None => HalaMesh::calculate_face_normals(&positions, &indices),
      };
      let tex_coords = match reader.read_tex_coords(0) {
        Some(tex_coords) => tex_coords.into_f32().map(Vec2::from).collect::<Vec<_>>(),
        None => vec![Vec2::ZERO; positions.len()],
      };

      let texture = primitive.material()
        .pbr_metallic_roughness()
        .base_color_texture()
        .map(|info| info.texture().source().index() as u32);

      loaded_meshes.push(HalaMesh {
        name: mesh_name.clone(),
        positions,
        normals,
        tex_coords,
        indices,
        texture,
      });
    }

    Ok(loaded_meshes)
  }

  /// Load the animation, grouping the channels by target node.
  /// Tracks the file does not animate hold the node's rest value.
  /// param animation The gltf animation.
  /// param buffers The gltf buffers.
  /// param document The gltf document.
  /// param node_names The names of the gltf nodes by index.
  /// return The loaded animation.
  fn load_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    document: &gltf::Document,
    node_names: &[String],
  ) -> Result<HalaAnimation, HalaCradleError> {
    let animation_name = animation.name().map(str::to_owned).unwrap_or_else(|| format!("animation_{}", animation.index()));
    log::debug!("Loading animation \"{}\".", animation_name);

    let mut channels: Vec<HalaNodeChannel> = Vec::new();
    let mut channel_of_node: HashMap<usize, usize> = HashMap::new();
    for channel in animation.channels() {
      let node_index = channel.target().node().index();
      let slot = *channel_of_node.entry(node_index).or_insert_with(|| {
        channels.push(HalaNodeChannel::new(&node_names[node_index]));
        channels.len() - 1
      });
      let node_channel = &mut channels[slot];

      let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
      let times = reader.read_inputs()
        .ok_or(HalaCradleError::new(&format!("Read key times of animation \"{}\" failed.", animation_name), None))?
        .map(f64::from)
        .collect::<Vec<_>>();
      let outputs = reader.read_outputs()
        .ok_or(HalaCradleError::new(&format!("Read key values of animation \"{}\" failed.", animation_name), None))?;

      let (stride, offset) = match channel.sampler().interpolation() {
        gltf::animation::Interpolation::Linear => (1, 0),
        gltf::animation::Interpolation::Step => {
          node_channel.interpolation = HalaInterpolation::Step;
          (1, 0)
        },
        // In tangent, value, out tangent; only the value is kept.
        gltf::animation::Interpolation::CubicSpline => {
          log::debug!("Cubic spline channel of \"{}\" is sampled linearly.", node_channel.node_name);
          (3, 1)
        },
      };

      match outputs {
        gltf::animation::util::ReadOutputs::Translations(values) => {
          node_channel.position_keys = Self::vector_keys(&times, values.skip(offset).step_by(stride));
        },
        gltf::animation::util::ReadOutputs::Scales(values) => {
          node_channel.scaling_keys = Self::vector_keys(&times, values.skip(offset).step_by(stride));
        },
        gltf::animation::util::ReadOutputs::Rotations(values) => {
          node_channel.rotation_keys = times.iter()
            .zip(values.into_f32().skip(offset).step_by(stride))
            .map(|(&time, value)| HalaQuatKey { time, value: Quat::from_array(value).normalize() })
            .collect();
        },
        gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {
          log::debug!("Skip morph target weights of \"{}\".", node_channel.node_name);
        },
      }
    }

    // Fill tracks the file leaves out with the rest pose.
    for (node_index, slot) in channel_of_node.iter() {
      let node = match document.nodes().nth(*node_index) {
        Some(node) => node,
        None => continue,
      };
      let (translation, rotation, scale) = node.transform().decomposed();
      let channel = &mut channels[*slot];
      if channel.position_keys.is_empty() {
        channel.position_keys.push(HalaVectorKey { time: 0.0, value: Vec3::from(translation) });
      }
      if channel.rotation_keys.is_empty() {
        channel.rotation_keys.push(HalaQuatKey { time: 0.0, value: Quat::from_array(rotation) });
      }
      if channel.scaling_keys.is_empty() {
        channel.scaling_keys.push(HalaVectorKey { time: 0.0, value: Vec3::from(scale) });
      }
    }

    // glTF key times are seconds.
    Ok(HalaAnimation::new(&animation_name, 1.0, channels))
  }

  fn vector_keys<I>(times: &[f64], values: I) -> Vec<HalaVectorKey>
    where I: Iterator<Item = [f32; 3]>
  {
    times.iter()
      .zip(values)
      .map(|(&time, value)| HalaVectorKey { time, value: Vec3::from(value) })
      .collect()
  }
}
