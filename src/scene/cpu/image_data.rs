use std::path::Path;

use crate::error::HalaCradleError;
use super::scene::HalaScene;

/// The pixel layout of decoded image data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HalaImageFormat {
  R8G8B8A8Srgb,
  R8G8B8A8Unorm,
}

/// Decoded image pixels ready for upload by the renderer.
#[derive(Clone, Debug)]
pub struct HalaImageData {
  pub format: HalaImageFormat,
  pub width: u32,
  pub height: u32,
  pub pixels: Vec<u8>,
}

impl HalaImageData {
  /// The colour of the single texel fallback texture.
  pub const FALLBACK_COLOR: [u8; 4] = [200, 160, 110, 255];

  /// Create a new texture with the given file path.
  /// The rows are flipped so the first row is the bottom of the image.
  /// param path: The file path.
  /// return: The result.
  pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, HalaCradleError> {
    let path = path.as_ref();

    let img = image::open(path)
      .map_err(|e| HalaCradleError::new(&format!("Failed to open image \"{}\".", path.to_string_lossy()), Some(Box::new(e))))?;
    log::debug!("Image \"{}\" decoded [{} x {}].", path.to_string_lossy(), img.width(), img.height());

    Ok(Self::from_dynamic_image(img.flipv()))
  }

  /// Load a texture, or the fallback texel if the file does not exist or can not be decoded.
  /// param path: The file path.
  /// return: The image data.
  pub fn new_with_file_or_fallback<P: AsRef<Path>>(path: P) -> Self {
    let path = path.as_ref();
    if !path.exists() {
      log::warn!("Texture not found: \"{}\", using single-color fallback.", path.to_string_lossy());
      return Self::fallback();
    }
    match Self::new_with_file(path) {
      Ok(image) => image,
      Err(err) => {
        log::warn!("{}", err);
        Self::fallback()
      }
    }
  }

  /// A single texel texture of the fallback colour.
  pub fn fallback() -> Self {
    Self {
      format: HalaImageFormat::R8G8B8A8Unorm,
      width: 1,
      height: 1,
      pixels: Self::FALLBACK_COLOR.to_vec(),
    }
  }

  /// Convert the glTF decoded image to RGBA8, flipped like file textures.
  /// param image_data: The glTF image data.
  /// return: The image data.
  pub fn from_gltf(image_data: &gltf::image::Data) -> Result<Self, HalaCradleError> {
    let channels = match image_data.format {
      gltf::image::Format::R8 => 1,
      gltf::image::Format::R8G8 => 2,
      gltf::image::Format::R8G8B8 => 3,
      gltf::image::Format::R8G8B8A8 => 4,
      format => return Err(HalaCradleError::new(&format!("Unsupported glTF image format: {:?}", format), None)),
    };

    let texel_count = (image_data.width * image_data.height) as usize;
    let mut pixels = Vec::with_capacity(texel_count * 4);
    for texel in image_data.pixels.chunks_exact(channels) {
      match channels {
        1 => pixels.extend_from_slice(&[texel[0], texel[0], texel[0], 255]),
        2 => pixels.extend_from_slice(&[texel[0], texel[1], 0, 255]),
        3 => pixels.extend_from_slice(&[texel[0], texel[1], texel[2], 255]),
        _ => pixels.extend_from_slice(texel),
      }
    }

    let buffer = image::RgbaImage::from_raw(image_data.width, image_data.height, pixels)
      .ok_or(HalaCradleError::new(&format!("glTF image [{} x {}] has too few pixels.", image_data.width, image_data.height), None))?;
    Ok(Self::from_dynamic_image(image::DynamicImage::ImageRgba8(buffer).flipv()))
  }

  fn from_dynamic_image(img: image::DynamicImage) -> Self {
    let rgba = img.into_rgba8();
    let (width, height) = rgba.dimensions();
    Self {
      format: HalaImageFormat::R8G8B8A8Srgb,
      width,
      height,
      pixels: rgba.into_raw(),
    }
  }
}

/// All image data the renderer has to upload, addressed by handle.
#[derive(Default)]
pub struct HalaTextureSet {
  pub images: Vec<HalaImageData>,
}

impl HalaTextureSet {

  /// Add an image and return its handle.
  /// param image: The image data.
  /// return: The handle.
  pub fn add(&mut self, image: HalaImageData) -> u32 {
    self.images.push(image);
    (self.images.len() - 1) as u32
  }

  /// Move the embedded images of a scene into the set and rebase its mesh texture handles.
  /// param scene: The scene.
  pub fn adopt_scene_images(&mut self, scene: &mut HalaScene) {
    let base = self.images.len() as u32;
    let count = scene.images.len() as u32;
    self.images.append(&mut scene.images);
    for mesh in scene.meshes.iter_mut() {
      mesh.texture = match mesh.texture {
        Some(index) if index < count => Some(base + index),
        Some(index) => {
          log::warn!("Mesh \"{}\" references missing image {}.", mesh.name, index);
          None
        },
        None => None,
      };
    }
  }

  pub fn get(&self, handle: u32) -> Option<&HalaImageData> {
    self.images.get(handle as usize)
  }

  pub fn len(&self) -> usize {
    self.images.len()
  }

  pub fn is_empty(&self) -> bool {
    self.images.is_empty()
  }

}
