pub use crate::error::HalaCradleError;
pub use crate::config::{
  HalaCameraConfig,
  HalaCradleConfig,
  HalaLightConfig,
  HalaPendulumConfig,
  HalaPendulumGroup,
};
pub use crate::scene::{
  HalaBounds,
  HalaScene,
};
pub use crate::scene::hierarchy::{
  HalaTransformMap,
  resolve_world_transforms,
};
pub use crate::scene::pivot::{
  HalaPivotCache,
  compute_pivot,
};
pub use crate::animation::{
  HalaAnimationState,
  HalaClipSampler,
  HalaPendulumEngine,
  HalaSwingSide,
};
pub use crate::renderer::{
  HalaDrawCall,
  HalaFrame,
  HalaRendererTrait,
};
pub use crate::cradle::HalaCradle;
pub use crate::app::HalaCradleApp;
