pub mod pendulum;
pub mod clip;

pub use pendulum::{
  HalaAnimationState,
  HalaPendulumEngine,
  HalaSwingSide,
};
pub use clip::HalaClipSampler;
