pub mod loader;
pub mod bounds;
pub mod cpu;
pub mod hierarchy;
pub mod pivot;

pub use bounds::HalaBounds;
pub use cpu::HalaScene;
