pub mod node;
pub mod image_data;
pub mod mesh;
pub mod animation;
pub mod light;
pub mod camera;
pub mod scene;
pub mod table;

pub use scene::HalaScene;
