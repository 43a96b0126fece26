pub mod prelude;
pub mod error;
pub mod config;
pub mod scene;
pub mod animation;
pub mod renderer;
pub mod input;
pub mod cradle;
pub mod app;
