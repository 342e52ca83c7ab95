//! Server-rendered pages.

pub mod group;
pub mod render;
pub mod students;

pub use render::Renderer;
