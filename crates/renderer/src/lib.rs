//! Thin wgpu render adapter. The core simulation never imports `wgpu`
//! directly — it draws through [`RenderAdapter`].

pub mod camera;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod texture;
pub mod vertex;

pub use camera::*;
pub use mesh::*;
pub use renderer::*;
pub use texture::Texture;
pub use vertex::*;
