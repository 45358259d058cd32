//! WebGPU rendering module
//!
//! The scene is a handful of flat-coloured quads rebuilt every frame from the
//! session; `shapes` is pure so it can be tested without a GPU.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::scene;
pub use vertex::Vertex;
