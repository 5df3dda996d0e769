//! WebGPU rendering module
//!
//! GPU context, viewpoint and orbit controls, meshes, and the scene renderer
//! that draws the video background and the lit model.

pub mod camera;
pub mod context;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod video;

pub use camera::{Camera, CameraController, MouseAction, OrbitController, TouchPhase};
pub use context::GpuContext;
pub use mesh::{Mesh, TexturedVertex, Vertex};
pub use pipeline::RenderPipelines;
pub use renderer::SceneRenderer;
pub use video::VideoTexture;
