//! Camera feed acquisition.
//!
//! The browser build asks for a live camera stream and hands back a
//! [`FrameSource`] the renderer samples every frame. Native builds have no
//! capture backend and always report [`MediaError::Unsupported`], which the
//! viewer treats like any other camera failure.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::request_camera;
#[cfg(target_arch = "wasm32")]
pub use web::{request_camera, WebcamSource};

pub use crate::error::MediaError;

/// A playable video resource that can be copied into a GPU texture.
pub trait FrameSource {
    /// Size of the current frame, or `None` until one is decodable.
    fn frame_size(&self) -> Option<(u32, u32)>;

    /// Copies the latest frame into `texture`, which must match `frame_size`.
    fn copy_to_texture(&self, queue: &wgpu::Queue, texture: &wgpu::Texture);
}
