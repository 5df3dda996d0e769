//! # camview
//!
//! A small 3D viewer that shows the device camera as a background video
//! plane, loads one binary glTF model, lights it with an ambient and a
//! directional light, and spins it while the user orbits around it.
//!
//! ## Features
//! - Camera feed as a live background texture (browser builds)
//! - One-shot `.glb` loading with progress reporting
//! - Orbit, pan and zoom controls for mouse and touch
//! - Cross-platform: Native + WASM support
//!
//! ## Example
//! ```rust,ignore
//! use camview::{loader, Viewer, ViewerConfig};
//!
//! let mut viewer = Viewer::new(ViewerConfig::default(), 1280, 720);
//! let mut progress = loader::ProgressLog::default();
//! viewer.on_model_result(loader::load_model("./assets/Brama.glb", |p| {
//!     progress.report(p);
//! }));
//!
//! // Once per display refresh:
//! viewer.advance_frame();
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod math;
pub mod media;
pub mod render;
pub mod scene;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ViewerConfig;
pub use error::{LoadError, MediaError, ViewerError};
pub use loader::LoadProgress;
pub use media::FrameSource;
pub use scene::{Model, Scene};
pub use viewer::{LoopState, Viewer, Viewport};
