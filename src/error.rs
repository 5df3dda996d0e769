//! Recoverable failure kinds. None of these stop the viewer; callers log
//! them and carry on without the missing resource.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("camera capture is not supported in this environment")]
    Unsupported,
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("video playback failed: {0}")]
    Playback(String),
    #[error("camera request failed: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("invalid node hierarchy: {0}")]
    InvalidHierarchy(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("a model is already present in the scene")]
    ModelAlreadyLoaded,
}
