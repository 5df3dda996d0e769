//! One-shot model loading.
//!
//! Bytes come from the filesystem on native builds and from `fetch` in the
//! browser. Either way the caller gets a stream of [`LoadProgress`] events
//! followed by exactly one `Result<Model, LoadError>`.

#[cfg(target_arch = "wasm32")]
mod fetch;
pub(crate) mod glb;
mod progress;

#[cfg(target_arch = "wasm32")]
pub use fetch::fetch_with_progress;
pub use glb::{compute_vertex_normals, parse_glb};
pub use progress::{read_with_progress, LoadProgress, ProgressLog};

use crate::error::LoadError;
use crate::scene::Model;

/// Reads a model file from disk in chunks, reporting progress as it goes.
#[cfg(not(target_arch = "wasm32"))]
pub fn read_file_with_progress(
    path: impl AsRef<std::path::Path>,
    on_progress: impl FnMut(LoadProgress),
) -> Result<Vec<u8>, LoadError> {
    let file = std::fs::File::open(path.as_ref())?;
    let total = file.metadata().ok().map(|m| m.len());
    Ok(read_with_progress(std::io::BufReader::new(file), total, on_progress)?)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load_model(
    path: impl AsRef<std::path::Path>,
    on_progress: impl FnMut(LoadProgress),
) -> Result<Model, LoadError> {
    let path = path.as_ref();
    log::info!("Loading model from {}", path.display());
    let bytes = read_file_with_progress(path, on_progress)?;
    parse_glb(&bytes)
}

#[cfg(target_arch = "wasm32")]
pub async fn load_model(
    url: &str,
    on_progress: impl FnMut(LoadProgress),
) -> Result<Model, LoadError> {
    log::info!("Loading model from {url}");
    let bytes = fetch_with_progress(url, on_progress).await?;
    parse_glb(&bytes)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use glam::Vec3;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("camview-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_load_model_from_file() {
        let path = temp_path("triangle.glb");
        std::fs::write(&path, glb::tests::triangle_glb(None)).unwrap();

        let mut events = Vec::new();
        let model = load_model(&path, |p| events.push(p)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(model.bounds().center(), Some(Vec3::new(2.0, 1.0, 0.0)));
        let last = events.last().unwrap();
        assert_eq!(last.percent(), Some(100.0));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut events = 0;
        let err = load_model(temp_path("does-not-exist.glb"), |_| events += 1).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert_eq!(events, 0);
    }
}
