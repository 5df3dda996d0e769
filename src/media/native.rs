use super::{FrameSource, MediaError};

pub fn request_camera() -> Result<Box<dyn FrameSource>, MediaError> {
    Err(MediaError::Unsupported)
}
