use super::{FrameSource, MediaError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DomException, HtmlVideoElement, MediaStream, MediaStreamConstraints, MediaStreamTrack};

/// HAVE_CURRENT_DATA: the element can provide the current frame.
const READY_STATE_CURRENT_DATA: u16 = 2;

/// Camera stream playing into a detached `<video>` element.
pub struct WebcamSource {
    video: HtmlVideoElement,
    _stream: MediaStream,
}

impl FrameSource for WebcamSource {
    fn frame_size(&self) -> Option<(u32, u32)> {
        if self.video.ready_state() < READY_STATE_CURRENT_DATA {
            return None;
        }
        let (width, height) = (self.video.video_width(), self.video.video_height());
        (width > 0 && height > 0).then_some((width, height))
    }

    fn copy_to_texture(&self, queue: &wgpu::Queue, texture: &wgpu::Texture) {
        queue.copy_external_image_to_texture(
            &wgpu::CopyExternalImageSourceInfo {
                source: wgpu::ExternalImageSource::HTMLVideoElement(self.video.clone()),
                origin: wgpu::Origin2d::ZERO,
                flip_y: false,
            },
            wgpu::CopyExternalImageDestInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
                color_space: wgpu::PredefinedColorSpace::Srgb,
                premultiplied_alpha: false,
            },
            texture.size(),
        );
    }
}

/// Prompts for camera access and starts playback. Resolves once, with no
/// retry on failure.
pub async fn request_camera() -> Result<Box<dyn FrameSource>, MediaError> {
    let window = web_sys::window().ok_or(MediaError::Unsupported)?;
    let navigator = window.navigator();

    let has_media_devices = js_sys::Reflect::has(&navigator, &JsValue::from_str("mediaDevices"))
        .unwrap_or(false);
    if !has_media_devices {
        return Err(MediaError::Unsupported);
    }
    let devices = navigator
        .media_devices()
        .map_err(|_| MediaError::Unsupported)?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(classify)?;
    let stream: MediaStream = JsFuture::from(promise)
        .await
        .map_err(classify)?
        .dyn_into()
        .map_err(|_| MediaError::Other("getUserMedia did not return a MediaStream".into()))?;

    let video = match attach(&window, &stream).await {
        Ok(video) => video,
        Err(err) => {
            stop_tracks(&stream);
            return Err(err);
        }
    };

    log::info!("Camera stream started");
    Ok(Box::new(WebcamSource {
        video,
        _stream: stream,
    }))
}

/// Plays `stream` in a detached, muted `<video>` element.
async fn attach(window: &web_sys::Window, stream: &MediaStream) -> Result<HtmlVideoElement, MediaError> {
    let document = window.document().ok_or(MediaError::Unsupported)?;
    let video: HtmlVideoElement = document
        .create_element("video")
        .map_err(|e| MediaError::Other(describe(&e)))?
        .dyn_into()
        .map_err(|_| MediaError::Other("created element is not a <video>".into()))?;
    video.set_autoplay(true);
    video.set_muted(true);
    video
        .set_attribute("playsinline", "")
        .map_err(|e| MediaError::Other(describe(&e)))?;
    video.set_src_object(Some(stream));

    let play = video.play().map_err(|e| MediaError::Playback(describe(&e)))?;
    JsFuture::from(play)
        .await
        .map_err(|e| MediaError::Playback(describe(&e)))?;
    Ok(video)
}

/// Releases the camera so the browser's capture indicator turns off.
fn stop_tracks(stream: &MediaStream) {
    for track in stream.get_tracks().iter() {
        if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
            track.stop();
        }
    }
    log::debug!("Camera tracks stopped");
}

fn classify(err: JsValue) -> MediaError {
    match err.dyn_ref::<DomException>().map(|e| e.name()) {
        Some(name) if name == "NotAllowedError" || name == "SecurityError" => {
            MediaError::PermissionDenied
        }
        Some(name) if name == "NotFoundError" || name == "OverconstrainedError" => {
            MediaError::NoDevice
        }
        _ => MediaError::Other(describe(&err)),
    }
}

fn describe(err: &JsValue) -> String {
    if let Some(exception) = err.dyn_ref::<DomException>() {
        return format!("{}: {}", exception.name(), exception.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
