use super::progress::{initial_capacity, LoadProgress};
use crate::error::LoadError;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

fn js_err(e: JsValue) -> LoadError {
    LoadError::Fetch(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Fetches `url`, streaming the body so progress can be reported as chunks
/// arrive. Falls back to a single `arrayBuffer()` read when the response has
/// no readable body stream.
pub async fn fetch_with_progress(
    url: &str,
    mut on_progress: impl FnMut(LoadProgress),
) -> Result<Vec<u8>, LoadError> {
    let win = web_sys::window().ok_or_else(|| LoadError::Fetch("no window".into()))?;
    let resp_val = JsFuture::from(win.fetch_with_str(url)).await.map_err(js_err)?;
    let resp: web_sys::Response = resp_val.dyn_into().map_err(js_err)?;

    if !resp.ok() {
        return Err(LoadError::Http {
            status: resp.status(),
            status_text: resp.status_text(),
        });
    }

    let total = resp
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|len| len.trim().parse::<u64>().ok());

    let Some(body) = resp.body() else {
        let buf_promise = resp.array_buffer().map_err(js_err)?;
        let buf_val = JsFuture::from(buf_promise).await.map_err(js_err)?;
        let bytes = js_sys::Uint8Array::new(&buf_val).to_vec();
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
        return Ok(bytes);
    };

    let reader: web_sys::ReadableStreamDefaultReader =
        body.get_reader().dyn_into().map_err(js_err)?;
    let mut bytes = Vec::with_capacity(initial_capacity(total));

    loop {
        let result = JsFuture::from(reader.read()).await.map_err(js_err)?;
        let done = js_sys::Reflect::get(&result, &JsValue::from_str("done"))
            .map_err(js_err)?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&result, &JsValue::from_str("value")).map_err(js_err)?;
        let chunk: js_sys::Uint8Array = value.dyn_into().map_err(js_err)?;
        bytes.extend_from_slice(&chunk.to_vec());
        on_progress(LoadProgress {
            loaded: bytes.len() as u64,
            total,
        });
    }

    Ok(bytes)
}
