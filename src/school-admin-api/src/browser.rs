//! Multipart uploads through the page's own `fetch`, so large files never
//! pass through wasm memory.

use reqwest::Url;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, FormData, RequestCredentials, RequestInit, Response};

use crate::error::{ApiError, Result};

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn invalid(value: JsValue) -> ApiError {
    ApiError::InvalidRequest(describe(&value))
}

fn network(value: JsValue) -> ApiError {
    ApiError::Network(describe(&value))
}

/// POST `fields` plus `blob` as `file_field`; returns status and body text
pub(crate) async fn post_form(
    url: &Url,
    fields: &[(&str, String)],
    file_field: &str,
    blob: &Blob,
    file_name: &str,
) -> Result<(u16, String)> {
    let form = FormData::new().map_err(invalid)?;
    for (name, value) in fields {
        form.append_with_str(name, value).map_err(invalid)?;
    }
    form.append_with_blob_and_filename(file_field, blob, file_name)
        .map_err(invalid)?;

    let init = RequestInit::new();
    init.set_method("POST");
    init.set_credentials(RequestCredentials::Include);
    init.set_body(&form);

    let window = web_sys::window().ok_or_else(|| ApiError::Network("no window to fetch from".to_string()))?;
    debug!("[upload] sending form to {}", url);
    let response: Response = JsFuture::from(window.fetch_with_str_and_init(url.as_str(), &init))
        .await
        .map_err(|e| {
            warn!("[upload] transport failure: {}", describe(&e));
            network(e)
        })?
        .unchecked_into();

    let status = response.status();
    let body = JsFuture::from(response.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();
    debug!("[upload] HTTP {} ({} bytes)", status, body.len());

    Ok((status, body))
}
