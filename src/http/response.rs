//! Response encoding module
//!
//! Every request ends in exactly one of these owned responses; handlers return
//! them by value, so a response cannot be written twice.

use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use tokio::fs;

use super::mime;

/// Response type produced by the dispatcher and all handlers
pub type HttpResponse = Response<Full<Bytes>>;

/// Build 404 Not Found response with an empty body
pub fn build_404_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Length", 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(Full::new(Bytes::new()));
            *resp.status_mut() = StatusCode::NOT_FOUND;
            resp
        })
}

/// Serialize `value` as JSON and wrap it in a 200 response
pub fn send_json<T: Serialize + ?Sized>(value: &T) -> HttpResponse {
    // No 5xx in this layer: an unserializable payload is reported as unavailable
    let Ok(json) = serde_json::to_string_pretty(value) else {
        return build_404_response();
    };

    let content_length = json.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Read a file and wrap its bytes in a 200 response
///
/// Returns `None` without producing anything when `path` is not a readable
/// regular file.
pub async fn send_file(path: &Path) -> Option<HttpResponse> {
    let metadata = fs::metadata(path).await.ok()?;
    if !metadata.is_file() {
        return None;
    }
    let content = fs::read(path).await.ok()?;
    let content_type = mime::content_type_for(path);

    Some(build_bytes_response(content, content_type))
}

/// Build 200 response carrying raw bytes
pub fn build_bytes_response(content: Vec<u8>, content_type: &str) -> HttpResponse {
    let content_length = content.len();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}
