//! Request model module
//!
//! `RouteRequest` is what route handlers see: method, raw path, headers,
//! the non-empty path segments and a body that can be taken only once.

use http_body_util::{BodyExt, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::{HeaderMap, Method};

/// Error raised while collecting a request body
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// Split a path on `/`, discarding empty segments
///
/// # Examples
/// ```
/// use camcapture_server::http::request::path_segments;
/// assert_eq!(path_segments("//list/foo/"), vec!["list", "foo"]);
/// assert!(path_segments("/").is_empty());
/// ```
pub fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Collect a request body, failing once it grows beyond `limit` bytes
pub async fn read_body(body: Incoming, limit: usize) -> Result<Bytes, BodyError> {
    Ok(Limited::new(body, limit).collect().await?.to_bytes())
}

/// An incoming request as seen by the dispatcher and route handlers
#[derive(Debug)]
pub struct RouteRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Bytes>,
    segments: Vec<String>,
}

impl RouteRequest {
    /// Create a request; an empty body is stored as absent
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: Option<Bytes>) -> Self {
        let path = path.into();
        let segments = path_segments(&path);
        Self {
            method,
            path,
            headers,
            body: body.filter(|b| !b.is_empty()),
            segments,
        }
    }

    /// Shorthand for a request without headers or body
    pub fn bare(method: Method, path: impl Into<String>) -> Self {
        Self::new(method, path, HeaderMap::new(), None)
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Segments following those of `route_prefix`
    ///
    /// `/capture/front` under the `/capture` route yields `["front"]`.
    pub fn segments_after(&self, route_prefix: &str) -> &[String] {
        let skip = route_prefix.split('/').filter(|s| !s.is_empty()).count();
        self.segments.get(skip..).unwrap_or(&[])
    }

    /// Take the body; later calls return `None`
    pub fn take_body(&mut self) -> Option<Bytes> {
        self.body.take()
    }
}
