// Capture endpoint
// GET /capture[/<prefix>] and POST /capture {"prefix": "..."}

use std::sync::Arc;

use hyper::Method;
use serde::Deserialize;

use crate::http::{self, RouteRequest};
use crate::logger::Logger;
use crate::routing::{Handler, HandlerFuture};
use crate::store::CaptureCapability;

/// POST body of a capture request
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
pub struct CaptureRequest {
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Parse a capture request body
///
/// Anything but a JSON object with an optional string `prefix` is an error.
pub fn parse_capture_body(body: &[u8]) -> Result<CaptureRequest, serde_json::Error> {
    serde_json::from_slice(body)
}

pub struct CaptureHandler {
    capture: Arc<dyn CaptureCapability>,
    route_prefix: String,
    logger: Arc<Logger>,
}

impl CaptureHandler {
    pub fn new(capture: Arc<dyn CaptureCapability>, route_prefix: &str, logger: Arc<Logger>) -> Self {
        Self {
            capture,
            route_prefix: route_prefix.to_string(),
            logger,
        }
    }

    /// Prefix from the body; absent or malformed bodies give no prefix
    fn prefix_from_body(&self, req: &mut RouteRequest) -> Option<String> {
        let body = req.take_body()?;
        match parse_capture_body(&body) {
            Ok(parsed) => parsed.prefix,
            Err(e) => {
                self.logger.debug(&format!("Capture body ignored, using default prefix: {e}"));
                None
            }
        }
    }

    fn prefix_for(&self, req: &mut RouteRequest) -> Option<String> {
        if *req.method() == Method::POST {
            self.prefix_from_body(req)
        } else {
            req.segments_after(&self.route_prefix).first().cloned()
        }
    }
}

impl Handler for CaptureHandler {
    fn handle<'a>(&'a self, req: &'a mut RouteRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let prefix = self.prefix_for(req);
            let file = self.capture.capture(prefix.as_deref())?;
            let name = file.file_name()?.to_string_lossy().into_owned();
            Some(http::send_json(&name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::HeaderMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Capability recording the prefixes it was called with
    fn recording(seen: Arc<Mutex<Vec<Option<String>>>>) -> Arc<dyn CaptureCapability> {
        Arc::new(move |prefix: Option<&str>| {
            seen.lock().unwrap().push(prefix.map(String::from));
            Some(PathBuf::from("/data/captures").join(format!("{}20240101120000.png", prefix.unwrap_or(""))))
        })
    }

    fn handler(capture: Arc<dyn CaptureCapability>) -> CaptureHandler {
        CaptureHandler::new(capture, "/capture", Arc::new(Logger::discard()))
    }

    fn post(body: &'static [u8]) -> RouteRequest {
        RouteRequest::new(Method::POST, "/capture", HeaderMap::new(), Some(Bytes::from_static(body)))
    }

    async fn body_string(resp: http::HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_parse_capture_body() {
        assert_eq!(
            parse_capture_body(br#"{"prefix":"front"}"#).unwrap().prefix.as_deref(),
            Some("front")
        );
        assert_eq!(parse_capture_body(br#"{"other":1}"#).unwrap(), CaptureRequest::default());
        assert_eq!(parse_capture_body(br#"{"prefix":null}"#).unwrap().prefix, None);
        assert!(parse_capture_body(br#"{"prefix":5}"#).is_err());
        assert!(parse_capture_body(b"[1,2]").is_err());
        assert!(parse_capture_body(b"not json").is_err());
    }

    #[tokio::test]
    async fn test_get_uses_first_segment_after_route() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let h = handler(recording(Arc::clone(&seen)));

        let mut req = RouteRequest::bare(Method::GET, "/capture/front/ignored");
        let resp = h.handle(&mut req).await.unwrap();
        assert_eq!(body_string(resp).await, "\"front20240101120000.png\"");

        let mut req = RouteRequest::bare(Method::GET, "/capture");
        assert!(h.handle(&mut req).await.is_some());

        assert_eq!(*seen.lock().unwrap(), vec![Some("front".to_string()), None]);
    }

    #[tokio::test]
    async fn test_post_reads_prefix_from_body() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let h = handler(recording(Arc::clone(&seen)));

        let resp = h.handle(&mut post(br#"{"prefix":"back"}"#)).await.unwrap();
        assert_eq!(body_string(resp).await, "\"back20240101120000.png\"");
        assert_eq!(*seen.lock().unwrap(), vec![Some("back".to_string())]);
    }

    #[tokio::test]
    async fn test_post_malformed_body_uses_default_prefix() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let h = handler(recording(Arc::clone(&seen)));

        let resp = h.handle(&mut post(b"{broken")).await.unwrap();
        assert_eq!(resp.status(), 200);
        h.handle(&mut RouteRequest::bare(Method::POST, "/capture/ignored")).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![None, None]);
    }

    #[tokio::test]
    async fn test_capture_unavailable_is_not_handled() {
        let h = handler(Arc::new(|_: Option<&str>| None::<PathBuf>));
        let mut req = RouteRequest::bare(Method::GET, "/capture");
        assert!(h.handle(&mut req).await.is_none());
    }
}
