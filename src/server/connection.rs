// Connection module
// Serves one accepted TCP connection through the dispatcher

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hyper::body::{Body as _, Incoming};
use hyper::header::{HeaderMap, HeaderName, REFERER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Version};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AcceptMode;
use crate::handler::Dispatcher;
use crate::http::request::read_body;
use crate::http::{HttpResponse, RouteRequest};
use crate::logger::{AccessLogEntry, Logger};

/// Everything a connection needs, shared by all connections of one server run
pub struct ConnectionContext {
    pub dispatcher: Arc<Dispatcher>,
    pub logger: Arc<Logger>,
    pub accept_mode: AcceptMode,
    pub timeout: Duration,
    pub max_body_size: usize,
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else {
        "1.1"
    }
}

impl ConnectionContext {
    /// Turn one hyper request into exactly one response
    async fn handle(&self, req: Request<Incoming>, peer: SocketAddr) -> Result<HttpResponse, Infallible> {
        let started = Instant::now();
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_string();

        let body = match read_body(body, self.max_body_size).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                self.logger
                    .warning(&format!("Request body dropped for {} {path}: {e}", parts.method));
                None
            }
        };
        let request = RouteRequest::new(parts.method, path, parts.headers, body);

        let mut entry = AccessLogEntry::new(
            peer.to_string(),
            request.method().to_string(),
            request.path().to_string(),
        );
        entry.http_version = version_label(parts.version).to_string();
        entry.referer = header_string(request.headers(), REFERER);
        entry.user_agent = header_string(request.headers(), USER_AGENT);

        let response = self.dispatcher.dispatch(request).await;

        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.logger.access(&entry);

        Ok(response)
    }
}

/// Serve HTTP/1 on `stream` until the peer is done or the timeout elapses.
///
/// Keep-alive is only enabled in concurrent mode; a serial connection
/// carries exactly one request.
pub async fn serve_connection(stream: TcpStream, peer: SocketAddr, ctx: Arc<ConnectionContext>) {
    let io = TokioIo::new(stream);

    let mut builder = http1::Builder::new();
    builder.keep_alive(ctx.accept_mode == AcceptMode::Concurrent);

    let service_ctx = Arc::clone(&ctx);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            let ctx = Arc::clone(&service_ctx);
            async move { ctx.handle(req, peer).await }
        }),
    );

    match tokio::time::timeout(ctx.timeout, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => ctx.logger.log_connection_error(&err),
        Err(_) => {
            ctx.logger.warning(&format!(
                "Connection from {peer} timed out after {} seconds",
                ctx.timeout.as_secs()
            ));
        }
    }
}
