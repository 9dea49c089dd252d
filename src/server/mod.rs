//! Server module
//!
//! Owns the listener lifecycle: `start` binds and spawns the accept loop,
//! `stop` signals it and waits until the listener is gone.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub use listener::create_listener;
pub use signal::wait_for_shutdown;

use crate::config::{AcceptMode, Config, ConfigError};
use crate::handler::Dispatcher;
use crate::logger::Logger;
use connection::ConnectionContext;

/// Server lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server is already running")]
    AlreadyRunning,
}

/// Listener and connection settings
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: IpAddr,
    pub accept_mode: AcceptMode,
    pub connection_timeout: Duration,
    pub max_body_size: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            accept_mode: AcceptMode::Serial,
            connection_timeout: Duration::from_secs(30),
            max_body_size: 1_048_576,
        }
    }
}

impl ServerOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            host: config.get_socket_addr()?.ip(),
            accept_mode: config.server.accept_mode,
            connection_timeout: Duration::from_secs(config.server.connection_timeout),
            max_body_size: config.http.max_body_size,
        })
    }
}

struct Running {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

/// HTTP server for one dispatcher
///
/// The server is either stopped or running exactly one accept loop.
pub struct Server {
    dispatcher: Arc<Dispatcher>,
    logger: Arc<Logger>,
    options: ServerOptions,
    running: Mutex<Option<Running>>,
}

impl Server {
    pub const fn new(dispatcher: Arc<Dispatcher>, logger: Arc<Logger>, options: ServerOptions) -> Self {
        Self {
            dispatcher,
            logger,
            options,
            running: Mutex::new(None),
        }
    }

    fn lock_running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind `port` on the configured host and start accepting.
    ///
    /// Returns the bound address (useful with port 0). On failure the server
    /// stays stopped. Must be called from within a tokio runtime.
    pub fn start(&self, port: u16) -> Result<SocketAddr, ServerError> {
        let mut running = self.lock_running();
        if running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let addr = SocketAddr::new(self.options.host, port);
        let listener = create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        let ctx = Arc::new(ConnectionContext {
            dispatcher: Arc::clone(&self.dispatcher),
            logger: Arc::clone(&self.logger),
            accept_mode: self.options.accept_mode,
            timeout: self.options.connection_timeout,
            max_body_size: self.options.max_body_size,
        });
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(server_loop::run_accept_loop(listener, ctx, Arc::clone(&shutdown)));

        *running = Some(Running {
            addr: local_addr,
            shutdown,
            task,
        });
        self.logger.debug(&format!("Accept loop started on {local_addr}"));
        Ok(local_addr)
    }

    /// Stop accepting and release the listener; a no-op when stopped
    pub async fn stop(&self) {
        let Some(running) = self.lock_running().take() else {
            return;
        };

        // notify_one keeps a permit if the loop is busy serving a connection
        running.shutdown.notify_one();
        if let Err(e) = running.task.await {
            self.logger.error(&format!("Accept loop ended abnormally: {e}"));
        }
        self.logger.info(&format!("Server on {} stopped", running.addr));
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lock_running().as_ref().map(|r| r.addr)
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(running) = self.lock_running().take() {
            running.shutdown.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use crate::http::{send_json, RouteRequest};
    use crate::logger::{AccessLogFormat, LogLevel};
    use crate::rest::{self, Capabilities};
    use crate::routing::{Handler, RouteTable};
    use crate::store::{CaptureCapability, FolderStore, NoDevice};
    use hyper::Method;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn options(accept_mode: AcceptMode) -> ServerOptions {
        ServerOptions {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            accept_mode,
            connection_timeout: Duration::from_secs(5),
            max_body_size: 64,
        }
    }

    fn server(table: RouteTable, static_root: Option<&Path>, accept_mode: AcceptMode) -> Server {
        let logger = Arc::new(Logger::discard());
        let dispatcher = Dispatcher::new(table, static_root.map(Path::to_path_buf), Arc::clone(&logger));
        Server::new(Arc::new(dispatcher), logger, options(accept_mode))
    }

    async fn send(addr: SocketAddr, raw: &str) -> (String, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw.as_bytes()).await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        let text = String::from_utf8_lossy(&buf).into_owned();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        (head.to_string(), body.to_string())
    }

    async fn get(addr: SocketAddr, path: &str) -> (String, String) {
        send(
            addr,
            &format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n"),
        )
        .await
    }

    async fn post(addr: SocketAddr, path: &str, body: &str) -> (String, String) {
        send(
            addr,
            &format!(
                "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{body}",
                body.len()
            ),
        )
        .await
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let srv = server(RouteTable::new(), None, AcceptMode::Serial);
        let addr = srv.start(0).unwrap();

        let (head, body) = get(addr, "/nowhere").await;
        assert!(head.starts_with("HTTP/1.1 404"));
        assert!(body.is_empty());
        srv.stop().await;
    }

    #[tokio::test]
    async fn test_static_index_and_list_route() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("index.html"), "<h1>camera</h1>").unwrap();
        let captures = tempfile::tempdir().unwrap();
        std::fs::write(captures.path().join("front20240110090000.png"), b"x").unwrap();
        std::fs::write(captures.path().join("back20240110090000.png"), b"x").unwrap();

        let store = Arc::new(FolderStore::new(
            captures.path(),
            Arc::new(NoDevice),
            Arc::new(Logger::discard()),
        ));
        let mut table = RouteTable::new();
        rest::register_routes(&mut table, Capabilities::from_store(store), Arc::new(Logger::discard()));
        let srv = server(table, Some(root.path()), AcceptMode::Serial);
        let addr = srv.start(0).unwrap();

        let (head, body) = get(addr, "/").await;
        assert!(head.starts_with("HTTP/1.1 200"));
        assert!(head.to_ascii_lowercase().contains("content-type: text/html"));
        assert_eq!(body, "<h1>camera</h1>");

        let (head, body) = get(addr, "/list/front/20240101").await;
        assert!(head.starts_with("HTTP/1.1 200"));
        let names: Vec<String> = serde_json::from_str(&body).unwrap();
        assert_eq!(names, vec!["front20240110090000.png"]);

        // No device attached: capture declines
        let (head, _) = get(addr, "/capture").await;
        assert!(head.starts_with("HTTP/1.1 404"));
        srv.stop().await;
    }

    fn recording_capture(seen: Arc<Mutex<Vec<Option<String>>>>) -> RouteTable {
        let capture: Arc<dyn CaptureCapability> = Arc::new(move |prefix: Option<&str>| {
            seen.lock().unwrap().push(prefix.map(String::from));
            Some(PathBuf::from(format!("{}20240101000000.png", prefix.unwrap_or(""))))
        });
        let mut table = RouteTable::new();
        let capabilities = Capabilities {
            capture: Some(capture),
            ..Capabilities::default()
        };
        rest::register_routes(&mut table, capabilities, Arc::new(Logger::discard()));
        table
    }

    #[tokio::test]
    async fn test_post_body_reaches_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let srv = server(recording_capture(Arc::clone(&seen)), None, AcceptMode::Serial);
        let addr = srv.start(0).unwrap();

        let (head, body) = post(addr, "/capture", r#"{"prefix":"door"}"#).await;
        assert!(head.starts_with("HTTP/1.1 200"));
        assert_eq!(body, "\"door20240101000000.png\"");

        // Over the 64 byte limit: treated as absent
        let oversized = format!(r#"{{"prefix":"{}"}}"#, "x".repeat(100));
        let (head, _) = post(addr, "/capture", &oversized).await;
        assert!(head.starts_with("HTTP/1.1 200"));

        assert_eq!(*seen.lock().unwrap(), vec![Some("door".to_string()), None]);
        srv.stop().await;
    }

    #[tokio::test]
    async fn test_concurrent_mode_serves_requests() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let srv = server(recording_capture(Arc::clone(&seen)), None, AcceptMode::Concurrent);
        let addr = srv.start(0).unwrap();

        let (first, second) = tokio::join!(get(addr, "/capture/a"), get(addr, "/capture/b"));
        assert!(first.0.starts_with("HTTP/1.1 200"));
        assert!(second.0.starts_with("HTTP/1.1 200"));
        assert_eq!(seen.lock().unwrap().len(), 2);
        srv.stop().await;
    }

    #[tokio::test]
    async fn test_start_stop_lifecycle() {
        let srv = server(RouteTable::new(), None, AcceptMode::Serial);
        assert!(!srv.is_running());
        assert_eq!(srv.local_addr(), None);

        let addr = srv.start(0).unwrap();
        assert!(srv.is_running());
        assert_eq!(srv.local_addr(), Some(addr));
        assert!(matches!(srv.start(0), Err(ServerError::AlreadyRunning)));

        srv.stop().await;
        assert!(!srv.is_running());
        assert!(TcpStream::connect(addr).await.is_err());

        // Stopping twice is harmless and the server can start again
        srv.stop().await;
        let again = srv.start(0).unwrap();
        let (head, _) = get(again, "/").await;
        assert!(head.starts_with("HTTP/1.1 404"));
        srv.stop().await;
    }

    #[tokio::test]
    async fn test_stop_wins_over_queued_connections() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let handler: Arc<dyn Handler> = Arc::new(move |_: &RouteRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(send_json("served"))
        });
        let mut table = RouteTable::new();
        table.register(Method::GET, "/x", handler);
        let srv = Arc::new(server(table, None, AcceptMode::Serial));
        let addr = srv.start(0).unwrap();

        // Keep the serial loop busy with an unfinished request
        let mut busy = TcpStream::connect(addr).await.unwrap();
        busy.write_all(b"GET /x HTTP/1.1\r\nHost: localhost\r\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut queued = Vec::new();
        for _ in 0..4 {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            stream
                .write_all(b"GET /x HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            queued.push(stream);
        }

        let stopping = tokio::spawn({
            let srv = Arc::clone(&srv);
            async move { srv.stop().await }
        });
        while srv.is_running() {
            tokio::task::yield_now().await;
        }

        busy.write_all(b"Connection: close\r\n\r\n").await.unwrap();
        let mut response = Vec::new();
        busy.read_to_end(&mut response).await.unwrap();
        assert!(response.starts_with(b"HTTP/1.1 200"));

        stopping.await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "only the in-flight request is served");
        drop(queued);
    }

    #[tokio::test]
    async fn test_access_log_carries_request_headers() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("access.log");
        let logger = Arc::new(
            Logger::from_config(&LoggingConfig {
                level: LogLevel::Error,
                access_log: true,
                access_log_format: AccessLogFormat::Combined,
                log_file: Some(log_path.to_str().unwrap().to_string()),
                error_log_file: None,
            })
            .unwrap(),
        );
        let dispatcher = Dispatcher::new(RouteTable::new(), None, Arc::clone(&logger));
        let srv = Server::new(Arc::new(dispatcher), logger, options(AcceptMode::Serial));
        let addr = srv.start(0).unwrap();

        let (head, _) = send(
            addr,
            "GET /missing HTTP/1.1\r\nHost: localhost\r\nReferer: http://camera.local/\r\n\
             User-Agent: curl/8.0\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(head.starts_with("HTTP/1.1 404"));
        srv.stop().await;

        let line = std::fs::read_to_string(&log_path).unwrap();
        assert!(line.contains("\"GET /missing HTTP/1.1\" 404"));
        assert!(line.contains("\"http://camera.local/\" \"curl/8.0\""));
    }

    #[tokio::test]
    async fn test_bind_failure_leaves_server_stopped() {
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = occupied.local_addr().unwrap().port();

        let srv = server(RouteTable::new(), None, AcceptMode::Serial);
        let err = srv.start(port).unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(err.to_string().contains(&port.to_string()));
        assert!(!srv.is_running());
    }
}
