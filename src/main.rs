use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use camcapture_server::config::{Config, DEFAULT_CONFIG_FILE};
use camcapture_server::handler::Dispatcher;
use camcapture_server::logger::{LogLevel, Logger};
use camcapture_server::rest::{self, Capabilities};
use camcapture_server::routing::RouteTable;
use camcapture_server::server::{wait_for_shutdown, Server, ServerOptions};
use camcapture_server::store::{FolderStore, FrameSource, NoDevice, SnapshotDevice};

#[derive(Parser, Debug)]
#[command(name = "camcapture-server")]
#[command(about = "HTTP control endpoint for a capture device", long_about = None)]
struct Cli {
    /// Configuration file, extension optional
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory served for GET requests before routes are consulted
    #[arg(long)]
    static_root: Option<String>,

    /// Capture folder
    #[arg(long)]
    folder: Option<String>,

    /// Minimum log level: debug, info, warn or error
    #[arg(long)]
    log_level: Option<LogLevel>,
}

impl Cli {
    fn apply(self, cfg: &mut Config) {
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(root) = self.static_root {
            cfg.http.static_root = Some(root);
        }
        if let Some(folder) = self.folder {
            cfg.capture.folder = folder;
        }
        if let Some(level) = self.log_level {
            cfg.logging.level = level;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let logger = Arc::new(Logger::from_config(&cfg.logging)?);
    match cfg.server.workers {
        Some(workers) => logger.info(&format!("Using {workers} worker threads")),
        None => logger.info("Using default worker threads (CPU cores)"),
    }

    let device: Arc<dyn FrameSource> = match &cfg.capture.snapshot_source {
        Some(source) => Arc::new(SnapshotDevice::new(source)),
        None => Arc::new(NoDevice),
    };
    if !device.is_active() {
        logger.warning("No active capture device, capture requests will answer 404");
    }

    let store = Arc::new(FolderStore::new(&cfg.capture.folder, device, Arc::clone(&logger)));
    if !store.folder().is_dir() {
        logger.warning(&format!(
            "Capture folder '{}' does not exist",
            store.folder().display()
        ));
    }

    let mut table = RouteTable::new();
    rest::register_routes(&mut table, Capabilities::from_store(store), Arc::clone(&logger));

    let static_root = cfg.http.static_root.as_ref().map(PathBuf::from);
    let dispatcher = Arc::new(Dispatcher::new(table, static_root, Arc::clone(&logger)));
    let server = Server::new(dispatcher, Arc::clone(&logger), ServerOptions::from_config(&cfg)?);

    let addr = server.start(cfg.server.port)?;
    logger.log_server_start(&addr, cfg.http.static_root.as_deref());

    let waited = wait_for_shutdown(&logger).await;
    server.stop().await;
    waited?;
    Ok(())
}
