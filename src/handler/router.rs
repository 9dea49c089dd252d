//! Request dispatch module
//!
//! Entry point for routed request processing:
//! 1. GET requests try the static root first
//! 2. The longest matching route's handlers run in order
//! 3. Anything not answered becomes 404

use std::path::PathBuf;
use std::sync::Arc;

use hyper::Method;

use crate::handler::static_files;
use crate::http::{self, HttpResponse, RouteRequest};
use crate::logger::Logger;
use crate::routing::RouteTable;

/// Resolves requests against a frozen route table and optional static root
pub struct Dispatcher {
    table: RouteTable,
    static_root: Option<PathBuf>,
    logger: Arc<Logger>,
}

impl Dispatcher {
    /// Take ownership of a fully populated route table
    pub const fn new(table: RouteTable, static_root: Option<PathBuf>, logger: Arc<Logger>) -> Self {
        Self {
            table,
            static_root,
            logger,
        }
    }

    /// Produce the single response for `req`
    pub async fn dispatch(&self, mut req: RouteRequest) -> HttpResponse {
        // 1. Static content takes priority for GET
        if *req.method() == Method::GET {
            if let Some(root) = &self.static_root {
                if let Some(resp) = static_files::serve(req.path(), root, &self.logger).await {
                    return resp;
                }
            }
        }

        // 2. Longest-prefix route, handlers tried in registration order
        if let Some(route) = self.table.find(req.method(), req.path()) {
            for handler in route.handlers() {
                if let Some(resp) = handler.handle(&mut req).await {
                    return resp;
                }
            }
            self.logger.debug(&format!(
                "Route {} declined {} {}",
                route.prefix(),
                req.method(),
                req.path()
            ));
        }

        // 3. Nothing answered
        http::build_404_response()
    }
}
