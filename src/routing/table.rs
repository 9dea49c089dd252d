//! Route table module
//!
//! Routes are kept per HTTP method in registration order. Lookup picks the
//! longest prefix that is a plain string prefix of the request path; ties go
//! to the route registered first.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyper::Method;

use crate::http::{HttpResponse, RouteRequest};

/// Future returned by [`Handler::handle`]
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Option<HttpResponse>> + Send + 'a>>;

/// A request handler bound to a route
///
/// Resolving to `None` means "not handled": the dispatcher then answers 404.
pub trait Handler: Send + Sync {
    fn handle<'a>(&'a self, req: &'a mut RouteRequest) -> HandlerFuture<'a>;
}

impl<F> Handler for F
where
    F: Fn(&RouteRequest) -> Option<HttpResponse> + Send + Sync,
{
    fn handle<'a>(&'a self, req: &'a mut RouteRequest) -> HandlerFuture<'a> {
        Box::pin(std::future::ready(self(&*req)))
    }
}

/// A path prefix and the handlers tried for it, in order
pub struct Route {
    prefix: String,
    handlers: Vec<Arc<dyn Handler>>,
}

impl Route {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Pure string-prefix test against the raw path
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Per-method routes, populated before the server starts
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<Method, Vec<Route>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `prefix` under `method`
    ///
    /// A handler registered for a (method, prefix) pair that already exists
    /// is chained after the existing ones.
    pub fn register(&mut self, method: Method, prefix: &str, handler: Arc<dyn Handler>) {
        let routes = self.routes.entry(method).or_default();
        if let Some(route) = routes.iter_mut().find(|r| r.prefix == prefix) {
            route.handlers.push(handler);
        } else {
            routes.push(Route {
                prefix: prefix.to_string(),
                handlers: vec![handler],
            });
        }
    }

    /// Longest matching route for `path` under `method`
    pub fn find(&self, method: &Method, path: &str) -> Option<&Route> {
        let mut candidate: Option<&Route> = None;
        for route in self.routes.get(method)?.iter().filter(|r| r.matches(path)) {
            if candidate.map_or(true, |best| route.prefix.len() > best.prefix.len()) {
                candidate = Some(route);
            }
        }
        candidate
    }

    /// Routes registered under `method`, in registration order
    pub fn routes(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or(&[])
    }
}
