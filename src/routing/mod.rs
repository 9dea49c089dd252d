//! Routing module
//!
//! Provides the route table the dispatcher consults:
//! - Per-method routes keyed by path prefix
//! - Longest-prefix matching
//! - Ordered handler chains per route

mod table;

pub use table::{Handler, HandlerFuture, Route, RouteTable};
