//! HTTP control endpoint for a capture device.
//!
//! Requests flow listener → dispatcher → (static file | route handler) →
//! response. Route handlers delegate to the capture store capabilities.

pub mod config;
pub mod dates;
pub mod handler;
pub mod http;
pub mod logger;
pub mod rest;
pub mod routing;
pub mod server;
pub mod store;
