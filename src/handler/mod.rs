//! Request handler module
//!
//! Responsible for request dispatch: static file serving first for GET, then
//! routed handlers, then 404.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::Dispatcher;
