//! HTTP protocol layer module
//!
//! Request model and response encoding shared by the dispatcher, the static
//! file server and the REST handlers.

pub mod mime;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::RouteRequest;
pub use response::{build_404_response, send_file, send_json, HttpResponse};
