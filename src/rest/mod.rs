//! REST endpoint module
//!
//! Binds the capture store capabilities to routes:
//! - `GET|POST /capture` triggers a capture and answers the file name
//! - `GET /list` answers the matching file names
//! - `GET /image/<name>` answers the image bytes
//!
//! A capability that is not supplied leaves its routes unregistered.

mod capture;
mod image;
mod list;

use std::sync::Arc;

use hyper::Method;

pub use capture::{parse_capture_body, CaptureHandler, CaptureRequest};
pub use image::ImageHandler;
pub use list::{parse_list_query, ListHandler};

use crate::logger::Logger;
use crate::routing::{Handler, RouteTable};
use crate::store::{CaptureCapability, ImageCapability, ListCapability};

pub const CAPTURE_ROUTE: &str = "/capture";
pub const LIST_ROUTE: &str = "/list";
pub const IMAGE_ROUTE: &str = "/image";

/// Capabilities the REST endpoints delegate to
#[derive(Default, Clone)]
pub struct Capabilities {
    pub capture: Option<Arc<dyn CaptureCapability>>,
    pub list: Option<Arc<dyn ListCapability>>,
    pub image: Option<Arc<dyn ImageCapability>>,
}

impl Capabilities {
    /// All three capabilities served by one store
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CaptureCapability + ListCapability + ImageCapability + 'static,
    {
        Self {
            capture: Some(Arc::clone(&store) as Arc<dyn CaptureCapability>),
            list: Some(Arc::clone(&store) as Arc<dyn ListCapability>),
            image: Some(store as Arc<dyn ImageCapability>),
        }
    }
}

/// Register the endpoints for every supplied capability
pub fn register_routes(table: &mut RouteTable, capabilities: Capabilities, logger: Arc<Logger>) {
    if let Some(capture) = capabilities.capture {
        let handler: Arc<dyn Handler> = Arc::new(CaptureHandler::new(capture, CAPTURE_ROUTE, Arc::clone(&logger)));
        table.register(Method::GET, CAPTURE_ROUTE, Arc::clone(&handler));
        table.register(Method::POST, CAPTURE_ROUTE, handler);
    }
    if let Some(list) = capabilities.list {
        table.register(Method::GET, LIST_ROUTE, Arc::new(ListHandler::new(list, LIST_ROUTE)));
    }
    if let Some(image) = capabilities.image {
        table.register(Method::GET, IMAGE_ROUTE, Arc::new(ImageHandler::new(image, IMAGE_ROUTE)));
    }
    logger.debug("REST routes registered");
}
