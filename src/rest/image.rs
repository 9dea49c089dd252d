// Image endpoint
// GET /image/<name>

use std::sync::Arc;

use crate::http::{self, RouteRequest};
use crate::routing::{Handler, HandlerFuture};
use crate::store::ImageCapability;

pub struct ImageHandler {
    image: Arc<dyn ImageCapability>,
    route_prefix: String,
}

impl ImageHandler {
    pub fn new(image: Arc<dyn ImageCapability>, route_prefix: &str) -> Self {
        Self {
            image,
            route_prefix: route_prefix.to_string(),
        }
    }
}

impl Handler for ImageHandler {
    fn handle<'a>(&'a self, req: &'a mut RouteRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            // Without a name the route does not apply
            let name = req.segments_after(&self.route_prefix).first()?;

            let Some(path) = self.image.lookup(name) else {
                return Some(http::build_404_response());
            };
            Some(
                http::send_file(&path)
                    .await
                    .unwrap_or_else(http::build_404_response),
            )
        })
    }
}
