// List endpoint
// GET /list[/<prefix>][/<from>][/<to>]
//
// Segments are classified by shape, not position: the first non-numeric one
// is the prefix, the first two all-digit ones are `from` and `to`.

use std::sync::Arc;

use crate::http::{self, RouteRequest};
use crate::routing::{Handler, HandlerFuture};
use crate::store::{ListCapability, ListQuery};

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

/// Build a list query from the segments following the route prefix
pub fn parse_list_query(segments: &[String]) -> ListQuery {
    let (numbers, others): (Vec<&String>, Vec<&String>) =
        segments.iter().partition(|s| is_numeric(s));
    let mut numbers = numbers.into_iter();

    ListQuery {
        prefix: others.first().map(|s| (*s).clone()),
        from: numbers.next().cloned(),
        to: numbers.next().cloned(),
    }
}

pub struct ListHandler {
    list: Arc<dyn ListCapability>,
    route_prefix: String,
}

impl ListHandler {
    pub fn new(list: Arc<dyn ListCapability>, route_prefix: &str) -> Self {
        Self {
            list,
            route_prefix: route_prefix.to_string(),
        }
    }
}

impl Handler for ListHandler {
    fn handle<'a>(&'a self, req: &'a mut RouteRequest) -> HandlerFuture<'a> {
        Box::pin(async move {
            let query = parse_list_query(req.segments_after(&self.route_prefix));
            let names = self.list.list(&query);
            Some(http::send_json(&names))
        })
    }
}
