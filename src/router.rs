//! Path based request routing and dispatch.
use std::collections::HashMap;
use std::time::Instant;

use log::{error, info};

use crate::cache::ResponseCache;
use crate::handler::{ConnInfo, Handler, HandlerError, HandlerResult, Reply};
use crate::json;
use crate::request::Request;
use crate::response::Response;
use crate::view;

/// Route table key designating the fallback handler.
pub const NOT_FOUND_KEY: &str = "404";

/// Named values captured from a matched route pattern. Produced fresh for
/// each request and handed to the matched handler.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn new() -> Self {
        PathParams(HashMap::new())
    }
    pub fn insert(&mut self, name: &str, value: &str) {
        self.0.insert(name.to_string(), value.to_string());
    }
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| &v[..])
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

enum Segment {
    Literal(String),
    // :name - exactly one segment
    Named(String),
    // :name+ - one or more trailing segments, captured joined with '/'
    NamedRest(String),
}

impl Segment {
    fn from_str(s: &str) -> Self {
        if let Some(name) = s.strip_prefix(':') {
            if let Some(name) = name.strip_suffix('+') {
                Self::NamedRest(name.to_string())
            } else {
                Self::Named(name.to_string())
            }
        } else {
            Self::Literal(s.to_string())
        }
    }
}

/// A route pattern such as `/users/:id` or `/assets/:filename+`, compiled
/// once when the route table is built.
struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    fn compile(pattern: &str) -> Self {
        Self {
            segments: pattern.split('/').map(Segment::from_str).collect(),
        }
    }
    fn matches(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = path.split('/').collect();
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => match parts.get(i) {
                    Some(part) if *part == &literal[..] => (),
                    _ => return None,
                },
                Segment::Named(name) => match parts.get(i) {
                    Some(part) if !part.is_empty() => params.insert(name, part),
                    _ => return None,
                },
                Segment::NamedRest(name) => {
                    if i >= parts.len() || parts[i].is_empty() {
                        return None;
                    }
                    params.insert(name, &parts[i..].join("/"));
                    return Some(params);
                }
            }
        }
        if parts.len() != self.segments.len() {
            return None;
        }
        Some(params)
    }
}

struct Route {
    pattern: RoutePattern,
    handler: Box<dyn Handler>,
}

/// An ordered route table mapping path patterns to handlers.
///
/// Matching is first-match-wins in insertion order, so put more specific
/// patterns before catch-alls. The table always holds a fallback handler
/// under the key `"404"`; `new()` seeds it with the built-in not-found
/// page and a later `with_route("404", ...)` replaces it.
///
/// # Usage - route patterns
/// * `/foo`: matches exactly /foo
/// * `/users/:id`: matches /users/anything, adds id="anything" to params
/// * `/assets/:filename+`: matches /assets/a, /assets/a/b, ...; the
///   trailing segments are captured joined with '/'
/// * `"404"`: not a pattern, designates the fallback handler
///
/// # Example
/// ```
/// use waypoint::prelude::*;
///
/// fn hello(_req: &Request, _conn: &ConnInfo, params: &PathParams) -> HandlerResult {
///     let body = format!("Hello, {}!", params.get("name").unwrap_or("world"));
///     Ok(Reply::Http(Response::new(200).with_body(body.into_bytes())))
/// }
///
/// let routes = Routes::new().with_route("/hello/:name", hello);
///
/// let mut request = Request::default();
/// request.path = "/hello/Ada".to_string();
/// let response = handle_request(&request, &ConnInfo::default(), &routes, None);
/// assert_eq!(response.body, Some(b"Hello, Ada!".to_vec()));
/// ```
pub struct Routes {
    routes: Vec<Route>,
    not_found: Box<dyn Handler>,
}

impl Routes {
    pub fn new() -> Self {
        Self {
            routes: vec![],
            not_found: Box::new(default_not_found),
        }
    }
    pub fn with_route<H>(mut self, pattern: &str, handler: H) -> Self
    where
        H: 'static + Handler,
    {
        if pattern == NOT_FOUND_KEY {
            self.not_found = Box::new(handler);
            return self;
        }
        self.routes.push(Route {
            pattern: RoutePattern::compile(pattern),
            handler: Box::new(handler),
        });
        self
    }
    /// Replace the fallback handler; same as `with_route("404", handler)`.
    pub fn with_not_found<H>(self, handler: H) -> Self
    where
        H: 'static + Handler,
    {
        self.with_route(NOT_FOUND_KEY, handler)
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new()
    }
}

fn default_not_found(_: &Request, _: &ConnInfo, _: &PathParams) -> HandlerResult {
    Ok(Reply::View(view::not_found_page()))
}

/// Dispatch one request through the route table, consulting the response
/// cache first when one is given.
///
/// This is total: handler errors are resolved here (fallback page or JSON
/// 500) and never propagate to the caller. One log line is emitted per
/// request: method, path+query, cache marker, elapsed time, final status.
pub fn handle_request(
    request: &Request,
    conn: &ConnInfo,
    routes: &Routes,
    cache: Option<&ResponseCache>,
) -> Response {
    let start = Instant::now();

    let (response, cache_hit) = match cache.and_then(|c| c.lookup(request)) {
        Some(hit) => (hit, true),
        None => (dispatch(request, conn, routes), false),
    };

    let query = if request.query.is_empty() {
        "".to_string()
    } else {
        format!("?{}", request.query)
    };
    info!(
        "{} {}{}{} - {}ms - {} {}",
        request.method,
        request.path,
        query,
        if cache_hit { " (cache)" } else { "" },
        start.elapsed().as_millis(),
        response.status_code,
        &response.status,
    );
    response
}

fn dispatch(request: &Request, conn: &ConnInfo, routes: &Routes) -> Response {
    for route in &routes.routes {
        if let Some(params) = route.pattern.matches(&request.path) {
            return resolve(
                route.handler.handle(request, conn, &params),
                request,
                conn,
                routes,
            );
        }
    }
    not_found(request, conn, routes)
}

fn resolve(
    result: HandlerResult,
    request: &Request,
    conn: &ConnInfo,
    routes: &Routes,
) -> Response {
    match result {
        Ok(reply) => reply.into_response(),
        Err(HandlerError::NotFound) => not_found(request, conn, routes),
        Err(HandlerError::Failure(message)) => {
            error!("handler failed for {}: {}", request.path, message);
            json::error_json(&message, 500)
        }
    }
}

fn not_found(request: &Request, conn: &ConnInfo, routes: &Routes) -> Response {
    match routes.not_found.handle(request, conn, &PathParams::new()) {
        Ok(reply) => reply.into_response(),
        Err(HandlerError::NotFound) => view::not_found_page().into_response(),
        Err(HandlerError::Failure(message)) => {
            error!("fallback handler failed for {}: {}", request.path, message);
            json::error_json(&message, 500)
        }
    }
}
