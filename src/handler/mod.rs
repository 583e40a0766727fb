//! Base for all request handlers.
use std::fmt;
use std::net::SocketAddr;

use crate::request::Request;
use crate::response::Response;
use crate::router::PathParams;
use crate::view::Page;

pub mod static_files;

/// What a handler produced: a finished HTTP response, or a view for the
/// dispatcher to render.
#[derive(Debug)]
pub enum Reply {
    Http(Response),
    View(Page),
}

impl Reply {
    pub fn into_response(self) -> Response {
        match self {
            Self::Http(response) => response,
            Self::View(page) => page.into_response(),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Http(response)
    }
}

impl From<Page> for Reply {
    fn from(page: Page) -> Self {
        Self::View(page)
    }
}

/// Failures a handler can signal. `NotFound` makes the dispatcher fall
/// through to the route table's `"404"` entry; `Failure` is logged and
/// turned into a JSON 500.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerError {
    NotFound,
    Failure(String),
}

impl HandlerError {
    pub fn failure(message: &str) -> Self {
        Self::Failure(message.to_string())
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Failure(message) => write!(f, "{}", message),
        }
    }
}

pub type HandlerResult = Result<Reply, HandlerError>;

/// Connection metadata passed to handlers.
#[derive(Debug, Clone, Default)]
pub struct ConnInfo {
    pub peer_addr: Option<SocketAddr>,
}

/// A Handler is meant to implement an HTTP endpoint; it takes a request,
/// connection info and the parameters captured from the matched route
/// pattern, and produces a [`Reply`] or signals a [`HandlerError`].
/// Handlers are invoked by the dispatcher; each invocation is independent.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request, conn: &ConnInfo, params: &PathParams) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request, &ConnInfo, &PathParams) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &Request, conn: &ConnInfo, params: &PathParams) -> HandlerResult {
        (self)(request, conn, params)
    }
}
