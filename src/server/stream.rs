//! HTTP over an arbitrary IO stream.
use std::io::{Read, Write};
use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::handler::ConnInfo;
use crate::request::parser::RequestParser;
use crate::response::Response;
use crate::router::{handle_request, Routes};
use crate::server::{Server, ServerError};
use crate::VERSION;

/// Serves requests from any `Read + Write` stream. The stream stays open
/// across calls, so several requests can be answered back to back.
///
/// With a [`ReadWriteAdapter`](crate::io::ReadWriteAdapter) over byte
/// buffers this runs the full parse-dispatch-respond path in memory,
/// which is how the integration tests exercise the stack.
///
/// # Example
/// ```
/// use waypoint::io::ReadWriteAdapter;
/// use waypoint::prelude::*;
/// use waypoint::server::StreamServer;
///
/// fn hello(_req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
///     Ok(Reply::Http(Response::new(200).with_body(b"Hello!".to_vec())))
/// }
///
/// let routes = Routes::new().with_route("/", hello);
///
/// let raw = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
/// let mut written = vec![];
/// let mut server = StreamServer::new(ReadWriteAdapter::new(&raw[..], &mut written), routes);
/// server.serve_one().unwrap();
///
/// let text = String::from_utf8(written).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.ends_with("\r\n\r\nHello!"));
/// ```
pub struct StreamServer<S> {
    stream: S,
    routes: Routes,
    cache: Option<Arc<ResponseCache>>,
}

impl<S> StreamServer<S> {
    pub fn new(stream: S, routes: Routes) -> Self {
        Self {
            stream,
            routes,
            cache: None,
        }
    }
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl<S> Server for StreamServer<S>
where
    S: Read + Write,
{
    fn serve_one(&mut self) -> Result<(), ServerError> {
        let response = match RequestParser::new(&mut self.stream).parse() {
            Ok(request) => handle_request(
                &request,
                &ConnInfo::default(),
                &self.routes,
                self.cache.as_deref(),
            ),
            Err(e) => Response::new(400).with_body(e.to_string().into_bytes()),
        };
        let response = response
            .with_header("Server", &format!("waypoint/{}", VERSION))
            .with_header("Connection", "keep-alive");
        self.stream.write_all(&response.into_bytes())?;
        self.stream.flush()?;
        Ok(())
    }
}
