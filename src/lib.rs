//! Small building blocks for HTTP services, meant to be composed rather
//! than configured.
//! * Path-pattern [request routing](crate::router::Routes) with a `"404"` fallback entry
//! * Bounded in-memory [response caching](crate::cache::ResponseCache)
//! * [Static file serving](crate::handler::static_files::StaticFiles)
//! * [JSON responses](crate::json::json) with [`serde_json`](serde_json)
//! * Declarative [request validation](crate::validate::validate_request)
//! * Multi-threaded [TCP server](crate::server::tcp::TcpServer)
//!
//! # Example
//! ```
//! use waypoint::io::ReadWriteAdapter;
//! use waypoint::prelude::*;
//! use waypoint::server::StreamServer;
//!
//! fn handle_hello(_req: &Request, _conn: &ConnInfo, params: &PathParams) -> HandlerResult {
//!     let name = params.get("name").unwrap_or("world");
//!     Ok(Reply::Http(
//!         Response::new(200).with_body(format!("Hello, {}!", name).into_bytes()),
//!     ))
//! }
//!
//! fn handle_time(_req: &Request, _conn: &ConnInfo, _params: &PathParams) -> HandlerResult {
//!     Ok(Reply::Http(json(
//!         &serde_json::json!({ "epoch": 0 }),
//!         ResponseInit::new(),
//!     )))
//! }
//!
//! let routes = Routes::new()
//!     .with_route("/hello/:name", handle_hello)
//!     .with_route("/time", handle_time);
//!
//! let request = b"GET /hello/Ada HTTP/1.1\r\nHost: localhost\r\n\r\n";
//! let mut write_buf = vec![];
//! let stream = ReadWriteAdapter::new(&request[..], &mut write_buf);
//! let mut server = StreamServer::new(stream, routes);
//! server.serve_one().unwrap();
//!
//! let response = String::from_utf8(write_buf).unwrap();
//! assert!(response.contains("Hello, Ada!"));
//! ```
pub mod cache;
pub mod handler;
pub mod io;
pub mod json;
pub mod media;
pub mod prelude;
pub mod request;
pub mod response;
pub mod router;
pub mod runner;
pub mod server;
pub mod validate;
pub mod view;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
