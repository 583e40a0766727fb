pub use crate::cache::{CacheRegistry, ResponseCache};
pub use crate::handler::{ConnInfo, Handler, HandlerError, HandlerResult, Reply};
pub use crate::json::{error_json, json, ResponseInit};
pub use crate::request::{Header, Method, Request};
pub use crate::response::Response;
pub use crate::router::{handle_request, PathParams, Routes};
pub use crate::server::{serve, ServeOptions, Server};
pub use crate::view::Page;
