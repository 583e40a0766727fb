//! JSON response building with [`serde_json`](serde_json).
use log::error;
use serde::Serialize;

use crate::response::Response;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Extra response metadata for [`json`]: status code, additional headers,
/// pretty-printing.
#[derive(Debug, Clone)]
pub struct ResponseInit {
    status_code: u16,
    headers: Vec<(String, String)>,
    pretty: bool,
}

impl ResponseInit {
    pub fn new() -> Self {
        Self {
            status_code: 200,
            headers: vec![],
            pretty: false,
        }
    }
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
    pub fn with_header(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.to_string(), value.to_string()));
        self
    }
    /// Indent the serialized body.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl Default for ResponseInit {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a JSON response: serialized body, JSON content type, permissive
/// CORS headers and a computed content length.
///
/// This never fails: if `data` cannot be serialized the error is logged and
/// the call recurses into a 500 response with an `{"error": ...}` body, so
/// callers always get well-formed JSON back.
pub fn json<T: Serialize>(data: &T, init: ResponseInit) -> Response {
    let serialized = if init.pretty {
        serde_json::to_vec_pretty(data)
    } else {
        serde_json::to_vec(data)
    };
    match serialized {
        Ok(body) => {
            let mut response = Response::new(init.status_code)
                .with_header("Content-Type", CONTENT_TYPE_JSON)
                .with_header("Access-Control-Allow-Origin", "*")
                .with_header("Access-Control-Allow-Headers", "*")
                .with_header("Access-Control-Allow-Methods", "*")
                .with_header("Content-Length", &body.len().to_string())
                .with_body(body);
            for (header, value) in init.headers {
                response = response.with_header(&header, &value);
            }
            response
        }
        Err(e) => {
            error!("json serialization failed: {}", e);
            json(
                &serde_json::json!({ "error": e.to_string() }),
                ResponseInit::new().with_status_code(500),
            )
        }
    }
}

/// The `{"error": message}` response shape used for handler failures.
pub fn error_json(message: &str, status_code: u16) -> Response {
    json(
        &serde_json::json!({ "error": message }),
        ResponseInit::new().with_status_code(status_code),
    )
}
