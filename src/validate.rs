//! Declarative request validation.
//!
//! A [`Terms`] value states, per HTTP method, which query parameters,
//! headers and top-level JSON body fields a request must carry.
//! [`validate_request`] checks a request against it and hands back the
//! parsed body so it is only read once.
use std::collections::HashMap;

use serde_json::Value;

use crate::request::{Method, Request};

/// Requirements for a single method.
#[derive(Debug, Clone, Default)]
pub struct MethodTerms {
    params: Vec<String>,
    headers: Vec<String>,
    body: Vec<String>,
}

impl MethodTerms {
    pub fn new() -> Self {
        Self::default()
    }
    /// Require a query parameter.
    pub fn with_param(mut self, name: &str) -> Self {
        self.params.push(name.to_string());
        self
    }
    /// Require a header (matched case-insensitively).
    pub fn with_header(mut self, name: &str) -> Self {
        self.headers.push(name.to_string());
        self
    }
    /// Require a top-level field in a JSON body.
    pub fn with_body_field(mut self, name: &str) -> Self {
        self.body.push(name.to_string());
        self
    }
}

/// Per-method validation requirements. Immutable once built.
///
/// # Example
/// ```
/// use waypoint::request::Method;
/// use waypoint::validate::{MethodTerms, Terms};
///
/// let terms = Terms::new()
///     .with_method(Method::GET, MethodTerms::new().with_param("q"))
///     .with_method(
///         Method::POST,
///         MethodTerms::new()
///             .with_header("content-type")
///             .with_body_field("name"),
///     );
/// # let _ = terms;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Terms {
    methods: HashMap<Method, MethodTerms>,
}

impl Terms {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_method(mut self, method: Method, terms: MethodTerms) -> Self {
        self.methods.insert(method, terms);
        self
    }
}

/// A validation failure: returned, not thrown. The caller decides how to
/// respond (typically with [`error_json`](crate::json::error_json)).
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub status_code: u16,
    pub message: String,
}

impl Invalid {
    fn new(status_code: u16, message: String) -> Self {
        Self {
            status_code,
            message,
        }
    }
}

/// Check a request against `terms`.
///
/// On success returns the parsed JSON body when body fields were declared,
/// None otherwise. Failures carry a status code: 405 for a method not in
/// the terms, 400 for missing parameters, headers or body fields.
pub fn validate_request(request: &Request, terms: &Terms) -> Result<Option<Value>, Invalid> {
    let method_terms = match terms.methods.get(&request.method) {
        Some(t) => t,
        None => {
            return Err(Invalid::new(
                405,
                format!("method {} is not allowed", request.method),
            ))
        }
    };

    for name in &method_terms.params {
        if !request.query_params.contains(name) {
            return Err(Invalid::new(
                400,
                format!("missing required query parameter '{}'", name),
            ));
        }
    }

    for name in &method_terms.headers {
        if request.header(name).is_none() {
            return Err(Invalid::new(
                400,
                format!("missing required header '{}'", name),
            ));
        }
    }

    if method_terms.body.is_empty() {
        return Ok(None);
    }

    let bytes = request.body.as_deref().unwrap_or(b"");
    let body: Value = serde_json::from_slice(bytes)
        .map_err(|_| Invalid::new(400, "request body is not valid JSON".to_string()))?;
    let object = body
        .as_object()
        .ok_or_else(|| Invalid::new(400, "request body must be a JSON object".to_string()))?;
    for field in &method_terms.body {
        if !object.contains_key(field) {
            return Err(Invalid::new(
                400,
                format!("missing required body field '{}'", field),
            ));
        }
    }
    Ok(Some(body))
}
