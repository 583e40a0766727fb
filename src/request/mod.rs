//! HTTP request model and parser.
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub use header::*;

pub mod header;
pub mod parser;

/// An HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub headers: HashMap<Header, String>,
    pub body: Option<Vec<u8>>,
    pub content_length: usize,
    pub query_params: Params,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            query: "".to_string(),
            headers: HashMap::new(),
            body: None,
            content_length: 0,
            query_params: Params::new(),
        }
    }
}

impl Request {
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(Header::new(name), value.to_string());
        self
    }
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.content_length = body.len();
        self.body = Some(body);
        self
    }
    /// Value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&Header::new(name))
    }
    /// Request identity used for response caching: method plus full URL.
    pub fn cache_key(&self) -> String {
        if self.query.is_empty() {
            format!("{} {}", self.method, self.path)
        } else {
            format!("{} {}?{}", self.method, self.path, self.query)
        }
    }
}

/// HTTP request methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GET => "GET",
            Self::HEAD => "HEAD",
            Self::POST => "POST",
            Self::PUT => "PUT",
            Self::PATCH => "PATCH",
            Self::DELETE => "DELETE",
            Self::CONNECT => "CONNECT",
            Self::OPTIONS => "OPTIONS",
            Self::TRACE => "TRACE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a method name no HTTP/1.1 verb matches. Method names are
/// case-sensitive, so `get` is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HTTP method '{}'", self.0)
    }
}

impl FromStr for Method {
    type Err = UnknownMethod;
    fn from_str(s: &str) -> Result<Method, UnknownMethod> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "CONNECT" => Ok(Method::CONNECT),
            "OPTIONS" => Ok(Method::OPTIONS),
            "TRACE" => Ok(Method::TRACE),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Multi-valued query parameters parsed from a request's query string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params(HashMap<String, Vec<String>>);

impl Params {
    pub fn new() -> Self {
        Params(HashMap::new())
    }
    /// Parse `name=value&name2=value2` query syntax. Pairs without an `=`
    /// are skipped.
    pub fn from_query(query: &str) -> Self {
        let mut params = Params::new();
        for pair in query.split('&') {
            let mut parts = pair.splitn(2, '=');
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                params.add(name, value);
            }
        }
        params
    }
    pub fn add(&mut self, name: &str, value: &str) {
        self.0
            .entry(name.to_string())
            .or_insert_with(Vec::new)
            .push(value.to_string());
    }
    /// All values for a parameter name.
    pub fn get_all(&self, name: &str) -> Option<&Vec<String>> {
        self.0.get(name)
    }
    /// First value for a parameter name.
    pub fn get(&self, name: &str) -> Option<&String> {
        self.0.get(name).and_then(|values| values.first())
    }
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
