//! Incremental HTTP/1.x request parsing.
use std::collections::HashMap;
use std::fmt;
use std::io::{ErrorKind, Read};

use crate::request::{Header, Method, Params, Request};

// Bounds on the request head so a bad client cannot grow buffers forever.
const MAX_LINE_LENGTH: usize = 8 * 1024;
const MAX_HEADER_COUNT: usize = 100;

/// Reads one HTTP/1.x request off a byte stream.
///
/// The head is consumed a byte at a time and the body with sized reads, so
/// the parser never takes more off the stream than the request it returns,
/// and a second request on the same stream stays intact for the next
/// parse. Malformed input yields a [`RequestParserError`] carrying the
/// stream offset where parsing gave up.
pub struct RequestParser<R: Read> {
    stream: R,
    consumed: usize,
}

impl<R: Read> RequestParser<R> {
    pub fn new(stream: R) -> Self {
        Self {
            stream,
            consumed: 0,
        }
    }

    fn fail(&self, reason: &str) -> RequestParserError {
        RequestParserError::new(self.consumed, reason)
    }

    /// Next byte of the stream, None at end of input.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.consumed += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// One CRLF-terminated line, without the terminator.
    fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        loop {
            match self.next_byte()? {
                None => return Err(self.fail("unexpected end of input")),
                Some(b'\n') => break,
                Some(byte) => line.push(byte),
            }
            if line.len() > MAX_LINE_LENGTH {
                return Err(self.fail("line too long"));
            }
        }
        if line.pop() != Some(b'\r') {
            return Err(self.fail("expected CRLF line ending"));
        }
        String::from_utf8(line).map_err(|_| self.fail("line is not valid UTF-8"))
    }

    fn read_body(&mut self, content_length: usize) -> Result<Vec<u8>> {
        let mut body = vec![0u8; content_length];
        let mut filled = 0;
        while filled < content_length {
            match self.stream.read(&mut body[filled..]) {
                Ok(0) => {
                    return Err(self.fail(&format!(
                        "expected {} more bytes of body",
                        content_length - filled
                    )))
                }
                Ok(n) => {
                    filled += n;
                    self.consumed += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(body)
    }

    /// Request line: method, request target, protocol version.
    fn request_line(&mut self) -> Result<(Method, String, String)> {
        let line = self.read_line()?;
        let mut words = line.split(' ').filter(|w| !w.is_empty());
        let method = words
            .next()
            .ok_or_else(|| self.fail("empty request line"))?
            .parse::<Method>()
            .map_err(|e| self.fail(&e.to_string()))?;
        let target = words
            .next()
            .ok_or_else(|| self.fail("missing request target"))?;
        let version = words
            .next()
            .ok_or_else(|| self.fail("missing protocol version"))?;
        if words.next().is_some() {
            return Err(self.fail("malformed request line"));
        }
        if !version.starts_with("HTTP/1.") {
            return Err(self.fail("unsupported protocol version"));
        }
        if !target.starts_with('/') {
            return Err(self.fail("request target must start with /"));
        }
        Ok((method, target.to_string(), version.to_string()))
    }

    fn headers(&mut self) -> Result<HashMap<Header, String>> {
        let mut headers = HashMap::new();
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Ok(headers);
            }
            if headers.len() == MAX_HEADER_COUNT {
                return Err(self.fail("too many headers"));
            }
            let mut parts = line.splitn(2, ':');
            let name = parts.next().unwrap_or("");
            let value = parts
                .next()
                .ok_or_else(|| self.fail("malformed header line"))?;
            if name.is_empty() {
                return Err(self.fail("empty header name"));
            }
            headers.insert(Header::new(name), value.trim().to_string());
        }
    }

    /// Parse the next HTTP request in the stream.
    pub fn parse(&mut self) -> Result<Request> {
        let (method, target, _version) = self.request_line()?;
        let (path, query) = match target.find('?') {
            Some(at) => (&target[..at], &target[at + 1..]),
            None => (&target[..], ""),
        };
        let headers = self.headers()?;

        let content_length = match headers.get(&Header::new("content-length")) {
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| self.fail("invalid content-length"))?,
            None => 0,
        };
        let body = if content_length > 0 {
            Some(self.read_body(content_length)?)
        } else {
            None
        };
        Ok(Request {
            method,
            path: path.to_string(),
            query: query.to_string(),
            query_params: Params::from_query(query),
            headers,
            body,
            content_length,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestParserError {
    position: usize,
    reason: String,
}

impl RequestParserError {
    pub fn new(position: usize, reason: &str) -> Self {
        Self {
            position,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for RequestParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bad request at byte {}: {}", self.position, self.reason)
    }
}

impl From<std::io::Error> for RequestParserError {
    fn from(err: std::io::Error) -> Self {
        RequestParserError::new(0, &err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RequestParserError>;

#[cfg(test)]
mod test {
    use super::*;

    fn parse(bytes: &[u8]) -> Result<Request> {
        RequestParser::new(bytes).parse()
    }

    fn parse_error(bytes: &[u8]) -> String {
        parse(bytes).unwrap_err().reason
    }

    #[test]
    fn test_get_request() {
        let request = parse(b"GET /path HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/path");
        assert_eq!(request.query, "");
        assert_eq!(request.header("host"), Some(&"localhost".to_string()));
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_query_string_is_split_and_parsed() {
        let request = parse(b"GET /search?q=cats&page=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path, "/search");
        assert_eq!(request.query, "q=cats&page=2");
        assert_eq!(request.query_params.get("q"), Some(&"cats".to_string()));
        assert_eq!(request.query_params.get("page"), Some(&"2".to_string()));
        assert_eq!(request.query_params.get("missing"), None);
    }

    #[test]
    fn test_post_with_body() {
        let request =
            parse(b"POST /submit HTTP/1.1\r\nContent-Length: 9\r\n\r\nname=test").unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.content_length, 9);
        assert_eq!(request.body, Some(b"name=test".to_vec()));
    }

    #[test]
    fn test_body_only_read_to_content_length() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nfoobar";
        let mut parser = RequestParser::new(&raw[..]);
        let request = parser.parse().unwrap();
        assert_eq!(request.body, Some(b"foo".to_vec()));
    }

    #[test]
    fn test_two_requests_on_one_stream() {
        let raw = b"GET /first HTTP/1.1\r\n\r\nGET /second HTTP/1.1\r\n\r\n";
        let mut stream = &raw[..];
        assert_eq!(RequestParser::new(&mut stream).parse().unwrap().path, "/first");
        assert_eq!(RequestParser::new(&mut stream).parse().unwrap().path, "/second");
    }

    #[test]
    fn test_header_values_are_trimmed() {
        let request = parse(b"GET / HTTP/1.1\r\nAccept:   text/html  \r\n\r\n").unwrap();
        assert_eq!(request.header("accept"), Some(&"text/html".to_string()));
    }

    #[test]
    fn test_unknown_method() {
        assert!(parse_error(b"BREW /pot HTTP/1.1\r\n\r\n").contains("unknown HTTP method"));
        assert!(parse_error(b"get / HTTP/1.1\r\n\r\n").contains("unknown HTTP method"));
    }

    #[test]
    fn test_unsupported_version() {
        assert!(parse_error(b"GET / HTTP/2.0\r\n\r\n").contains("protocol version"));
    }

    #[test]
    fn test_relative_target_rejected() {
        assert!(parse_error(b"GET index.html HTTP/1.1\r\n\r\n").contains("start with /"));
    }

    #[test]
    fn test_bare_lf_line_ending_rejected() {
        assert!(parse_error(b"GET / HTTP/1.1\nHost: localhost\n\n").contains("CRLF"));
    }

    #[test]
    fn test_truncated_body() {
        let err = parse_error(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nfoo");
        assert!(err.contains("7 more bytes"));
    }

    #[test]
    fn test_invalid_content_length() {
        let err = parse_error(b"POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n");
        assert!(err.contains("content-length"));
    }

    #[test]
    fn test_error_position_points_into_stream() {
        let err = parse(b"GET / HTTP/1.1\r\nbroken line\r\n\r\n").unwrap_err();
        assert!(err.position > 0);
        assert!(err.reason.contains("malformed header"));
    }
}
