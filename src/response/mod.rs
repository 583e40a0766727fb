//! HTTP response and status codes.
pub mod status;

/// An HTTP response.
///
/// Headers keep their insertion order on the wire. `Content-Length` is
/// computed from the body when the bytes are written, unless a caller
/// already set one.
///
/// # Example
/// ```
/// # use waypoint::response::Response;
///
/// let response = Response::new(200)
///     .with_header("Content-Type", "text/plain")
///     .with_body(b"Hello!".to_vec());
///
/// # assert_eq!(response.content_length(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub status: String,
    headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Response {
    /// Create a response with the default reason phrase for the code
    /// (200 -> "OK", etc.)
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            status: status::default(status_code),
            headers: Vec::new(),
            body: None,
        }
    }
    /// Change status code (does not update the reason phrase).
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
    /// Change the reason phrase.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }
    pub fn with_header(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.to_string(), value.to_string()));
        self
    }
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }
    /// Serialize to wire bytes: status line, headers, blank line, body.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status_code, self.status);
        let mut has_content_length = false;
        for (header, value) in &self.headers {
            if header.eq_ignore_ascii_case("content-length") {
                has_content_length = true;
            }
            head.push_str(header);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        let body = self.body.unwrap_or_default();
        if !body.is_empty() && !has_content_length {
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend(body);
        bytes
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wire_format() {
        let response = Response::new(404).with_body(b"gone".to_vec());
        let expected = b"HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\ngone";
        assert_eq!(&response.into_bytes()[..], &expected[..]);
    }

    #[test]
    fn test_headers_keep_insertion_order() {
        let response = Response::new(200)
            .with_header("X-First", "1")
            .with_header("X-Second", "2")
            .with_body(b"ok".to_vec());

        let text = String::from_utf8(response.into_bytes()).unwrap();
        let first = text.find("X-First").unwrap();
        let second = text.find("X-Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = Response::new(200).with_header("Content-Type", "text/plain");
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_explicit_content_length_is_not_duplicated() {
        let response = Response::new(200)
            .with_header("Content-Length", "3")
            .with_body(b"foo".to_vec());

        let text = String::from_utf8(response.into_bytes()).unwrap();
        assert_eq!(text.matches("Content-Length").count(), 1);
    }

    #[test]
    fn test_empty_body_has_no_content_length() {
        let text = String::from_utf8(Response::new(204).into_bytes()).unwrap();
        assert!(!text.contains("Content-Length"));
        assert!(text.ends_with("\r\n\r\n"));
    }
}
