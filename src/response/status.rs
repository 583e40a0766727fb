//! Default reason phrases for HTTP status codes.

/// Reason phrase for a status code, "Unknown" if unassigned.
pub fn default(status_code: u16) -> String {
    let reason = match status_code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    };
    reason.to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(default(200), "OK");
        assert_eq!(default(404), "Not Found");
        assert_eq!(default(405), "Method Not Allowed");
        assert_eq!(default(500), "Internal Server Error");
    }

    #[test]
    fn test_unassigned_code() {
        assert_eq!(default(299), "Unknown");
    }
}
