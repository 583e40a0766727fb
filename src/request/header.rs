use std::fmt;

/// An HTTP header name, normalized to lower case on construction so that
/// map lookups ignore the case the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header(String);

impl Header {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Header {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<Header> for String {
    fn from(header: Header) -> Self {
        header.0
    }
}
