use crate::http::headers::Headers;

/// The first line of a request: `METHOD SP TARGET SP HTTP/1.1`.
///
/// `version` holds only the numeric part (`"1.1"`), not the `HTTP/` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Upper-case method token (e.g. "GET")
    pub method: String,
    /// Request target exactly as sent (e.g. "/index.html?x=1")
    pub target: String,
    /// Protocol version without the scheme (always "1.1")
    pub version: String,
}

/// Represents a parsed HTTP request from a client.
///
/// Built by [`RequestParser`](crate::http::parser::RequestParser) and never
/// mutated after parsing completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub request_line: RequestLine,
    /// Request headers, names lower-cased
    pub headers: Headers,
    /// Exactly `Content-Length` bytes, or empty when none was declared
    pub body: Vec<u8>,
}

impl Request {
    pub fn method(&self) -> &str {
        &self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn version(&self) -> &str {
        &self.request_line.version
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Declared body length.
    ///
    /// Returns `None` if the header is missing or not a valid number.
    pub fn content_length(&self) -> Option<usize> {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
    }
}
