//! HTTP request types.

use std::fmt;

/// Header name carrying the body length.
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";

/// Header name carrying the body media type.
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Media type for form-encoded request bodies.
pub const CONTENT_TYPE_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP version as a numeric major/minor pair.
///
/// The parser builds each component digit-by-digit from the request
/// line, so versions other than 1.0 and 1.1 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpVersion {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
}

impl HttpVersion {
    /// Creates a version pair.
    #[must_use]
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Returns true if this version is at least `major.minor`.
    #[must_use]
    pub fn at_least(self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }

    /// Returns true if this is HTTP/1.1 or later.
    #[must_use]
    pub fn is_http11(self) -> bool {
        self.at_least(1, 1)
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::new(1, 0)
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// HTTP headers collection.
///
/// Names are stored verbatim in insertion order; the same name may
/// appear more than once. Lookups compare names case-insensitively,
/// values are raw bytes (header values are not required to be UTF-8).
#[derive(Debug, Default)]
pub struct Headers {
    entries: Vec<(String, Vec<u8>)>,
}

impl Headers {
    /// Create empty headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a header, preserving any existing entries with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get the first header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Get the first header value as a string, if valid UTF-8.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Iterate all values for a name (case-insensitive), in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Check if a header exists (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove all entries for a name (case-insensitive).
    ///
    /// Returns the first removed value, if any.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        let mut removed = None;
        self.entries.retain_mut(|(n, v)| {
            if n.eq_ignore_ascii_case(name) {
                if removed.is_none() {
                    removed = Some(std::mem::take(v));
                }
                false
            } else {
                true
            }
        });
        removed
    }

    /// Iterate over all headers as (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_slice()))
    }

    /// Returns the number of header entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decoded query/form parameters.
///
/// Insertion-ordered multimap; unlike [`Headers`], parameter names are
/// case-sensitive. Values hold the raw encoded bytes — percent-decoding
/// is the caller's responsibility.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Get the first value for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate all values for a name, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over all (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of parameter entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (n, v) in iter {
            params.append(n, v);
        }
        params
    }
}

/// HTTP request.
///
/// Mutable while the parser and driver fill it in; treated as
/// immutable once handed to a request handler. `is_valid()` reports
/// whether the full message was received without a parse error.
#[derive(Debug, Default)]
pub struct Request {
    method: String,
    resource: String,
    query_string: String,
    version: HttpVersion,
    headers: Headers,
    content_length: usize,
    body: Vec<u8>,
    query_params: Params,
    valid: bool,
}

impl Request {
    /// Create an empty request for the parser to populate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The HTTP method token (e.g. `GET`), stored verbatim.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Set the HTTP method.
    pub fn set_method(&mut self, method: String) {
        self.method = method;
    }

    /// The requested resource (URI path, without the query string).
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Set the requested resource.
    pub fn set_resource(&mut self, resource: String) {
        self.resource = resource;
    }

    /// The raw query string (bytes between `?` and the version), or
    /// empty if the target had none. Percent-encoding is preserved.
    #[must_use]
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Set the raw query string.
    pub fn set_query_string(&mut self, query_string: String) {
        self.query_string = query_string;
    }

    /// The HTTP version pair.
    #[must_use]
    pub fn version(&self) -> HttpVersion {
        self.version
    }

    /// Set the HTTP version.
    pub fn set_version(&mut self, version: HttpVersion) {
        self.version = version;
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Mutable access to the request headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// The body length derived from `Content-Length` (0 when absent).
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Set the body length.
    pub fn set_content_length(&mut self, content_length: usize) {
        self.content_length = content_length;
    }

    /// The request body; exactly `content_length` bytes when valid.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Set the request body.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Take the body, leaving it empty.
    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }

    /// Parameters decoded from the query string and, for form-encoded
    /// requests, the body.
    #[must_use]
    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// Mutable access to the decoded parameters.
    pub fn query_params_mut(&mut self) -> &mut Params {
        &mut self.query_params
    }

    /// True once the full message was received without a parse error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Set the validity flag.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}
