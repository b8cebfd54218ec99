//! Incremental HTTP/1.x request parser.
//!
//! [`RequestParser`] is a resumable byte-level state machine: feed it
//! chunks as they arrive from the transport and it consumes one byte
//! per step, committing fields into a [`Request`] at token boundaries.
//! It never buffers the whole message, never re-reads a byte, and
//! enforces a hard cap on every in-progress field.
//!
//! # Line terminators
//!
//! The wire has historically carried CRLF, bare LF, and bare CR line
//! endings; all three are accepted. After a CR the parser expects LF
//! but also accepts a second CR (bare-CR termination of the message at
//! the blank line) or continuation whitespace; the bare-LF case is
//! symmetric. Continuation whitespace starts a new header rather than
//! extending the previous value.
//!
//! # Example
//!
//! ```ignore
//! use wharf_http::{FeedStatus, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! match parser.feed(b"GET /search?q=abc HTTP/1.1\r\nHost: x\r\n\r\n")? {
//!     FeedStatus::Done { consumed } => {
//!         let request = parser.into_request();
//!         assert_eq!(request.method(), "GET");
//!     }
//!     FeedStatus::NeedMore => { /* read more bytes */ }
//! }
//! ```

use crate::token::{is_control, is_digit, is_token_byte};
use wharf_core::{HttpVersion, Request};

/// Maximum method length in bytes: 1 KB.
pub const METHOD_MAX: usize = 1024;
/// Maximum resource (URI path) length in bytes: 256 KB.
pub const RESOURCE_MAX: usize = 256 * 1024;
/// Maximum query string length in bytes: 1 MB.
pub const QUERY_STRING_MAX: usize = 1024 * 1024;
/// Maximum header name length in bytes: 1 KB.
pub const HEADER_NAME_MAX: usize = 1024;
/// Maximum header value length in bytes: 1 MB.
pub const HEADER_VALUE_MAX: usize = 1024 * 1024;
/// Maximum request body length in bytes: 1 MB.
pub const CONTENT_MAX: usize = 1024 * 1024;

/// Parsing limits for one request.
///
/// Exceeding any limit is a hard parse failure; fields are never
/// truncated.
#[derive(Debug, Clone)]
pub struct ParseLimits {
    /// Maximum method length in bytes.
    pub method_max: usize,
    /// Maximum resource (URI path) length in bytes.
    pub resource_max: usize,
    /// Maximum query string length in bytes.
    pub query_string_max: usize,
    /// Maximum header name length in bytes.
    pub header_name_max: usize,
    /// Maximum header value length in bytes.
    pub header_value_max: usize,
    /// Maximum body length in bytes.
    pub content_max: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            method_max: METHOD_MAX,
            resource_max: RESOURCE_MAX,
            query_string_max: QUERY_STRING_MAX,
            header_name_max: HEADER_NAME_MAX,
            header_value_max: HEADER_VALUE_MAX,
            content_max: CONTENT_MAX,
        }
    }
}

/// HTTP parsing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Invalid byte in the request line.
    InvalidRequestLine,
    /// Malformed HTTP version.
    InvalidVersion,
    /// Invalid byte in a header name or value.
    InvalidHeader,
    /// Method exceeds its cap.
    MethodTooLong,
    /// Resource exceeds its cap.
    ResourceTooLong,
    /// Query string exceeds its cap.
    QueryStringTooLong,
    /// Header name exceeds its cap.
    HeaderNameTooLong,
    /// Header value exceeds its cap.
    HeaderValueTooLong,
    /// Multiple Content-Length headers with differing values.
    ConflictingContentLength,
    /// Content-Length exceeds the body cap.
    ContentTooLarge,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestLine => write!(f, "invalid request line"),
            Self::InvalidVersion => write!(f, "invalid HTTP version"),
            Self::InvalidHeader => write!(f, "invalid header"),
            Self::MethodTooLong => write!(f, "method too long"),
            Self::ResourceTooLong => write!(f, "resource too long"),
            Self::QueryStringTooLong => write!(f, "query string too long"),
            Self::HeaderNameTooLong => write!(f, "header name too long"),
            Self::HeaderValueTooLong => write!(f, "header value too long"),
            Self::ConflictingContentLength => write!(f, "conflicting content-length headers"),
            Self::ContentTooLarge => write!(f, "content-length exceeds body cap"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Result of feeding one chunk to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Headers are complete. `consumed` is the index of the first
    /// unconsumed byte in the fed chunk; everything after it belongs
    /// to the body.
    Done {
        /// Index of the first unconsumed byte in the fed chunk.
        consumed: usize,
    },
    /// The chunk was exhausted mid-parse; feed more bytes.
    NeedMore,
}

/// Parser state, one variant per byte-level position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    MethodStart,
    Method,
    UriStem,
    UriQuery,
    VersionH,
    VersionT1,
    VersionT2,
    VersionP,
    VersionSlash,
    VersionMajorStart,
    VersionMajor,
    VersionMinorStart,
    VersionMinor,
    /// Saw CR, expecting LF.
    ExpectingNewline,
    /// Saw a bare LF, expecting CR.
    ExpectingCr,
    /// Consuming whitespace before a header name.
    HeaderWhitespace,
    /// At the start of a header line.
    HeaderStart,
    HeaderName,
    SpaceBeforeHeaderValue,
    HeaderValue,
    /// Saw the final CR; an LF, if present, ends the message.
    ExpectingFinalNewline,
    /// Saw the final bare LF; a CR, if present, ends the message.
    ExpectingFinalCr,
}

/// Incremental request parser; one instance per in-flight request.
#[derive(Debug)]
pub struct RequestParser {
    limits: ParseLimits,
    state: ParseState,
    request: Request,
    method: Vec<u8>,
    resource: Vec<u8>,
    query_string: Vec<u8>,
    header_name: Vec<u8>,
    header_value: Vec<u8>,
    version_major: u32,
    version_minor: u32,
}

impl RequestParser {
    /// Create a parser with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(ParseLimits::default())
    }

    /// Create a parser with the given limits.
    #[must_use]
    pub fn with_limits(limits: ParseLimits) -> Self {
        Self {
            limits,
            state: ParseState::MethodStart,
            request: Request::new(),
            method: Vec::new(),
            resource: Vec::new(),
            query_string: Vec::new(),
            header_name: Vec::new(),
            header_value: Vec::new(),
            version_major: 0,
            version_minor: 0,
        }
    }

    /// Consume the parser and return the request built so far.
    ///
    /// After [`FeedStatus::Done`] the request holds the parsed request
    /// line and headers; after an error it holds whatever was
    /// committed before the failure and remains marked invalid.
    #[must_use]
    pub fn into_request(self) -> Request {
        self.request
    }

    /// Feed a chunk of bytes to the state machine.
    ///
    /// Bytes are consumed left-to-right, one per step; the parser
    /// never rewinds. A single call processes the chunk either to
    /// exhaustion ([`FeedStatus::NeedMore`]) or to the end of the
    /// header section ([`FeedStatus::Done`]).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] on malformed input or an exceeded cap.
    /// The caller is expected to mark the request invalid and stop
    /// feeding.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<FeedStatus, ParseError> {
        let mut i = 0;
        while i < chunk.len() {
            let byte = chunk[i];
            match self.state {
                ParseState::MethodStart => {
                    if !is_token_byte(byte) {
                        return Err(ParseError::InvalidRequestLine);
                    }
                    self.method.clear();
                    self.method.push(byte);
                    self.state = ParseState::Method;
                }

                ParseState::Method => {
                    if byte == b' ' {
                        let method = commit_string(&mut self.method)?;
                        self.request.set_method(method);
                        self.resource.clear();
                        self.state = ParseState::UriStem;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidRequestLine);
                    } else if self.method.len() >= self.limits.method_max {
                        return Err(ParseError::MethodTooLong);
                    } else {
                        self.method.push(byte);
                    }
                }

                ParseState::UriStem => {
                    if byte == b' ' {
                        let resource = commit_string(&mut self.resource)?;
                        self.request.set_resource(resource);
                        self.state = ParseState::VersionH;
                    } else if byte == b'?' {
                        let resource = commit_string(&mut self.resource)?;
                        self.request.set_resource(resource);
                        self.query_string.clear();
                        self.state = ParseState::UriQuery;
                    } else if is_control(byte) {
                        return Err(ParseError::InvalidRequestLine);
                    } else if self.resource.len() >= self.limits.resource_max {
                        return Err(ParseError::ResourceTooLong);
                    } else {
                        self.resource.push(byte);
                    }
                }

                ParseState::UriQuery => {
                    if byte == b' ' {
                        let query_string = commit_string(&mut self.query_string)?;
                        self.request.set_query_string(query_string);
                        self.state = ParseState::VersionH;
                    } else if is_control(byte) {
                        return Err(ParseError::InvalidRequestLine);
                    } else if self.query_string.len() >= self.limits.query_string_max {
                        return Err(ParseError::QueryStringTooLong);
                    } else {
                        self.query_string.push(byte);
                    }
                }

                ParseState::VersionH => {
                    if byte != b'H' {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.state = ParseState::VersionT1;
                }

                ParseState::VersionT1 => {
                    if byte != b'T' {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.state = ParseState::VersionT2;
                }

                ParseState::VersionT2 => {
                    if byte != b'T' {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.state = ParseState::VersionP;
                }

                ParseState::VersionP => {
                    if byte != b'P' {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.state = ParseState::VersionSlash;
                }

                ParseState::VersionSlash => {
                    if byte != b'/' {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.state = ParseState::VersionMajorStart;
                }

                ParseState::VersionMajorStart => {
                    if !is_digit(byte) {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.version_major = u32::from(byte - b'0');
                    self.state = ParseState::VersionMajor;
                }

                ParseState::VersionMajor => {
                    if byte == b'.' {
                        self.state = ParseState::VersionMinorStart;
                    } else if is_digit(byte) {
                        self.version_major = self
                            .version_major
                            .saturating_mul(10)
                            .saturating_add(u32::from(byte - b'0'));
                    } else {
                        return Err(ParseError::InvalidVersion);
                    }
                }

                ParseState::VersionMinorStart => {
                    if !is_digit(byte) {
                        return Err(ParseError::InvalidVersion);
                    }
                    self.version_minor = u32::from(byte - b'0');
                    self.state = ParseState::VersionMinor;
                }

                ParseState::VersionMinor => {
                    if byte == b'\r' {
                        self.commit_version();
                        self.state = ParseState::ExpectingNewline;
                    } else if byte == b'\n' {
                        self.commit_version();
                        self.state = ParseState::ExpectingCr;
                    } else if is_digit(byte) {
                        self.version_minor = self
                            .version_minor
                            .saturating_mul(10)
                            .saturating_add(u32::from(byte - b'0'));
                    } else {
                        return Err(ParseError::InvalidVersion);
                    }
                }

                ParseState::ExpectingNewline => {
                    if byte == b'\n' {
                        self.state = ParseState::HeaderStart;
                    } else if byte == b'\r' {
                        // Two CRs in a row: bare CR is (incorrectly)
                        // terminating lines, and this one is the blank
                        // line. The message is finished.
                        return Ok(FeedStatus::Done { consumed: i + 1 });
                    } else if byte == b'\t' || byte == b' ' {
                        self.state = ParseState::HeaderWhitespace;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else {
                        self.header_name.clear();
                        self.header_name.push(byte);
                        self.state = ParseState::HeaderName;
                    }
                }

                ParseState::ExpectingCr => {
                    if byte == b'\r' {
                        self.state = ParseState::HeaderStart;
                    } else if byte == b'\n' {
                        // Two LFs in a row: bare LF line termination,
                        // blank line reached, message finished.
                        return Ok(FeedStatus::Done { consumed: i + 1 });
                    } else if byte == b'\t' || byte == b' ' {
                        self.state = ParseState::HeaderWhitespace;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else {
                        self.header_name.clear();
                        self.header_name.push(byte);
                        self.state = ParseState::HeaderName;
                    }
                }

                ParseState::HeaderWhitespace => {
                    if byte == b'\r' {
                        self.state = ParseState::ExpectingNewline;
                    } else if byte == b'\n' {
                        self.state = ParseState::ExpectingCr;
                    } else if byte != b'\t' && byte != b' ' {
                        if !is_token_byte(byte) {
                            return Err(ParseError::InvalidHeader);
                        }
                        // A folded continuation line begins a new
                        // header rather than extending the previous
                        // value.
                        self.header_name.clear();
                        self.header_name.push(byte);
                        self.state = ParseState::HeaderName;
                    }
                }

                ParseState::HeaderStart => {
                    if byte == b'\r' {
                        self.state = ParseState::ExpectingFinalNewline;
                    } else if byte == b'\n' {
                        self.state = ParseState::ExpectingFinalCr;
                    } else if byte == b'\t' || byte == b' ' {
                        self.state = ParseState::HeaderWhitespace;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else {
                        self.header_name.clear();
                        self.header_name.push(byte);
                        self.state = ParseState::HeaderName;
                    }
                }

                ParseState::HeaderName => {
                    if byte == b':' {
                        self.header_value.clear();
                        self.state = ParseState::SpaceBeforeHeaderValue;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else if self.header_name.len() >= self.limits.header_name_max {
                        return Err(ParseError::HeaderNameTooLong);
                    } else {
                        self.header_name.push(byte);
                    }
                }

                ParseState::SpaceBeforeHeaderValue => {
                    if byte == b' ' {
                        self.state = ParseState::HeaderValue;
                    } else if byte == b'\r' {
                        self.commit_header()?;
                        self.state = ParseState::ExpectingNewline;
                    } else if byte == b'\n' {
                        self.commit_header()?;
                        self.state = ParseState::ExpectingCr;
                    } else if !is_token_byte(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else {
                        self.header_value.push(byte);
                        self.state = ParseState::HeaderValue;
                    }
                }

                ParseState::HeaderValue => {
                    if byte == b'\r' {
                        self.commit_header()?;
                        self.state = ParseState::ExpectingNewline;
                    } else if byte == b'\n' {
                        self.commit_header()?;
                        self.state = ParseState::ExpectingCr;
                    } else if is_control(byte) {
                        return Err(ParseError::InvalidHeader);
                    } else if self.header_value.len() >= self.limits.header_value_max {
                        return Err(ParseError::HeaderValueTooLong);
                    } else {
                        self.header_value.push(byte);
                    }
                }

                ParseState::ExpectingFinalNewline => {
                    if byte == b'\n' {
                        return Ok(FeedStatus::Done { consumed: i + 1 });
                    }
                    return Ok(FeedStatus::Done { consumed: i });
                }

                ParseState::ExpectingFinalCr => {
                    if byte == b'\r' {
                        return Ok(FeedStatus::Done { consumed: i + 1 });
                    }
                    return Ok(FeedStatus::Done { consumed: i });
                }
            }

            i += 1;
        }

        Ok(FeedStatus::NeedMore)
    }

    fn commit_version(&mut self) {
        self.request
            .set_version(HttpVersion::new(self.version_major, self.version_minor));
    }

    fn commit_header(&mut self) -> Result<(), ParseError> {
        let name = String::from_utf8(std::mem::take(&mut self.header_name))
            .map_err(|_| ParseError::InvalidHeader)?;
        let value = std::mem::take(&mut self.header_value);
        self.request.headers_mut().append(name, value);
        Ok(())
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Move a scratch buffer into a `String`, rejecting non-UTF-8 bytes.
fn commit_string(scratch: &mut Vec<u8>) -> Result<String, ParseError> {
    String::from_utf8(std::mem::take(scratch)).map_err(|_| ParseError::InvalidRequestLine)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed the whole input as one chunk and expect completed headers.
    fn parse(input: &[u8]) -> (Request, usize) {
        let mut parser = RequestParser::new();
        match parser.feed(input) {
            Ok(FeedStatus::Done { consumed }) => (parser.into_request(), consumed),
            other => panic!("expected Done, got {other:?}"),
        }
    }

    fn parse_err(input: &[u8]) -> ParseError {
        let mut parser = RequestParser::new();
        match parser.feed(input) {
            Err(err) => err,
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_get_crlf() {
        let (request, consumed) = parse(b"GET / HTTP/1.0\r\n\r\n");
        assert_eq!(consumed, 18);
        assert_eq!(request.method(), "GET");
        assert_eq!(request.resource(), "/");
        assert_eq!(request.query_string(), "");
        assert_eq!(request.version(), HttpVersion::new(1, 0));
        assert!(request.headers().is_empty());
    }

    #[test]
    fn get_with_query_and_header() {
        let (request, _) = parse(b"GET /search?q=abc&lang=en HTTP/1.1\r\nHost: x\r\n\r\n");
        assert_eq!(request.resource(), "/search");
        assert_eq!(request.query_string(), "q=abc&lang=en");
        assert_eq!(request.version(), HttpVersion::new(1, 1));
        assert_eq!(request.headers().get("Host"), Some(b"x".as_slice()));
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn header_names_stored_verbatim() {
        let (request, _) = parse(b"GET / HTTP/1.1\r\nhOsT: x\r\n\r\n");
        let names: Vec<_> = request.headers().iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, vec!["hOsT".to_string()]);
        assert_eq!(request.headers().get("Host"), Some(b"x".as_slice()));
    }

    #[test]
    fn duplicate_headers_preserved_in_order() {
        let (request, _) = parse(b"GET / HTTP/1.1\r\nA: 1\r\nA: 2\r\n\r\n");
        let values: Vec<_> = request.headers().get_all("a").collect();
        assert_eq!(values, vec![b"1".as_slice(), b"2".as_slice()]);
    }

    #[test]
    fn bare_lf_line_terminators() {
        let (request, consumed) = parse(b"GET / HTTP/1.0\nHost: x\n\n");
        assert_eq!(consumed, 24);
        assert_eq!(request.headers().get("Host"), Some(b"x".as_slice()));
        assert_eq!(request.version(), HttpVersion::new(1, 0));
    }

    #[test]
    fn bare_cr_line_terminators() {
        let (request, consumed) = parse(b"GET / HTTP/1.0\rHost: x\r\r");
        assert_eq!(consumed, 24);
        assert_eq!(request.headers().get("Host"), Some(b"x".as_slice()));
    }

    #[test]
    fn mixed_terminators() {
        // CRLF on the request line, bare LF between headers.
        let (request, _) = parse(b"GET / HTTP/1.1\r\nA: 1\nB: 2\n\n");
        assert_eq!(request.headers().get("A"), Some(b"1".as_slice()));
        assert_eq!(request.headers().get("B"), Some(b"2".as_slice()));
    }

    #[test]
    fn done_mid_chunk_leaves_body_bytes() {
        let (request, consumed) = parse(b"POST /p HTTP/1.0\r\nContent-Length: 4\r\n\r\nbody");
        let input = b"POST /p HTTP/1.0\r\nContent-Length: 4\r\n\r\nbody";
        assert_eq!(&input[consumed..], b"body");
        assert_eq!(
            request.headers().get("content-length"),
            Some(b"4".as_slice())
        );
    }

    #[test]
    fn chunked_feed_is_equivalent() {
        let input: &[u8] = b"POST /f?x=1 HTTP/1.1\r\nHost: example\r\nContent-Type: text/plain\r\n\r\n";
        for split in 1..input.len() - 1 {
            let mut parser = RequestParser::new();
            assert_eq!(
                parser.feed(&input[..split]).expect("prefix feeds cleanly"),
                FeedStatus::NeedMore,
                "split at {split}"
            );
            match parser.feed(&input[split..]).expect("suffix feeds cleanly") {
                FeedStatus::Done { consumed } => {
                    assert_eq!(split + consumed, input.len(), "split at {split}");
                }
                FeedStatus::NeedMore => panic!("incomplete at split {split}"),
            }
            let request = parser.into_request();
            assert_eq!(request.method(), "POST");
            assert_eq!(request.resource(), "/f");
            assert_eq!(request.query_string(), "x=1");
            assert_eq!(request.headers().len(), 2);
        }
    }

    #[test]
    fn byte_at_a_time_feed() {
        let input: &[u8] = b"GET /search?q=abc HTTP/1.1\r\nHost: x\r\n\r\n";
        let mut parser = RequestParser::new();
        let mut done_at = None;
        for (i, byte) in input.iter().enumerate() {
            match parser.feed(std::slice::from_ref(byte)).expect("byte feeds") {
                FeedStatus::NeedMore => {}
                FeedStatus::Done { consumed } => {
                    done_at = Some((i, consumed));
                    break;
                }
            }
        }
        let (i, consumed) = done_at.expect("parse completes");
        assert_eq!(i, input.len() - 1);
        assert_eq!(consumed, 1);
        let request = parser.into_request();
        assert_eq!(request.resource(), "/search");
        assert_eq!(request.query_string(), "q=abc");
    }

    #[test]
    fn folded_header_starts_new_header() {
        // Continuation whitespace begins a new header; "bar" here is a
        // new name, not an extension of the previous value.
        let (request, _) = parse(b"GET / HTTP/1.1\r\nX-A: 1\r\n  X-B: 2\r\n\r\n");
        assert_eq!(request.headers().get("X-A"), Some(b"1".as_slice()));
        assert_eq!(request.headers().get("X-B"), Some(b"2".as_slice()));
        assert_eq!(request.headers().len(), 2);
    }

    #[test]
    fn whitespace_only_line_then_end() {
        let (request, _) = parse(b"GET / HTTP/1.1\r\n   \r\n\r\n");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn header_without_value() {
        let (request, _) = parse(b"GET / HTTP/1.1\r\nX-Empty:\r\n\r\n");
        assert_eq!(request.headers().get("X-Empty"), Some(b"".as_slice()));
    }

    #[test]
    fn header_value_leading_space_stripped() {
        let (request, _) = parse(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert_eq!(request.headers().get("Host"), Some(b"example.com".as_slice()));
    }

    #[test]
    fn multi_digit_version() {
        let (request, _) = parse(b"GET / HTTP/12.34\r\n\r\n");
        assert_eq!(request.version(), HttpVersion::new(12, 34));
    }

    #[test]
    fn version_digit_overflow_saturates() {
        let input = format!("GET / HTTP/{}.1\r\n\r\n", "9".repeat(20));
        let (request, _) = parse(input.as_bytes());
        assert_eq!(request.version().major, u32::MAX);
        assert_eq!(request.version().minor, 1);
    }

    #[test]
    fn method_at_cap_passes() {
        let input = format!("{} / HTTP/1.0\r\n\r\n", "A".repeat(METHOD_MAX));
        let (request, _) = parse(input.as_bytes());
        assert_eq!(request.method().len(), METHOD_MAX);
    }

    #[test]
    fn method_over_cap_fails() {
        let input = format!("{} / HTTP/1.0\r\n\r\n", "A".repeat(METHOD_MAX + 1));
        assert_eq!(parse_err(input.as_bytes()), ParseError::MethodTooLong);
    }

    #[test]
    fn header_name_over_cap_fails() {
        let input = format!("GET / HTTP/1.0\r\n{}: x\r\n\r\n", "H".repeat(HEADER_NAME_MAX + 1));
        assert_eq!(parse_err(input.as_bytes()), ParseError::HeaderNameTooLong);
    }

    #[test]
    fn small_limits_are_honored() {
        let limits = ParseLimits {
            resource_max: 8,
            ..ParseLimits::default()
        };
        let mut parser = RequestParser::with_limits(limits);
        let result = parser.feed(b"GET /123456789 HTTP/1.0\r\n\r\n");
        assert_eq!(result, Err(ParseError::ResourceTooLong));
    }

    #[test]
    fn bad_method_byte_fails() {
        assert_eq!(parse_err(b"GE T / HTTP/1.0\r\n\r\n"), ParseError::InvalidVersion);
        assert_eq!(parse_err(b"G(T / HTTP/1.0\r\n\r\n"), ParseError::InvalidRequestLine);
        assert_eq!(parse_err(b"\x01GET / HTTP/1.0\r\n\r\n"), ParseError::InvalidRequestLine);
    }

    #[test]
    fn control_byte_in_resource_fails() {
        assert_eq!(parse_err(b"GET /\x07 HTTP/1.0\r\n\r\n"), ParseError::InvalidRequestLine);
    }

    #[test]
    fn control_byte_in_query_fails() {
        assert_eq!(
            parse_err(b"GET /p?a\x01b HTTP/1.0\r\n\r\n"),
            ParseError::InvalidRequestLine
        );
    }

    #[test]
    fn garbled_version_fails() {
        assert_eq!(parse_err(b"GET / HTXP/1.0\r\n\r\n"), ParseError::InvalidVersion);
        assert_eq!(parse_err(b"GET / HTTP1.0\r\n\r\n"), ParseError::InvalidVersion);
        assert_eq!(parse_err(b"GET / HTTP/x.0\r\n\r\n"), ParseError::InvalidVersion);
        assert_eq!(parse_err(b"GET / HTTP/1.\r\n\r\n"), ParseError::InvalidVersion);
    }

    #[test]
    fn control_byte_in_header_value_fails() {
        assert_eq!(
            parse_err(b"GET / HTTP/1.1\r\nX: a\x02b\r\n\r\n"),
            ParseError::InvalidHeader
        );
    }

    #[test]
    fn separator_in_header_name_fails() {
        assert_eq!(
            parse_err(b"GET / HTTP/1.1\r\nBad Header: x\r\n\r\n"),
            ParseError::InvalidHeader
        );
    }

    #[test]
    fn error_state_is_sticky_in_request() {
        let mut parser = RequestParser::new();
        assert!(parser.feed(b"GET /\x07").is_err());
        let request = parser.into_request();
        assert!(!request.is_valid());
    }

    #[test]
    fn non_utf8_resource_fails() {
        assert_eq!(
            parse_err(b"GET /caf\xff HTTP/1.0\r\n\r\n"),
            ParseError::InvalidRequestLine
        );
    }
}
