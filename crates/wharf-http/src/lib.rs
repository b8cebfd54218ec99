//! Incremental HTTP/1.x parsing and serving for wharf.
//!
//! The core of this crate is a resumable byte-level request parser
//! built for server-side use: one parser per in-flight request, fed
//! by a non-blocking transport that may deliver the message in
//! arbitrarily small fragments. Around it sit the parse driver (read
//! loop and body handling), the form decoder, and a TCP server that
//! dispatches completed requests to a handler.
//!
//! # Features
//!
//! - Strict per-field caps against hostile input — exceeding any cap
//!   is a hard parse failure, never a truncation
//! - CRLF, bare-LF, and bare-CR line termination as seen on the wire
//! - Header/body phase handoff mid-read without rewinding
//! - `application/x-www-form-urlencoded` body and query-string
//!   decoding into a parameter multimap
//!
//! # Example
//!
//! ```ignore
//! use wharf_http::{FeedStatus, RequestParser};
//!
//! let mut parser = RequestParser::new();
//! let status = parser.feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n")?;
//! assert!(matches!(status, FeedStatus::Done { .. }));
//! ```

#![deny(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::single_match_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod connection;
mod driver;
pub mod form;
mod parser;
mod response;
mod server;
pub mod token;

pub use connection::{ConnectionInfo, should_keep_alive};
pub use driver::{DEFAULT_READ_BUFFER_SIZE, ReadOutcome, TransportError, read_request};
pub use form::{FORM_NAME_MAX, FORM_VALUE_MAX, FormError, decode_cookies, decode_form, decode_multipart};
pub use parser::{
    CONTENT_MAX, FeedStatus, HEADER_NAME_MAX, HEADER_VALUE_MAX, METHOD_MAX, ParseError,
    ParseLimits, QUERY_STRING_MAX, RESOURCE_MAX, RequestParser,
};
pub use response::ResponseWriter;
pub use server::{ServerConfig, TcpServer};
