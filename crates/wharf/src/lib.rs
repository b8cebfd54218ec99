//! wharf — a lightweight framework for building HTTP/1.x interfaces.
//!
//! The hard part of the framework is its incremental request parser:
//! a byte-level state machine that is resumable across an unknown
//! number of reads, strictly bounded against hostile input, and
//! tolerant of the line terminators actually observed on the wire.
//! The surrounding pieces — TCP accept loop, request model, handler
//! dispatch, logging — are conventional.
//!
//! # Quick Start
//!
//! ```ignore
//! use wharf::prelude::*;
//!
//! async fn handler(_ctx: RequestContext, req: Request) -> Response {
//!     if !req.is_valid() {
//!         return Response::bad_request();
//!     }
//!     Response::ok().body(format!("hello, {}", req.resource()))
//! }
//!
//! let server = TcpServer::new(ServerConfig::new("0.0.0.0:8000"));
//! // Run with asupersync:
//! // rt.block_on(async { server.serve(&cx, handler).await })?;
//! ```
//!
//! # Crate Structure
//!
//! - [`wharf_core`] — request/response model, context, logging
//! - [`wharf_http`] — incremental parser, form decoder, TCP server

#![forbid(unsafe_code)]

// Re-export crates
pub use wharf_core as core;
pub use wharf_http as http;

// Re-export commonly used types
pub use wharf_core::{
    Headers, HttpVersion, LogConfig, LogLevel, Params, Request, RequestContext, RequestLogger,
    Response, StatusCode,
};
pub use wharf_http::{
    FeedStatus, FormError, ParseError, ParseLimits, ReadOutcome, RequestParser, ServerConfig,
    TcpServer, TransportError, decode_form, read_request, should_keep_alive,
};

/// Commonly used imports for handler code.
pub mod prelude {
    pub use wharf_core::{Request, RequestContext, Response, StatusCode};
    pub use wharf_http::{ServerConfig, TcpServer};
}
