//! Core types for the wharf HTTP framework.
//!
//! This crate provides the fundamental building blocks:
//! - [`Request`] and [`Response`] types
//! - [`Headers`] and [`Params`] insertion-ordered multimaps
//! - [`RequestContext`] wrapping asupersync's `Cx`
//! - Structured logging with request correlation
//!
//! # Design Principles
//!
//! - One request object per in-flight request, mutable during parse,
//!   immutable in intent once dispatched
//! - Header names stored verbatim; lookups are case-insensitive
//! - Cancel-correct via asupersync integration

#![forbid(unsafe_code)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::format_push_string)]
#![allow(clippy::module_name_repetitions)]

mod context;
pub mod logging;
mod request;
mod response;

pub use context::{CancelledError, RequestContext};
pub use logging::{LogConfig, LogEntry, LogLevel, RequestLogger};
pub use request::{
    CONTENT_TYPE_URLENCODED, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, Headers, HttpVersion,
    Params, Request,
};
pub use response::{Response, StatusCode};

// Re-export key asupersync types for convenience
pub use asupersync::{Budget, Cx, RegionId, TaskId};
