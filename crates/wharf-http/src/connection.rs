//! HTTP `Connection` header handling.
//!
//! Decides whether a connection is kept alive after a request:
//! HTTP/1.1 defaults to keep-alive unless `close` is present, earlier
//! versions default to close unless `keep-alive` is present, and an
//! explicit `close` always wins.

use wharf_core::{HttpVersion, Request};

/// Parsed `Connection` header information.
///
/// The header value is a comma-separated list of case-insensitive
/// tokens; only the lifetime directives are of interest here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionInfo {
    /// Whether the `close` token was present.
    pub close: bool,
    /// Whether the `keep-alive` token was present.
    pub keep_alive: bool,
}

impl ConnectionInfo {
    /// Creates an empty ConnectionInfo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Connection` header value.
    ///
    /// Tokens are case-insensitive; whitespace around commas is
    /// ignored. Unrecognized tokens (hop-by-hop header names) are
    /// skipped.
    #[must_use]
    pub fn parse(value: &[u8]) -> Self {
        let mut info = Self::new();

        let Ok(value_str) = std::str::from_utf8(value) else {
            return info;
        };

        for token in value_str.split(',') {
            let token = token.trim();
            if token.eq_ignore_ascii_case("close") {
                info.close = true;
            } else if token.eq_ignore_ascii_case("keep-alive") {
                info.keep_alive = true;
            }
        }

        info
    }

    /// Returns whether the connection should stay open for the given
    /// HTTP version.
    #[must_use]
    pub fn should_keep_alive(self, version: HttpVersion) -> bool {
        if self.close {
            return false;
        }
        if self.keep_alive {
            return true;
        }
        version.is_http11()
    }
}

/// Determines whether the connection carrying `request` should be
/// kept open after the response.
#[must_use]
pub fn should_keep_alive(request: &Request) -> bool {
    let info = match request.headers().get("connection") {
        Some(value) => ConnectionInfo::parse(value),
        None => ConnectionInfo::new(),
    };
    info.should_keep_alive(request.version())
}
