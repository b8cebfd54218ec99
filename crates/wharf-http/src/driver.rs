//! The per-request parse driver.
//!
//! [`read_request`] owns one request from first byte to completion:
//! it issues best-effort reads into a fixed header buffer, feeds the
//! bytes to the incremental parser, and on header completion sizes
//! and fills the body buffer — reusing any tail of the last header
//! read that already belongs to the body. Query-string and
//! form-encoded-body parameters are decoded once the full message has
//! arrived.
//!
//! Malformed input does not produce an `Err`: the request comes back
//! marked invalid and the caller dispatches it to the handler, which
//! is expected to answer with a 4xx. Only transport failures are
//! errors, and those never reach the handler.

use crate::form::decode_form;
use crate::parser::{FeedStatus, ParseError, ParseLimits, RequestParser};
use asupersync::io::{AsyncRead, ReadBuf};
use std::future::poll_fn;
use std::io;
use std::pin::Pin;
use std::task::Poll;
use wharf_core::{
    CONTENT_TYPE_URLENCODED, HEADER_CONTENT_LENGTH, HEADER_CONTENT_TYPE, Headers, Request,
    RequestContext, RequestLogger,
};

/// Size of the fixed header-phase read buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Transport failure while reading a request.
///
/// None of these reach the request handler; the connection is closed
/// instead. Cancellation is distinguished from other failures for
/// logging only.
#[derive(Debug)]
pub enum TransportError {
    /// The read was aborted; the server is shutting down.
    Aborted,
    /// The peer closed or reset the connection mid-request.
    Disconnected,
    /// Any other I/O failure.
    Io(io::Error),
}

impl TransportError {
    fn from_io(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::ConnectionAborted => Self::Aborted,
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::BrokenPipe => Self::Disconnected,
            _ => Self::Io(error),
        }
    }

    /// True if the read was aborted by cancellation rather than a
    /// transport fault.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aborted => write!(f, "read aborted"),
            Self::Disconnected => write!(f, "peer disconnected mid-request"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of reading one request from the transport.
#[derive(Debug)]
pub enum ReadOutcome {
    /// A complete request, valid or not, plus any bytes already read
    /// past the end of its body. The leftover belongs to the next
    /// request on a kept-alive connection.
    Complete {
        /// The parsed request; check `is_valid()`.
        request: Request,
        /// Bytes read past the end of this request.
        leftover: Vec<u8>,
    },
    /// The peer closed the connection before sending any byte of a
    /// new request.
    Closed,
}

/// Read one request from `stream`.
///
/// `leftover` carries bytes already read past the previous request on
/// this connection; they are consumed before any new read is issued.
///
/// # Errors
///
/// Returns a [`TransportError`] only for transport failures (aborted
/// read, disconnection mid-request, I/O error). Malformed input is
/// reported through the returned request's validity flag instead.
pub async fn read_request<S>(
    ctx: &RequestContext,
    logger: &RequestLogger<'_>,
    stream: &mut S,
    limits: &ParseLimits,
    read_buffer_size: usize,
    leftover: Vec<u8>,
) -> Result<ReadOutcome, TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut parser = RequestParser::with_limits(limits.clone());
    let mut buffer = vec![0u8; read_buffer_size];
    let mut chunk = leftover;
    let mut started = !chunk.is_empty();

    // Header phase: read, feed, repeat until the blank line.
    let (tail, parse_failed) = loop {
        if chunk.is_empty() {
            if ctx.is_cancelled() {
                return Err(TransportError::Aborted);
            }
            let bytes_read = read_some(stream, &mut buffer)
                .await
                .map_err(TransportError::from_io)?;
            if bytes_read == 0 {
                if started {
                    return Err(TransportError::Disconnected);
                }
                return Ok(ReadOutcome::Closed);
            }
            logger.debug(format!("read {bytes_read} bytes from request"));
            chunk.extend_from_slice(&buffer[..bytes_read]);
            started = true;
        }

        match parser.feed(&chunk) {
            Ok(FeedStatus::Done { consumed }) => {
                logger.debug(format!("parsed {consumed} header bytes"));
                break (chunk.split_off(consumed), false);
            }
            Ok(FeedStatus::NeedMore) => chunk.clear(),
            Err(err) => {
                logger.debug(format!("request parsing failed: {err}"));
                break (Vec::new(), true);
            }
        }
    };

    let mut request = parser.into_request();
    if parse_failed {
        return Ok(ReadOutcome::Complete {
            request,
            leftover: Vec::new(),
        });
    }

    // Body phase.
    let content_length = match derive_content_length(request.headers(), limits.content_max) {
        Ok(length) => length,
        Err(err) => {
            logger.debug(format!("request parsing failed: {err}"));
            return Ok(ReadOutcome::Complete {
                request,
                leftover: Vec::new(),
            });
        }
    };
    request.set_content_length(content_length);

    let mut leftover = tail;
    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        let copied = leftover.len().min(content_length);
        body[..copied].copy_from_slice(&leftover[..copied]);
        leftover.drain(..copied);

        if copied < content_length {
            if copied > 0 {
                logger.debug(format!(
                    "parsed {copied} request content bytes from last read operation (partial)"
                ));
            }
            read_exact(stream, &mut body[copied..]).await?;
        } else {
            logger.debug(format!(
                "parsed {content_length} request content bytes from last read operation (finished)"
            ));
        }
        request.set_body(body);
    }

    request.set_valid(true);
    decode_params(logger, &mut request);
    Ok(ReadOutcome::Complete { request, leftover })
}

/// Derive the body length from the `Content-Length` header(s).
///
/// Absent or unparseable values mean 0. Multiple headers must agree,
/// and a length beyond the body cap is rejected before any
/// allocation.
fn derive_content_length(headers: &Headers, content_max: usize) -> Result<usize, ParseError> {
    let mut values = headers.get_all(HEADER_CONTENT_LENGTH);
    let Some(first) = values.next() else {
        return Ok(0);
    };
    for other in values {
        if other != first {
            return Err(ParseError::ConflictingContentLength);
        }
    }

    let Ok(text) = std::str::from_utf8(first) else {
        return Ok(0);
    };
    match text.trim().parse::<u128>() {
        Ok(length) if length > content_max as u128 => Err(ParseError::ContentTooLarge),
        Ok(length) => Ok(length as usize),
        Err(_) => Ok(0),
    }
}

/// Decode query-string and form-body parameters into the request.
///
/// Decoding failures are logged and leave the request valid; any
/// pairs decoded before the failure are kept.
fn decode_params(logger: &RequestLogger<'_>, request: &mut Request) {
    if !request.query_string().is_empty() {
        let query = request.query_string().as_bytes().to_vec();
        if decode_form(request.query_params_mut(), &query).is_err() {
            logger.warn("request query string decoding failed (URI)");
        }
    }

    if request.headers().get(HEADER_CONTENT_TYPE) == Some(CONTENT_TYPE_URLENCODED.as_bytes()) {
        let body = request.take_body();
        if decode_form(request.query_params_mut(), &body).is_err() {
            logger.warn("request form decoding failed (POST content)");
        }
        request.set_body(body);
    }
}

/// Deliver 0..buf.len() bytes from the stream; 0 means end of stream.
async fn read_some<S>(stream: &mut S, buffer: &mut [u8]) -> io::Result<usize>
where
    S: AsyncRead + Unpin,
{
    poll_fn(|cx| {
        let mut read_buf = ReadBuf::new(buffer);
        match Pin::new(&mut *stream).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => Poll::Ready(Ok(read_buf.filled().len())),
            Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
            Poll::Pending => Poll::Pending,
        }
    })
    .await
}

/// Fill `buffer` completely; used for the remainder of the body.
async fn read_exact<S>(stream: &mut S, buffer: &mut [u8]) -> Result<(), TransportError>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buffer.len() {
        let n = read_some(stream, &mut buffer[filled..])
            .await
            .map_err(TransportError::from_io)?;
        if n == 0 {
            return Err(TransportError::Disconnected);
        }
        filled += n;
    }
    Ok(())
}
