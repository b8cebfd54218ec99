//! TCP server with asupersync integration.
//!
//! The server owns the accept loop and the per-connection request
//! loop: read a request via the parse driver, hand it (valid or not)
//! to the handler exactly once, write the handler's response, and
//! either keep the connection for the next request or close it.
//!
//! # Example
//!
//! ```ignore
//! use wharf_http::{ServerConfig, TcpServer};
//! use wharf_core::{Request, RequestContext, Response};
//!
//! async fn handler(_ctx: RequestContext, req: Request) -> Response {
//!     if !req.is_valid() {
//!         return Response::bad_request();
//!     }
//!     Response::ok().body("Hello, World!")
//! }
//!
//! let server = TcpServer::new(ServerConfig::new("127.0.0.1:8080"));
//! // server.serve(&cx, handler).await?;
//! ```

use crate::connection::should_keep_alive;
use crate::driver::{DEFAULT_READ_BUFFER_SIZE, ReadOutcome, TransportError, read_request};
use crate::parser::ParseLimits;
use crate::response::ResponseWriter;
use asupersync::Cx;
use asupersync::io::AsyncWrite;
use asupersync::net::{TcpListener, TcpStream};
use std::future::{Future, poll_fn};
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use wharf_core::{LogConfig, Request, RequestContext, RequestLogger, Response};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Header-phase read buffer size.
    pub read_buffer_size: usize,
    /// HTTP parse limits.
    pub parse_limits: ParseLimits,
    /// Enable TCP_NODELAY.
    pub tcp_nodelay: bool,
    /// Logging configuration for request logs.
    pub log_config: LogConfig,
}

impl ServerConfig {
    /// Creates a new server configuration with the given bind address.
    #[must_use]
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            parse_limits: ParseLimits::default(),
            tcp_nodelay: true,
            log_config: LogConfig::default(),
        }
    }

    /// Sets the read buffer size.
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Sets the HTTP parse limits.
    #[must_use]
    pub fn with_parse_limits(mut self, limits: ParseLimits) -> Self {
        self.parse_limits = limits;
        self
    }

    /// Enables or disables TCP_NODELAY.
    #[must_use]
    pub fn with_tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1:8080")
    }
}

/// TCP server.
///
/// Each accepted connection is handled by a cooperative task that
/// alternates between reading request bytes and dispatching completed
/// requests; there is no shared mutable state between requests beyond
/// the request-id counter.
#[derive(Debug)]
pub struct TcpServer {
    config: ServerConfig,
    request_counter: AtomicU64,
    shutdown: AtomicBool,
}

impl TcpServer {
    /// Creates a new TCP server with the given configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            request_counter: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Requests the accept loop to stop.
    ///
    /// The loop observes the flag before its next accept; a pending
    /// accept is woken by the next inbound connection.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Generates a unique request ID.
    fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Runs the server, accepting connections and handling requests.
    ///
    /// Runs until the server `Cx` is cancelled or an unrecoverable
    /// error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or a fatal accept error
    /// occurs.
    pub async fn serve<H, Fut>(&self, cx: &Cx, handler: H) -> io::Result<()>
    where
        H: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr.clone()).await?;
        let local_addr = listener.local_addr()?;
        cx.trace(&format!("server listening on {local_addr}"));

        self.accept_loop(cx, listener, handler).await
    }

    /// Runs the server on an already-bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error on a fatal accept error.
    pub async fn serve_on<H, Fut>(
        &self,
        cx: &Cx,
        listener: TcpListener,
        handler: H,
    ) -> io::Result<()>
    where
        H: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.accept_loop(cx, listener, handler).await
    }

    async fn accept_loop<H, Fut>(
        &self,
        cx: &Cx,
        listener: TcpListener,
        handler: H,
    ) -> io::Result<()>
    where
        H: Fn(RequestContext, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        loop {
            if self.is_shutdown() || cx.is_cancel_requested() {
                cx.trace("server shutdown requested");
                return Ok(());
            }

            let (stream, peer_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                Err(e) => {
                    cx.trace(&format!("accept error: {e}"));
                    if is_fatal_accept_error(&e) {
                        return Err(e);
                    }
                    continue;
                }
            };

            if self.config.tcp_nodelay {
                let _ = stream.set_nodelay(true);
            }

            cx.trace(&format!("accepted connection from {peer_addr}"));

            // Connections are handled inline on the accept task.
            // TODO: spawn each connection into its own region once the
            // runtime exposes region-scoped spawn.
            if let Err(e) = self
                .handle_connection(cx, stream, peer_addr, &handler)
                .await
            {
                cx.trace(&format!("connection error from {peer_addr}: {e}"));
            }
        }
    }

    /// Handles a single connection.
    ///
    /// Reads requests, dispatches each to the handler exactly once,
    /// and writes responses. Kept-alive connections loop, carrying any
    /// bytes already read past one request into the next.
    async fn handle_connection<H, Fut>(
        &self,
        cx: &Cx,
        mut stream: TcpStream,
        _peer_addr: SocketAddr,
        handler: &H,
    ) -> io::Result<()>
    where
        H: Fn(RequestContext, Request) -> Fut + Send + Sync,
        Fut: Future<Output = Response> + Send,
    {
        let mut writer = ResponseWriter::new();
        let mut leftover = Vec::new();

        loop {
            let request_id = self.next_request_id();
            let ctx = RequestContext::new(cx.clone(), request_id);
            let logger = RequestLogger::new(&ctx, self.config.log_config.clone());

            let outcome = read_request(
                &ctx,
                &logger,
                &mut stream,
                &self.config.parse_limits,
                self.config.read_buffer_size,
                std::mem::take(&mut leftover),
            )
            .await;

            match outcome {
                Ok(ReadOutcome::Complete { request, leftover: rest }) => {
                    let keep_alive = request.is_valid() && should_keep_alive(&request);

                    let response = handler(ctx.clone(), request).await;
                    writer.write(&response);
                    write_all(&mut stream, writer.as_bytes()).await?;
                    flush(&mut stream).await?;

                    if !keep_alive {
                        return Ok(());
                    }
                    leftover = rest;
                }
                Ok(ReadOutcome::Closed) => return Ok(()),
                Err(err) => {
                    // Transport failure: close without dispatching.
                    if err.is_aborted() {
                        logger.info("request parsing aborted (shutting down)");
                    } else {
                        logger.info(format!("request parsing aborted: {err}"));
                    }
                    if let TransportError::Io(e) = err {
                        return Err(e);
                    }
                    return Ok(());
                }
            }
        }
    }
}

impl Default for TcpServer {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// Returns true if the accept error means the listener itself is broken.
fn is_fatal_accept_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotConnected | io::ErrorKind::InvalidInput
    )
}

/// Writes all bytes to a stream.
async fn write_all(stream: &mut TcpStream, mut buf: &[u8]) -> io::Result<()> {
    while !buf.is_empty() {
        let n = poll_fn(|cx| Pin::new(&mut *stream).poll_write(cx, buf)).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ));
        }
        buf = &buf[n..];
    }
    Ok(())
}

/// Flushes a stream.
async fn flush(stream: &mut TcpStream) -> io::Result<()> {
    poll_fn(|cx| Pin::new(&mut *stream).poll_flush(cx)).await
}
