//! Request context with asupersync integration.
//!
//! [`RequestContext`] wraps asupersync's [`Cx`] to give request
//! handlers and the parse driver a request-scoped identity plus
//! cancellation and budget awareness.

use asupersync::{Budget, Cx, RegionId, TaskId};

/// Request context that wraps asupersync's capability context.
///
/// Each in-flight request gets its own context carrying a unique
/// request id (for log correlation) and the capability context of the
/// task driving the connection.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The underlying capability context.
    cx: Cx,
    /// Unique request identifier for tracing.
    request_id: u64,
}

impl RequestContext {
    /// Creates a new request context from an asupersync Cx.
    ///
    /// Typically called by the server once the parse driver has a
    /// request to dispatch.
    #[must_use]
    pub fn new(cx: Cx, request_id: u64) -> Self {
        Self { cx, request_id }
    }

    /// Returns the unique request identifier.
    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Returns the underlying region ID from asupersync.
    #[must_use]
    pub fn region_id(&self) -> RegionId {
        self.cx.region_id()
    }

    /// Returns the current task ID.
    #[must_use]
    pub fn task_id(&self) -> TaskId {
        self.cx.task_id()
    }

    /// Returns the current budget.
    #[must_use]
    pub fn budget(&self) -> Budget {
        self.cx.budget()
    }

    /// Checks if cancellation has been requested.
    ///
    /// This includes client disconnection, timeout, or explicit
    /// cancellation from the server shutting down.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cx.is_cancel_requested()
    }

    /// Cooperative cancellation checkpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request has been cancelled and
    /// cancellation is not currently masked.
    pub fn checkpoint(&self) -> Result<(), CancelledError> {
        self.cx.checkpoint().map_err(|_| CancelledError)
    }

    /// Records a trace event for this request.
    pub fn trace(&self, message: &str) {
        self.cx.trace(message);
    }

    /// Returns a reference to the underlying asupersync Cx.
    #[must_use]
    pub fn cx(&self) -> &Cx {
        &self.cx
    }
}

/// Error returned when a request has been cancelled.
///
/// Returned by `checkpoint()` when the request should stop processing.
#[derive(Debug, Clone, Copy)]
pub struct CancelledError;

impl std::fmt::Display for CancelledError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "request cancelled")
    }
}

impl std::error::Error for CancelledError {}
