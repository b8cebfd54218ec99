//! Structured logging for wharf.
//!
//! Log entries carry the request id from [`RequestContext`] so that a
//! request can be followed across the parse driver, the server loop,
//! and handlers. Output is JSON for production or a compact one-line
//! format for development.
//!
//! # Usage
//!
//! ```ignore
//! use wharf_core::logging::{LogConfig, RequestLogger};
//!
//! let logger = RequestLogger::new(&ctx, LogConfig::development());
//! logger.debug(format!("read {bytes_read} bytes from request"));
//! logger.warn("query string decoding failed");
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::context::RequestContext;

/// Log levels, most verbose first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Most verbose, for detailed debugging.
    Trace = 0,
    /// Debug information, not shown in production.
    Debug = 1,
    /// General information about normal operation.
    Info = 2,
    /// Something unexpected but recoverable.
    Warn = 3,
    /// An error that affected request processing.
    Error = 4,
}

impl LogLevel {
    /// Returns the level as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Returns a single character representation.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured log entry with request context.
#[derive(Debug)]
pub struct LogEntry {
    /// The log level.
    pub level: LogLevel,
    /// The log message.
    pub message: String,
    /// Unique request identifier.
    pub request_id: u64,
    /// Module/target path (optional).
    pub target: Option<String>,
    /// Structured key-value fields (max 16).
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry with context from [`RequestContext`].
    #[must_use]
    pub fn new(ctx: &RequestContext, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            request_id: ctx.request_id(),
            target: None,
            fields: Vec::new(),
        }
    }

    /// Sets the target module path.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Adds a structured field.
    ///
    /// Fields beyond the max (16) are silently dropped.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        if self.fields.len() < 16 {
            self.fields.push((key.into(), value.to_string()));
        }
        self
    }

    /// Formats the log entry as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut json = format!(
            r#"{{"level":"{}","message":"{}","request_id":{}"#,
            self.level,
            escape_json(&self.message),
            self.request_id,
        );

        if let Some(ref target) = self.target {
            json.push_str(&format!(r#","target":"{}""#, escape_json(target)));
        }

        if !self.fields.is_empty() {
            json.push_str(r#","fields":{"#);
            for (i, (k, v)) in self.fields.iter().enumerate() {
                if i > 0 {
                    json.push(',');
                }
                json.push_str(&format!(r#""{}":"{}""#, escape_json(k), escape_json(v)));
            }
            json.push('}');
        }

        json.push('}');
        json
    }

    /// Formats the log entry in compact format.
    #[must_use]
    pub fn to_compact(&self) -> String {
        let mut output = format!(
            "[{}] req={} {}",
            self.level.as_char(),
            self.request_id,
            self.message
        );

        if !self.fields.is_empty() {
            output.push_str(" {");
            for (i, (k, v)) in self.fields.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                output.push_str(&format!("{k}={v}"));
            }
            output.push('}');
        }

        output
    }
}

/// Escapes a string for JSON output.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to emit.
    pub min_level: LogLevel,
    /// Whether to output JSON (true) or compact format (false).
    pub json_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            json_output: true,
        }
    }
}

impl LogConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum log level.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Sets whether to output JSON format.
    #[must_use]
    pub fn json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }

    /// Returns a development configuration (verbose, compact output).
    #[must_use]
    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            json_output: false,
        }
    }

    /// Returns a production configuration (info+, JSON output).
    #[must_use]
    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            json_output: true,
        }
    }
}

/// Global log level for fast level checks.
static GLOBAL_LOG_LEVEL: AtomicUsize = AtomicUsize::new(LogLevel::Info as usize);

/// Returns the current global log level.
#[inline]
#[must_use]
pub fn global_log_level() -> LogLevel {
    match GLOBAL_LOG_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Trace,
        1 => LogLevel::Debug,
        2 => LogLevel::Info,
        3 => LogLevel::Warn,
        _ => LogLevel::Error,
    }
}

/// Sets the global log level, affecting all future log calls.
pub fn set_global_log_level(level: LogLevel) {
    GLOBAL_LOG_LEVEL.store(level as usize, Ordering::Relaxed);
}

/// Returns true if the given level is enabled globally.
#[inline]
#[must_use]
pub fn level_enabled(level: LogLevel) -> bool {
    level >= global_log_level()
}

/// A per-request logger that captures context and emits entries.
pub struct RequestLogger<'a> {
    ctx: &'a RequestContext,
    config: LogConfig,
}

impl<'a> RequestLogger<'a> {
    /// Creates a new request logger.
    #[must_use]
    pub fn new(ctx: &'a RequestContext, config: LogConfig) -> Self {
        Self { ctx, config }
    }

    /// Returns true if the given log level is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.config.min_level && level_enabled(level)
    }

    /// Emits a log entry if its level is enabled.
    pub fn emit(&self, entry: LogEntry) {
        if !self.is_enabled(entry.level) {
            return;
        }

        let output = if self.config.json_output {
            entry.to_json()
        } else {
            entry.to_compact()
        };

        // Also mirrored into the asupersync trace stream so entries show
        // up alongside runtime diagnostics.
        self.ctx.trace(&entry.message);
        eprintln!("{output}");
    }

    /// Logs a message at DEBUG level.
    pub fn debug(&self, message: impl Into<String>) {
        if self.is_enabled(LogLevel::Debug) {
            self.emit(LogEntry::new(self.ctx, LogLevel::Debug, message));
        }
    }

    /// Logs a message at INFO level.
    pub fn info(&self, message: impl Into<String>) {
        if self.is_enabled(LogLevel::Info) {
            self.emit(LogEntry::new(self.ctx, LogLevel::Info, message));
        }
    }

    /// Logs a message at WARN level.
    pub fn warn(&self, message: impl Into<String>) {
        if self.is_enabled(LogLevel::Warn) {
            self.emit(LogEntry::new(self.ctx, LogLevel::Warn, message));
        }
    }

    /// Logs a message at ERROR level.
    pub fn error(&self, message: impl Into<String>) {
        if self.is_enabled(LogLevel::Error) {
            self.emit(LogEntry::new(self.ctx, LogLevel::Error, message));
        }
    }

    /// Logs with a custom field builder at DEBUG level.
    pub fn debug_with_fields<F>(&self, message: impl Into<String>, f: F)
    where
        F: FnOnce(LogEntry) -> LogEntry,
    {
        if self.is_enabled(LogLevel::Debug) {
            self.emit(f(LogEntry::new(self.ctx, LogLevel::Debug, message)));
        }
    }

    /// Logs with a custom field builder at WARN level.
    pub fn warn_with_fields<F>(&self, message: impl Into<String>, f: F)
    where
        F: FnOnce(LogEntry) -> LogEntry,
    {
        if self.is_enabled(LogLevel::Warn) {
            self.emit(f(LogEntry::new(self.ctx, LogLevel::Warn, message)));
        }
    }
}

/// Builds a DEBUG-level [`LogEntry`] with request context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $msg:expr) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Debug, $msg)
            .target(module_path!())
    };
    ($ctx:expr, $msg:expr, $($key:ident => $value:expr),+ $(,)?) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Debug, $msg)
            .target(module_path!())
            $(.field(stringify!($key), $value))+
    };
    ($ctx:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Debug, format!($fmt, $($arg)*))
            .target(module_path!())
    };
}

/// Builds an INFO-level [`LogEntry`] with request context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $msg:expr) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Info, $msg)
            .target(module_path!())
    };
    ($ctx:expr, $msg:expr, $($key:ident => $value:expr),+ $(,)?) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Info, $msg)
            .target(module_path!())
            $(.field(stringify!($key), $value))+
    };
    ($ctx:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Info, format!($fmt, $($arg)*))
            .target(module_path!())
    };
}

/// Builds a WARN-level [`LogEntry`] with request context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $msg:expr) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Warn, $msg)
            .target(module_path!())
    };
    ($ctx:expr, $msg:expr, $($key:ident => $value:expr),+ $(,)?) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Warn, $msg)
            .target(module_path!())
            $(.field(stringify!($key), $value))+
    };
    ($ctx:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Warn, format!($fmt, $($arg)*))
            .target(module_path!())
    };
}

/// Builds an ERROR-level [`LogEntry`] with request context.
#[macro_export]
macro_rules! log_error {
    ($ctx:expr, $msg:expr) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Error, $msg)
            .target(module_path!())
    };
    ($ctx:expr, $msg:expr, $($key:ident => $value:expr),+ $(,)?) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Error, $msg)
            .target(module_path!())
            $(.field(stringify!($key), $value))+
    };
    ($ctx:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::logging::LogEntry::new($ctx, $crate::logging::LogLevel::Error, format!($fmt, $($arg)*))
            .target(module_path!())
    };
}
