//! HTTP response writer.

use wharf_core::Response;

/// Writes HTTP responses to a buffer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
}

impl ResponseWriter {
    /// Create a new response writer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    /// Write a response to the internal buffer.
    pub fn write(&mut self, response: &Response) {
        self.buffer.clear();

        // Status line
        self.buffer.extend_from_slice(b"HTTP/1.1 ");
        let status = response.status();
        self.buffer
            .extend_from_slice(status.as_u16().to_string().as_bytes());
        self.buffer.push(b' ');
        self.buffer
            .extend_from_slice(status.canonical_reason().as_bytes());
        self.buffer.extend_from_slice(b"\r\n");

        // Headers
        for (name, value) in response.headers().iter() {
            self.buffer.extend_from_slice(name.as_bytes());
            self.buffer.extend_from_slice(b": ");
            self.buffer.extend_from_slice(value);
            self.buffer.extend_from_slice(b"\r\n");
        }

        // Content-Length and end of headers
        self.buffer.extend_from_slice(b"Content-Length: ");
        self.buffer
            .extend_from_slice(response.body_ref().len().to_string().as_bytes());
        self.buffer.extend_from_slice(b"\r\n\r\n");

        // Body
        self.buffer.extend_from_slice(response.body_ref());
    }

    /// Get the written bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
