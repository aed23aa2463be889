//! Captured handler output.
//!
//! Every handler invocation receives a fresh [`OutputBuffer`] through its
//! context. Whatever the handler writes there becomes the response body when
//! the handler does not return an explicit value.

use std::fmt;
use std::io;

/// Write sink scoped to a single handler invocation.
///
/// Implements both [`fmt::Write`] and [`io::Write`], so handlers can use
/// `write!` regardless of which trait they have in scope.
#[derive(Debug, Default, Clone)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a string slice.
    pub fn push_str(&mut self, s: &str) {
        self.buf.extend_from_slice(s.as_bytes());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Close the capture scope and return what was written.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    #[must_use]
    pub fn into_string(self) -> String {
        match String::from_utf8(self.buf) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl io::Write for OutputBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
