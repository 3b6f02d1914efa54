//! Line framing over the device → host byte stream.
//!
//! Bytes are accumulated until a line-feed arrives; the accumulated line is
//! then emitted with one trailing carriage return removed, so both `\n` and
//! `\r\n` terminated firmware output frame identically. Framing depends only
//! on the byte sequence, never on how it was chunked across calls.

use bytes::{BufMut, BytesMut};
use tracing::warn;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Default upper bound for a single unterminated line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Accumulates raw bytes and yields complete text lines.
///
/// Each framer owns its own buffer, so independent links never share
/// partial-line state.
#[derive(Debug)]
pub struct LineFramer {
    /// Pending bytes of the current line. Never contains `\n`.
    buffer: BytesMut,
    /// Lines longer than this are dropped.
    max_line_length: usize,
    /// Set after an overflow until the next `\n` resynchronises us.
    discarding: bool,
    /// Lines dropped by the length guard since construction.
    dropped: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_line_length(DEFAULT_MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64),
            max_line_length: max_line_length.max(1),
            discarding: false,
            dropped: 0,
        }
    }

    /// Feed a chunk of bytes, lazily yielding every line it completes.
    ///
    /// Bytes not consumed because the iterator was dropped early are lost,
    /// so callers normally exhaust it.
    pub fn feed<'a>(&'a mut self, bytes: &'a [u8]) -> Lines<'a> {
        Lines {
            framer: self,
            input: bytes.iter(),
        }
    }

    /// Push one byte; returns a line when `byte` terminates one.
    pub fn push(&mut self, byte: u8) -> Option<String> {
        if byte == LF {
            if self.discarding {
                self.discarding = false;
                self.buffer.clear();
                return None;
            }
            return Some(self.take_line());
        }

        if self.discarding {
            return None;
        }
        // A terminating CR is not part of the payload and may sit past the limit.
        let limit = if byte == CR {
            self.max_line_length + 1
        } else {
            self.max_line_length
        };
        if self.buffer.len() >= limit {
            warn!(
                limit = self.max_line_length,
                "device line exceeds limit; discarding until next newline"
            );
            self.buffer.clear();
            self.discarding = true;
            self.dropped += 1;
            return None;
        }
        self.buffer.put_u8(byte);
        None
    }

    /// Bytes of the current unterminated line.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of overlong lines discarded so far. Not cleared by `reset`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Drop any partial line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    fn take_line(&mut self) -> String {
        let mut line = self.buffer.split();
        if line.last() == Some(&CR) {
            line.truncate(line.len() - 1);
        }
        String::from_utf8_lossy(&line).into_owned()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator returned by [`LineFramer::feed`].
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
    input: std::slice::Iter<'a, u8>,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for &byte in self.input.by_ref() {
            if let Some(line) = self.framer.push(byte) {
                return Some(line);
            }
        }
        None
    }
}
