//! The byte-level link the driver talks through.
//!
//! Opening, configuring and closing the serial port belong to the host; the
//! driver only needs to know how many bytes are buffered, read them one at a
//! time, and write command text.

use std::collections::VecDeque;
use std::io;

/// A non-blocking, in-order, lossless byte link.
pub trait Transport {
    /// Bytes that can be read right now without blocking.
    fn bytes_available(&self) -> usize;

    /// Read one buffered byte; `None` if nothing is buffered.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write `text` to the device.
    fn write_str(&mut self, text: &str) -> io::Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn bytes_available(&self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        (**self).write_str(text)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn bytes_available(&self) -> usize {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        (**self).write_str(text)
    }
}

/// In-memory transport: bytes are injected by hand, writes are recorded.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    inbound: VecDeque<u8>,
    written: Vec<String>,
    fail_writes: bool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the device had sent them.
    pub fn inject(&mut self, bytes: impl AsRef<[u8]>) {
        self.inbound.extend(bytes.as_ref());
    }

    /// Every `write_str` call so far, in order.
    pub fn written(&self) -> &[String] {
        &self.written
    }

    pub fn take_written(&mut self) -> Vec<String> {
        std::mem::take(&mut self.written)
    }

    /// Make subsequent writes fail with `BrokenPipe`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl Transport for MemoryTransport {
    fn bytes_available(&self) -> usize {
        self.inbound.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write_str(&mut self, text: &str) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "transport closed"));
        }
        self.written.push(text.to_owned());
        Ok(())
    }
}
