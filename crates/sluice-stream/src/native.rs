//! Raw native streams handed over by providers.
//!
//! A native stream is either owned, released when its handle closes, or
//! shared, for process-wide streams that must outlive any single handle.

use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};

enum Source {
    Owned(Box<dyn Read + Send>),
    Shared(Box<dyn BufRead + Send>),
}

pub struct NativeInput {
    source: Source,
}

impl NativeInput {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            source: Source::Owned(Box::new(reader)),
        }
    }

    /// A stream the handle must never release, such as stdin.
    ///
    /// Several handles may read it one after another, so no handle buffers
    /// ahead of the element it is decoding.
    pub fn shared(reader: impl Read + Send + 'static) -> Self {
        Self {
            source: Source::Shared(Box::new(ByteReader::new(reader))),
        }
    }

    pub fn is_shared(&self) -> bool { matches!(self.source, Source::Shared(_)) }

    /// Owned streams get a private buffer of `capacity` bytes.
    pub(crate) fn into_reader(self, capacity: usize) -> (Box<dyn BufRead + Send>, bool) {
        match self.source {
            Source::Owned(inner) => (Box::new(BufReader::with_capacity(capacity, inner)), false),
            Source::Shared(inner) => (inner, true),
        }
    }
}

impl fmt::Debug for NativeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeInput").field("shared", &self.is_shared()).finish_non_exhaustive()
    }
}

/// `BufRead` that holds at most one unconsumed byte.
struct ByteReader<R> {
    inner:  R,
    byte:   [u8; 1],
    filled: bool,
}

impl<R> ByteReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            byte: [0],
            filled: false,
        }
    }
}

impl<R: Read> Read for ByteReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let Some(&byte) = self.fill_buf()?.first() else {
            return Ok(0);
        };
        buf[0] = byte;
        self.consume(1);
        Ok(1)
    }
}

impl<R: Read> BufRead for ByteReader<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if !self.filled {
            self.filled = self.inner.read(&mut self.byte)? == 1;
        }
        if self.filled { Ok(&self.byte[..]) } else { Ok(&[]) }
    }

    fn consume(&mut self, amt: usize) {
        if amt > 0 {
            self.filled = false;
        }
    }
}

pub struct NativeOutput {
    inner:  Box<dyn Write + Send>,
    shared: bool,
}

impl NativeOutput {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner:  Box::new(writer),
            shared: false,
        }
    }

    /// A stream the handle must never release, such as stdout.
    pub fn shared(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner:  Box::new(writer),
            shared: true,
        }
    }

    pub fn is_shared(&self) -> bool { self.shared }

    pub(crate) fn into_parts(self) -> (Box<dyn Write + Send>, bool) { (self.inner, self.shared) }
}

impl fmt::Debug for NativeOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeOutput").field("shared", &self.shared).finish_non_exhaustive()
    }
}
