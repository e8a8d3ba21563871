//! Byte-counting stream adapter.

use std::io::{self, Read, Write};

/// Wraps a sink or source and counts the bytes that actually cross it.
pub(crate) struct Counter<S> {
    inner: S,
    count: usize,
}

impl<S> Counter<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self { inner, count: 0 }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }
}

impl<S: Write> Write for Counter<S> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.count += n;
        Ok(n)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: Read> Read for Counter<S> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n;
        Ok(n)
    }
}
