//! Byte I/O seams for `,` and `.`.

use std::io::{self, Read, Write};

pub trait ByteSource {
    /// Next input byte, `Ok(None)` once the source is exhausted.
    fn next_byte(&mut self) -> io::Result<Option<u8>>;
}

pub trait ByteSink {
    fn put(&mut self, byte: u8) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).next_byte()
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn put(&mut self, byte: u8) -> io::Result<()> {
        (**self).put(byte)
    }
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

/// Source that is exhausted from the start.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl ByteSource for Empty {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

/// In-memory source over a byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let b = self.bytes.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }
}

/// Adapts any `Read`, one byte per call. Interrupted reads are retried.
pub struct ReadSource<R> {
    inner: R,
}

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Adapts any `Write`. Wrap the writer in a `BufWriter` for bulk output.
pub struct WriteSink<W> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for WriteSink<W> {
    fn put(&mut self, byte: u8) -> io::Result<()> {
        self.inner.write_all(&[byte])
    }
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_drains_then_exhausts() {
        let mut src = SliceSource::new(b"ab");
        assert_eq!(src.next_byte().unwrap(), Some(b'a'));
        assert_eq!(src.remaining(), b"b");
        assert_eq!(src.next_byte().unwrap(), Some(b'b'));
        assert_eq!(src.next_byte().unwrap(), None);
        assert_eq!(src.next_byte().unwrap(), None);
    }

    #[test]
    fn read_source_over_cursor() {
        let mut src = ReadSource::new(io::Cursor::new(vec![1u8, 2]));
        assert_eq!(src.next_byte().unwrap(), Some(1));
        assert_eq!(src.next_byte().unwrap(), Some(2));
        assert_eq!(src.next_byte().unwrap(), None);
    }

    #[test]
    fn write_sink_collects_bytes() {
        let mut sink = WriteSink::new(Vec::new());
        sink.put(b'o').unwrap();
        sink.put(b'k').unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.into_inner(), b"ok");
    }

    #[test]
    fn empty_is_always_exhausted() {
        assert_eq!(Empty.next_byte().unwrap(), None);
    }
}
