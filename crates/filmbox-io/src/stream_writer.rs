//! Little-endian primitive writer over a seekable byte sink.
//!
//! Every multi-byte value goes out little-endian regardless of host byte
//! order. `seek` accepts absolute positions anywhere in the already-written
//! prefix; node records rely on this to overwrite their offset placeholders
//! after the body has been serialized.

use std::io::{self, Seek, SeekFrom, Write};

/// Little-endian stream writer.
#[derive(Debug)]
pub struct StreamWriterLE<W: Write + Seek> {
    inner: W,
}

impl<W: Write + Seek> StreamWriterLE<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Consume the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn put_u1(&mut self, v: u8) -> io::Result<()> {
        self.inner.write_all(&[v])
    }

    pub fn put_u2(&mut self, v: u16) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_u4(&mut self, v: u32) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_i2(&mut self, v: i16) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_i4(&mut self, v: i32) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_i8(&mut self, v: i64) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_f4(&mut self, v: f32) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_f8(&mut self, v: f64) -> io::Result<()> {
        self.inner.write_all(&v.to_le_bytes())
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)
    }

    /// Write a string as raw bytes, no NUL terminator and no length prefix.
    pub fn put_string(&mut self, s: &str) -> io::Result<()> {
        self.inner.write_all(s.as_bytes())
    }

    /// Current absolute position in the stream.
    pub fn tell(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    /// Seek to an absolute position.
    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
