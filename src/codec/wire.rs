//! Byte-level primitives: fixed-width big-endian integers, bounded strings and statuses.
//!
//! Both ends track how many bytes they have moved so the stream layer can build and verify
//! the trailing index without requiring `Seek`.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, TraceError};
use crate::trace::constants::{MAX_PREALLOC, MAX_STRING_LEN, MAX_TABLE_LEN};
use crate::trace::Status;

const IGNORED: u8 = 0;
const PRESENT: u8 = 1;

/// An empty vector for `n` elements whose count came off the wire; growth past
/// [`MAX_PREALLOC`] happens only as elements are actually read.
pub fn prealloc<T>(n: usize) -> Vec<T> {
    Vec::with_capacity(n.min(MAX_PREALLOC))
}

pub struct WireWriter<W> {
    inner: W,
    pos: u64,
}

impl<W: Write> WireWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, pos: 0 }
    }

    /// Bytes written so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.pos += data.len() as u64;
        Ok(())
    }

    pub fn u8(&mut self, v: u8) -> Result<()> {
        self.inner.write_u8(v)?;
        self.pos += 1;
        Ok(())
    }

    pub fn u16(&mut self, v: u16) -> Result<()> {
        self.inner.write_u16::<BigEndian>(v)?;
        self.pos += 2;
        Ok(())
    }

    pub fn u32(&mut self, v: u32) -> Result<()> {
        self.inner.write_u32::<BigEndian>(v)?;
        self.pos += 4;
        Ok(())
    }

    pub fn i32(&mut self, v: i32) -> Result<()> {
        self.inner.write_i32::<BigEndian>(v)?;
        self.pos += 4;
        Ok(())
    }

    pub fn i64(&mut self, v: i64) -> Result<()> {
        self.inner.write_i64::<BigEndian>(v)?;
        self.pos += 8;
        Ok(())
    }

    pub fn u64(&mut self, v: u64) -> Result<()> {
        self.inner.write_u64::<BigEndian>(v)?;
        self.pos += 8;
        Ok(())
    }

    /// Write a count that precedes a table or a prefixed array.
    pub fn count(&mut self, n: usize) -> Result<()> {
        if n > MAX_TABLE_LEN {
            return Err(TraceError::range(format!("count {n} exceeds {MAX_TABLE_LEN}")));
        }
        self.i32(n as i32)
    }

    /// `i32` byte length followed by the bytes. NUL bytes are rejected.
    pub fn string(&mut self, s: &str) -> Result<()> {
        if s.len() > MAX_STRING_LEN {
            return Err(TraceError::range(format!(
                "string of {} bytes exceeds {MAX_STRING_LEN}",
                s.len()
            )));
        }
        if s.as_bytes().contains(&0) {
            return Err(TraceError::range(format!("string {s:?} contains NUL")));
        }
        self.i32(s.len() as i32)?;
        self.bytes(s.as_bytes())
    }

    /// Sentinel byte for optional payloads: `false` means ignored.
    pub fn presence(&mut self, present: bool) -> Result<()> {
        self.u8(if present { PRESENT } else { IGNORED })
    }

    pub fn status(&mut self, st: &Status) -> Result<()> {
        self.i32(st.bytes)?;
        self.i32(st.cancelled)?;
        self.i32(st.source)?;
        self.i32(st.tag)?;
        self.i32(st.error)
    }
}

pub struct WireReader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read> WireReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        self.pos += n as u64;
        Ok(buf)
    }

    pub fn u8(&mut self) -> Result<u8> {
        let v = self.inner.read_u8()?;
        self.pos += 1;
        Ok(v)
    }

    pub fn u16(&mut self) -> Result<u16> {
        let v = self.inner.read_u16::<BigEndian>()?;
        self.pos += 2;
        Ok(v)
    }

    /// Like [`WireReader::u16`] but a clean end of input yields `None`.
    pub fn try_u16(&mut self) -> Result<Option<u16>> {
        match self.inner.read_u16::<BigEndian>() {
            Ok(v) => {
                self.pos += 2;
                Ok(Some(v))
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(TraceError::Io(e)),
        }
    }

    pub fn u32(&mut self) -> Result<u32> {
        let v = self.inner.read_u32::<BigEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    pub fn i32(&mut self) -> Result<i32> {
        let v = self.inner.read_i32::<BigEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    pub fn i64(&mut self) -> Result<i64> {
        let v = self.inner.read_i64::<BigEndian>()?;
        self.pos += 8;
        Ok(v)
    }

    pub fn u64(&mut self) -> Result<u64> {
        let v = self.inner.read_u64::<BigEndian>()?;
        self.pos += 8;
        Ok(v)
    }

    /// Read a table or prefixed-array count and bound it.
    pub fn count(&mut self, what: &str) -> Result<usize> {
        let n = self.i32()?;
        if n < 0 || n as usize > MAX_TABLE_LEN {
            return Err(TraceError::range(format!("{what}: count {n} out of range")));
        }
        Ok(n as usize)
    }

    pub fn string(&mut self) -> Result<String> {
        let len = self.i32()?;
        if len < 0 || len as usize > MAX_STRING_LEN {
            return Err(TraceError::range(format!("string length {len} out of range")));
        }
        let raw = self.bytes(len as usize)?;
        if raw.contains(&0) {
            return Err(TraceError::range("string contains NUL"));
        }
        String::from_utf8(raw).map_err(|e| TraceError::range(format!("string is not UTF-8: {e}")))
    }

    /// Read an optional-payload sentinel.
    pub fn presence(&mut self) -> Result<bool> {
        match self.u8()? {
            IGNORED => Ok(false),
            PRESENT => Ok(true),
            other => Err(TraceError::desync(format!("bad presence sentinel {other}"))),
        }
    }

    pub fn status(&mut self) -> Result<Status> {
        Ok(Status {
            bytes: self.i32()?,
            cancelled: self.i32()?,
            source: self.i32()?,
            tag: self.i32()?,
            error: self.i32()?,
        })
    }
}
