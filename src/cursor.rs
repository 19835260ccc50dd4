//! Sequential reader over a byte slice.

use crate::error::{Context, Error, Malformation};

/// Forward-only reader over a fixed buffer.
///
/// Every read advances the offset by exactly the bytes consumed, or fails with
/// [`Error::UnexpectedEof`] and leaves the offset untouched.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
    context: Context,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            context: Context::Header,
        }
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Set the context reported by subsequent errors.
    pub fn enter(&mut self, context: Context) {
        self.context = context;
    }

    pub fn context(&self) -> Context {
        self.context
    }

    /// Take an exact number of bytes, advancing the offset.
    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        buf.copy_from_slice(self.bytes(N)?);
        Ok(buf)
    }

    /// Take a run of `n` bytes, advancing the offset.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let s = self.offset;
        let e = s.checked_add(n).ok_or_else(|| self.eof())?;
        let run = self.data.get(s..e).ok_or_else(|| self.eof())?;
        self.offset = e;
        Ok(run)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.bytes(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        Ok(self.take::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, Error> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn u64(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    pub fn i16(&mut self) -> Result<i16, Error> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    pub fn i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    /// Take the bytes up to the next line feed, consuming but excluding it.
    pub fn line(&mut self) -> Result<&'a [u8], Error> {
        let rest = &self.data[self.offset..];
        let n = rest.iter().position(|&b| b == b'\n').ok_or_else(|| Error::UnexpectedEof {
            offset: self.data.len(),
            context: self.context,
        })?;
        self.offset += n + 1;
        Ok(&rest[..n])
    }

    /// Consume a file signature.
    ///
    /// Bytes that differ from `magic` are [`Error::InvalidMagic`], even when
    /// the data ends early. Data that ends inside a matching prefix is
    /// [`Error::UnexpectedEof`].
    pub fn magic(&mut self, magic: &[u8]) -> Result<(), Error> {
        let rest = &self.data[self.offset..];
        let n = rest.len().min(magic.len());
        if rest[..n] != magic[..n] {
            return Err(Error::InvalidMagic {
                context: self.context,
            });
        }
        self.skip(magic.len())
    }

    /// Consume whole repetitions of `sentinel`, returning how many were found.
    pub fn skip_padding(&mut self, sentinel: &[u8]) -> usize {
        let mut count = 0;
        while !sentinel.is_empty() && self.data[self.offset..].starts_with(sentinel) {
            self.offset += sentinel.len();
            count += 1;
        }
        count
    }

    /// Build a [`Error::MalformedRecord`] at the current offset.
    pub fn malformed(&self, reason: Malformation) -> Error {
        Error::MalformedRecord {
            offset: self.offset,
            context: self.context,
            reason,
        }
    }

    fn eof(&self) -> Error {
        Error::UnexpectedEof {
            offset: self.offset,
            context: self.context,
        }
    }
}
