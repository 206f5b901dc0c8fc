/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use core::fmt::{Debug, Display, Formatter};
use std::io::{Read, Seek, SeekFrom};

/// Errors that can occur when reading from a [`ByteReader`]
pub enum ByteIoError {
    /// The underlying reader reported an error
    StdIoError(std::io::Error),
    /// A conversion of an offset to a signed seek offset overflowed
    TryFromIntError(core::num::TryFromIntError),
    // requested, present
    NotEnoughBytes(usize, usize)
}

impl Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {}", err)
            }
            ByteIoError::TryFromIntError(err) => {
                writeln!(f, "Cannot convert to int {}", err)
            }
            ByteIoError::NotEnoughBytes(expected, found) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
        }
    }
}

impl Display for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ByteIoError {}

impl From<std::io::Error> for ByteIoError {
    fn from(value: std::io::Error) -> Self {
        ByteIoError::StdIoError(value)
    }
}

impl From<core::num::TryFromIntError> for ByteIoError {
    fn from(value: core::num::TryFromIntError) -> Self {
        ByteIoError::TryFromIntError(value)
    }
}

/// An endian aware reader over a seekable source.
///
/// The total length of the source is queried once on construction,
/// which makes [`remaining`](ByteReader::remaining) a cheap query afterwards.
pub struct ByteReader<T: Read + Seek> {
    inner: T,
    len:   u64
}

impl<T: Read + Seek> ByteReader<T> {
    /// Wrap a source, starting at its current position
    pub fn new(mut source: T) -> Result<ByteReader<T>, ByteIoError> {
        let old_pos = source.stream_position()?;
        let len = source.seek(SeekFrom::End(0))?;

        // avoid a third seek when we were already at the end
        if old_pos != len {
            source.seek(SeekFrom::Start(old_pos))?;
        }
        Ok(ByteReader { inner: source, len })
    }

    #[inline(always)]
    pub fn position(&mut self) -> Result<u64, ByteIoError> {
        self.inner.stream_position().map_err(ByteIoError::from)
    }

    /// Number of bytes left between the cursor and the end of the source
    #[inline]
    pub fn remaining(&mut self) -> Result<u64, ByteIoError> {
        let pos = self.position()?;
        Ok(self.len.saturating_sub(pos))
    }

    #[inline]
    pub fn has(&mut self, num: usize) -> Result<bool, ByteIoError> {
        Ok(self.remaining()? >= num as u64)
    }

    pub fn skip(&mut self, num: usize) -> Result<u64, ByteIoError> {
        let offset = i64::try_from(num)?;
        self.inner
            .seek(SeekFrom::Current(offset))
            .map_err(ByteIoError::from)
    }

    pub fn rewind(&mut self, num: usize) -> Result<u64, ByteIoError> {
        let offset = i64::try_from(num)?;
        self.inner
            .seek(SeekFrom::Current(-offset))
            .map_err(ByteIoError::from)
    }

    /// Read exact bytes required to fill `buf` or return an error if that isn't possible
    ///
    /// On error the position is left where it was.
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        let remaining = self.remaining()?;

        if remaining < buf.len() as u64 {
            return Err(ByteIoError::NotEnoughBytes(buf.len(), remaining as usize));
        }
        self.inner.read_exact(buf).map_err(ByteIoError::from)
    }

    /// Read up to `buf.len()` bytes returning how many were read
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        self.inner.read(buf).map_err(ByteIoError::from)
    }

    #[inline(always)]
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        self.read_exact_bytes(&mut byte_store)?;
        Ok(byte_store)
    }

    #[inline(always)]
    pub fn get_u32_be_err(&mut self) -> Result<u32, ByteIoError> {
        Ok(u32::from_be_bytes(self.read_fixed_bytes_or_error()?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_big_endian_values() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x00, 0x00, 0x00, 0x0D, 0xAB];
        let mut reader = ByteReader::new(Cursor::new(&data[..])).unwrap();

        assert_eq!(reader.get_u32_be_err().unwrap(), 0x8950_4E47);
        assert_eq!(reader.get_u32_be_err().unwrap(), 13);
        assert_eq!(reader.remaining().unwrap(), 1);
        assert!(reader.get_u32_be_err().is_err());
        // failed read does not move the cursor
        assert_eq!(reader.read_fixed_bytes_or_error::<1>().unwrap(), [0xAB]);
        assert!(!reader.has(1).unwrap());
    }

    #[test]
    fn rewind_returns_to_earlier_bytes() {
        let data = [1_u8, 2, 3, 4];
        let mut reader = ByteReader::new(Cursor::new(&data[..])).unwrap();

        reader.skip(2).unwrap();
        assert_eq!(reader.read_fixed_bytes_or_error::<1>().unwrap(), [3]);
        reader.rewind(3).unwrap();
        assert_eq!(reader.read_fixed_bytes_or_error::<2>().unwrap(), [1, 2]);
        assert!(reader.rewind(5).is_err());
    }

    #[test]
    fn length_is_measured_from_source_end() {
        let data = [0_u8; 10];
        let mut cursor = Cursor::new(&data[..]);
        cursor.set_position(4);
        let mut reader = ByteReader::new(cursor).unwrap();

        assert_eq!(reader.position().unwrap(), 4);
        assert_eq!(reader.remaining().unwrap(), 6);
        assert!(reader.has(6).unwrap());
        assert!(!reader.has(7).unwrap());
    }
}
