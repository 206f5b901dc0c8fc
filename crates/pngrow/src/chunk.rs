/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunk level reading of a png stream
//!
//! A chunk is laid out as `length(4) | type(4) | data(length) | crc(4)`,
//! all integers big endian.
use std::io::{Read, Seek};

use log::trace;
use pngrow_core::bytestream::{ByteIoError, ByteReader};
use pngrow_core::pool::{BufferPool, PooledBuffer};

use crate::constants::{CHUNK_HEADER_SIZE, CRC_BLOCK_SIZE, MAX_PALETTE_ENTRIES, PNG_SIGNATURE};
use crate::crc::{chunk_crc, update_crc};
use crate::enums::ChunkType;
use crate::error::PngDecodeErrors;

/// A single chunk
///
/// Only IHDR and PLTE keep their payload in `data`, borrowed from the
/// pool passed to [`ChunkReader::read_chunk`]. For IDAT chunks the
/// payload stays in the stream to be read by the
/// [`IdatReader`](crate::bridge::IdatReader), every other chunk is
/// checked and skipped.
#[derive(Debug)]
pub struct Chunk<'p> {
    pub length:     u32,
    pub chunk_type: ChunkType,
    pub data:       PooledBuffer<'p>,
    pub crc:        u32
}

/// Reads chunks from a seekable png source
pub struct ChunkReader<R: Read + Seek> {
    stream:      ByteReader<R>,
    confirm_crc: bool
}

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(source: R, confirm_crc: bool) -> Result<ChunkReader<R>, PngDecodeErrors> {
        Ok(ChunkReader {
            stream: ByteReader::new(source)?,
            confirm_crc: confirm_crc && cfg!(feature = "crc")
        })
    }

    pub const fn confirm_crc(&self) -> bool {
        self.confirm_crc
    }

    /// Read and confirm the 8 byte png signature
    pub fn read_signature(&mut self) -> Result<(), PngDecodeErrors> {
        match self.stream.read_fixed_bytes_or_error::<8>() {
            Ok(signature) if signature == PNG_SIGNATURE => Ok(()),
            _ => Err(PngDecodeErrors::BadSignature)
        }
    }

    /// Read a chunk length, failing at the end of the stream
    pub fn read_length(&mut self) -> Result<u32, PngDecodeErrors> {
        Ok(self.stream.get_u32_be_err()?)
    }

    /// Read a chunk type, failing if fewer than 4 bytes remain
    pub fn read_type(&mut self) -> Result<ChunkType, PngDecodeErrors> {
        let tag = self.stream.read_fixed_bytes_or_error::<4>()?;
        Ok(ChunkType::from_bytes(tag))
    }

    /// Read up to `length` bytes of chunk data into a buffer from `pool`
    ///
    /// The length is clipped to what is left in the stream
    pub fn read_data<'p>(
        &mut self, pool: &'p BufferPool, length: u32
    ) -> Result<PooledBuffer<'p>, PngDecodeErrors> {
        let remaining = self.stream.remaining()?;
        let length = u64::from(length).min(remaining) as usize;

        let mut data = pool.acquire(length);
        self.stream.read_exact_bytes(&mut data)?;

        Ok(data)
    }

    pub fn read_crc(&mut self) -> Result<u32, PngDecodeErrors> {
        Ok(self.stream.get_u32_be_err()?)
    }

    /// Confirm `crc` matches the crc of `chunk_type` followed by `data`
    ///
    /// Does nothing when crc confirmation is disabled
    pub fn validate_crc(
        &self, chunk_type: ChunkType, data: &[u8], crc: u32
    ) -> Result<(), PngDecodeErrors> {
        if self.confirm_crc {
            let tag = chunk_type.to_bytes();
            compare_crc(tag, crc, chunk_crc(tag, data))?;
        }
        Ok(())
    }

    /// Read a whole chunk
    ///
    /// IHDR and PLTE payloads small enough to be valid are read into a
    /// buffer from `pool`. Any other payload is fed through the crc in
    /// fixed size pooled blocks, or skipped when crc
    /// confirmation is off. IDAT chunks are then moved back to the start
    /// of their data, with crc confirmation off they are not touched at all.
    pub fn read_chunk<'p>(&mut self, pool: &'p BufferPool) -> Result<Chunk<'p>, PngDecodeErrors> {
        let length = self.read_length()?;
        let chunk_type = self.read_type()?;

        trace!("Chunk {}, length {}", chunk_type.name(), length);

        if retains_data(chunk_type, length) {
            let data = self.read_data(pool, length)?;
            let crc = self.read_crc()?;

            self.validate_crc(chunk_type, &data, crc)?;

            return Ok(Chunk {
                length,
                chunk_type,
                data,
                crc
            });
        }
        let data = pool.acquire(0);

        if chunk_type == ChunkType::IDAT && !self.confirm_crc {
            return Ok(Chunk {
                length,
                chunk_type,
                data,
                crc: 0
            });
        }
        let remaining = self.stream.remaining()?;

        if remaining < u64::from(length) {
            return Err(PngDecodeErrors::TruncatedStream {
                expected: length as usize,
                found:    remaining as usize
            });
        }
        let crc = if self.confirm_crc {
            self.stream_crc(pool, chunk_type, length)?
        } else {
            self.skip(length as usize)?;
            self.read_crc()?
        };
        if chunk_type == ChunkType::IDAT {
            // point back to the start of the data
            self.stream.rewind(length as usize + 4)?;
        }
        Ok(Chunk {
            length,
            chunk_type,
            data,
            crc
        })
    }

    /// Run `length` bytes of chunk data through the crc one pooled block
    /// at a time, then read and compare the stored crc
    fn stream_crc(
        &mut self, pool: &BufferPool, chunk_type: ChunkType, length: u32
    ) -> Result<u32, PngDecodeErrors> {
        let tag = chunk_type.to_bytes();
        let mut block = pool.acquire((length as usize).min(CRC_BLOCK_SIZE));
        let mut running = update_crc(u32::MAX, &tag);
        let mut left = length as usize;

        while left > 0 {
            let step = left.min(block.len());
            self.stream.read_exact_bytes(&mut block[..step])?;

            running = update_crc(running, &block[..step]);
            left -= step;
        }
        let crc = self.read_crc()?;
        compare_crc(tag, crc, !running)?;

        Ok(crc)
    }

    /// Whether another chunk header can be read
    pub fn has_chunk_header(&mut self) -> Result<bool, PngDecodeErrors> {
        Ok(self.stream.has(CHUNK_HEADER_SIZE)?)
    }

    pub fn remaining(&mut self) -> Result<u64, PngDecodeErrors> {
        Ok(self.stream.remaining()?)
    }

    /// Move forward by `num` bytes, e.g past the crc of a consumed IDAT
    pub fn skip(&mut self, num: usize) -> Result<(), PngDecodeErrors> {
        self.stream.skip(num)?;
        Ok(())
    }

    /// Read raw bytes from the current position
    pub fn read_raw(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        self.stream.read_bytes(buf)
    }
}

/// Chunks whose payload the decoder interprets
fn retains_data(chunk_type: ChunkType, length: u32) -> bool {
    matches!(chunk_type, ChunkType::IHDR | ChunkType::PLTE)
        && length as usize <= MAX_PALETTE_ENTRIES * 3
}

fn compare_crc(tag: [u8; 4], expected: u32, found: u32) -> Result<(), PngDecodeErrors> {
    if expected != found {
        return Err(PngDecodeErrors::BadCrc {
            chunk: tag,
            expected,
            found
        });
    }
    Ok(())
}
